use std::env;
use std::ffi::CString;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::os::fd::{AsRawFd, OwnedFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use log::{debug, error};
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{dup2, execvp, fork, pipe2, write, ForkResult, Pid};

use crate::shell::error::ShellError;
use crate::shell::parser::ast::{RedirectOp, Redirection, Stage};

/// 子进程的标准输入输出，None 表示继承 shell 自身的
#[derive(Debug)]
pub struct StageIo<E> {
    pub stdin: Option<E>,
    pub stdout: Option<E>,
}

/// 进程宿主：创建管道、打开输出文件、派生与等待子进程。
///
/// 端点（`Endpoint`）是拥有所有权的值，`spawn` 取走它们之后由宿主负责关闭，
/// 因此每个描述符在父进程里恰好关闭一次。
pub trait ProcessHost {
    type Endpoint;

    /// 返回 (读端, 写端)
    fn pipe(&mut self) -> Result<(Self::Endpoint, Self::Endpoint), ShellError>;

    fn open_output(&mut self, redirection: Redirection) -> Result<Self::Endpoint, ShellError>;

    fn spawn(&mut self, stage: &Stage, stdio: StageIo<Self::Endpoint>) -> Result<Pid, ShellError>;

    /// 阻塞等待，返回退出码（被信号终止时为 128 + 信号值）
    fn wait(&mut self, pid: Pid) -> Result<i32, ShellError>;

    /// 非阻塞轮询，进程仍在运行时返回 None
    fn try_wait(&mut self, pid: Pid) -> Result<Option<i32>, ShellError>;

    fn change_dir(&mut self, path: &Path) -> io::Result<()>;
}

/// 基于 fork/exec 的真实宿主
#[derive(Debug, Default)]
pub struct NixHost;

impl NixHost {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessHost for NixHost {
    type Endpoint = OwnedFd;

    fn pipe(&mut self) -> Result<(OwnedFd, OwnedFd), ShellError> {
        // O_CLOEXEC：子进程 dup2 之后，原始描述符在 exec 时自动关闭
        pipe2(OFlag::O_CLOEXEC).map_err(|e| {
            error!("创建管道失败: {}", e);
            ShellError::Pipe(e)
        })
    }

    fn open_output(&mut self, redirection: Redirection) -> Result<OwnedFd, ShellError> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).mode(0o644);
        match redirection.operator {
            RedirectOp::Output => options.truncate(true),
            RedirectOp::Append => options.append(true),
        };

        match options.open(&redirection.filename) {
            Ok(file) => Ok(OwnedFd::from(file)),
            Err(e) => {
                debug!("无法打开输出文件 {}: {}", redirection.filename, e);
                Err(ShellError::CannotOpenOutputFile)
            }
        }
    }

    fn spawn(&mut self, stage: &Stage, stdio: StageIo<OwnedFd>) -> Result<Pid, ShellError> {
        let image = ProcessImage::prepare(stage)?;

        // 避免子进程输出排在尚未刷新的提示符前面
        io::stdout().flush()?;
        io::stderr().flush()?;

        match unsafe { fork() } {
            Ok(ForkResult::Parent { child }) => {
                debug!("派生子进程 {}: {:?}", child, stage.argv);
                // stdio 在这里被丢弃，父进程不再持有这些端点
                Ok(child)
            }
            Ok(ForkResult::Child) => image.run(stdio),
            Err(e) => {
                error!("fork 失败: {}", e);
                Err(ShellError::Fork(e))
            }
        }
    }

    fn wait(&mut self, pid: Pid) -> Result<i32, ShellError> {
        loop {
            match waitpid(pid, None) {
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(ShellError::Wait(e)),
                Ok(status) => {
                    if let Some(code) = exit_code(status) {
                        return Ok(code);
                    }
                }
            }
        }
    }

    fn try_wait(&mut self, pid: Pid) -> Result<Option<i32>, ShellError> {
        match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(status) => Ok(exit_code(status)),
            Err(Errno::EINTR) => Ok(None),
            Err(e) => Err(ShellError::Wait(e)),
        }
    }

    fn change_dir(&mut self, path: &Path) -> io::Result<()> {
        env::set_current_dir(path)
    }
}

fn exit_code(status: WaitStatus) -> Option<i32> {
    match status {
        WaitStatus::Exited(_, code) => Some(code),
        WaitStatus::Signaled(_, sig, _) => Some(128 + sig as i32),
        _ => None,
    }
}

/// fork 之前准备好的子进程映像，子进程里不再分配内存
enum ProcessImage {
    Exec { program: CString, argv: Vec<CString> },
    Print(Vec<u8>),
    Noop,
}

impl ProcessImage {
    fn prepare(stage: &Stage) -> Result<Self, ShellError> {
        match stage.program() {
            "pwd" => {
                let mut cwd = env::current_dir()?.to_string_lossy().into_owned().into_bytes();
                cwd.push(b'\n');
                Ok(ProcessImage::Print(cwd))
            }
            // cd 只能改变 shell 自身的目录，在子进程中没有意义
            "cd" => Ok(ProcessImage::Noop),
            program => {
                let to_cstring =
                    |s: &str| CString::new(s).map_err(|_| ShellError::InvalidArgument(s.to_string()));
                Ok(ProcessImage::Exec {
                    program: to_cstring(program)?,
                    argv: stage
                        .argv
                        .iter()
                        .map(|arg| to_cstring(arg.as_str()))
                        .collect::<Result<Vec<_>, ShellError>>()?,
                })
            }
        }
    }

    /// 只在子进程中调用
    fn run(self, stdio: StageIo<OwnedFd>) -> ! {
        // Rust 运行时忽略了 SIGPIPE，被忽略的信号会跨过 exec 继承下去
        if unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl) }.is_err() {
            exit_child(1);
        }
        if let Some(fd) = &stdio.stdin {
            if dup2(fd.as_raw_fd(), libc::STDIN_FILENO).is_err() {
                exit_child(1);
            }
        }
        if let Some(fd) = &stdio.stdout {
            if dup2(fd.as_raw_fd(), libc::STDOUT_FILENO).is_err() {
                exit_child(1);
            }
        }

        match self {
            ProcessImage::Print(bytes) => {
                let _ = write(io::stdout(), &bytes);
                exit_child(0)
            }
            ProcessImage::Noop => exit_child(0),
            ProcessImage::Exec { program, argv } => {
                let _ = execvp(&program, &argv);
                let _ = write(io::stderr(), b"Error: command not found\n");
                exit_child(1)
            }
        }
    }
}

fn exit_child(code: i32) -> ! {
    // 不执行 atexit，也不刷新从父进程继承来的缓冲区
    unsafe { libc::_exit(code) }
}
