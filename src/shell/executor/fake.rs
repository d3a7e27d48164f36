//! 测试用的进程宿主：不派生任何进程，只记录调用顺序。

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use nix::unistd::Pid;

use super::host::{ProcessHost, StageIo};
use crate::shell::error::ShellError;
use crate::shell::parser::ast::{Redirection, Stage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum End {
    Read(usize),
    Write(usize),
    File(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Pipe(usize),
    Open(Redirection),
    Spawn {
        argv: Vec<String>,
        stdin: Option<End>,
        stdout: Option<End>,
    },
    Wait(Pid),
    ChangeDir(PathBuf),
}

#[derive(Debug, Default)]
pub struct FakeHost {
    pub events: Vec<Event>,
    /// 仍在运行的后台进程，try_wait 对它们返回 None
    pub running: HashSet<Pid>,
    pub hold_spawned: bool,
    pub fail_open: bool,
    pub fail_spawn_of: Option<String>,
    /// 等待这个程序的进程时返回 ECHILD
    pub fail_wait_of: Option<String>,
    pub valid_dirs: Vec<PathBuf>,
    codes: HashMap<Pid, i32>,
    lost: HashSet<Pid>,
    next_pipe: usize,
    next_pid: i32,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            next_pid: 100,
            ..Self::default()
        }
    }

    pub fn finish_all(&mut self) {
        self.running.clear();
    }

    pub fn spawned(&self) -> Vec<(Vec<String>, Option<End>, Option<End>)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Spawn { argv, stdin, stdout } => {
                    Some((argv.clone(), stdin.clone(), stdout.clone()))
                }
                _ => None,
            })
            .collect()
    }

    /// `false` 退出码为 1，`nope` 模拟找不到命令，其余为 0
    fn code_for(argv: &[String]) -> i32 {
        match argv.first().map(String::as_str) {
            Some("false") | Some("nope") => 1,
            _ => 0,
        }
    }
}

impl ProcessHost for FakeHost {
    type Endpoint = End;

    fn pipe(&mut self) -> Result<(End, End), ShellError> {
        let id = self.next_pipe;
        self.next_pipe += 1;
        self.events.push(Event::Pipe(id));
        Ok((End::Read(id), End::Write(id)))
    }

    fn open_output(&mut self, redirection: Redirection) -> Result<End, ShellError> {
        if self.fail_open {
            return Err(ShellError::CannotOpenOutputFile);
        }
        let end = End::File(redirection.filename.clone());
        self.events.push(Event::Open(redirection));
        Ok(end)
    }

    fn spawn(&mut self, stage: &Stage, stdio: StageIo<End>) -> Result<Pid, ShellError> {
        if self.fail_spawn_of.as_deref() == Some(stage.program()) {
            return Err(ShellError::Fork(nix::Error::EAGAIN));
        }
        let pid = Pid::from_raw(self.next_pid);
        self.next_pid += 1;
        self.codes.insert(pid, Self::code_for(&stage.argv));
        if self.fail_wait_of.as_deref() == Some(stage.program()) {
            self.lost.insert(pid);
        }
        if self.hold_spawned {
            self.running.insert(pid);
        }
        self.events.push(Event::Spawn {
            argv: stage.argv.clone(),
            stdin: stdio.stdin,
            stdout: stdio.stdout,
        });
        Ok(pid)
    }

    fn wait(&mut self, pid: Pid) -> Result<i32, ShellError> {
        self.events.push(Event::Wait(pid));
        self.running.remove(&pid);
        if self.lost.remove(&pid) {
            self.codes.remove(&pid);
            return Err(ShellError::Wait(nix::Error::ECHILD));
        }
        self.codes
            .remove(&pid)
            .ok_or(ShellError::Wait(nix::Error::ECHILD))
    }

    fn try_wait(&mut self, pid: Pid) -> Result<Option<i32>, ShellError> {
        if self.running.contains(&pid) {
            return Ok(None);
        }
        self.wait(pid).map(Some)
    }

    fn change_dir(&mut self, path: &Path) -> io::Result<()> {
        if self.valid_dirs.iter().any(|dir| dir == path) {
            self.events.push(Event::ChangeDir(path.to_path_buf()));
            Ok(())
        } else {
            Err(io::Error::new(io::ErrorKind::NotFound, "no such directory"))
        }
    }
}
