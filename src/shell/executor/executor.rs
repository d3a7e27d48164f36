use log::{debug, error};
use nix::unistd::Pid;

use super::host::{ProcessHost, StageIo};
use super::report::ExecutionReport;
use crate::shell::error::ShellError;
use crate::shell::job_manager::JobManager;
use crate::shell::parser::ast::Pipeline;

pub struct Executor<H: ProcessHost> {
    host: H,
    jobs: JobManager,
}

impl<H: ProcessHost> Executor<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            jobs: JobManager::new(),
        }
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn has_background_jobs(&self) -> bool {
        self.jobs.has_active()
    }

    pub fn reap_background(&mut self) -> Vec<ExecutionReport> {
        self.jobs.reap(&mut self.host)
    }

    /// 执行一条管道。前台时按阶段顺序等待并返回报告，后台时登记任务后立即返回 None
    pub fn execute(
        &mut self,
        command: &str,
        pipeline: Pipeline,
        background: bool,
    ) -> Result<Option<ExecutionReport>, ShellError> {
        let pids = self.launch(pipeline)?;

        if background {
            self.jobs.add_job(pids, command);
            return Ok(None);
        }

        let mut report = ExecutionReport::new(command);
        for (index, pid) in pids.iter().enumerate() {
            match self.host.wait(*pid) {
                Ok(code) => report.push(code),
                Err(e) => {
                    self.abandon(&pids[index + 1..]);
                    return Err(e);
                }
            }
        }
        Ok(Some(report))
    }

    /// 先启动全部阶段，再由调用方等待。
    ///
    /// 第 N 段的管道在派生第 N 段之前创建，写端交给第 N 段，读端留给第 N+1 段。
    /// 重定向文件在任何进程启动之前打开，打不开时整行不执行。
    fn launch(&mut self, mut pipeline: Pipeline) -> Result<Vec<Pid>, ShellError> {
        let mut output = match pipeline.last_mut().and_then(|stage| stage.take_redirection()) {
            Some(redirection) => Some(self.host.open_output(redirection)?),
            None => None,
        };

        let count = pipeline.len();
        let mut pids = Vec::with_capacity(count);
        let mut stdin = None;

        for (index, stage) in pipeline.stages().iter().enumerate() {
            let (next_stdin, stdout) = if index + 1 == count {
                (None, output.take())
            } else {
                match self.host.pipe() {
                    Ok((read, write)) => (Some(read), Some(write)),
                    Err(e) => {
                        self.abandon(&pids);
                        return Err(e);
                    }
                }
            };

            let stdio = StageIo {
                stdin: stdin.take(),
                stdout,
            };
            match self.host.spawn(stage, stdio) {
                Ok(pid) => pids.push(pid),
                Err(e) => {
                    // 丢弃尚未交出的读端，已启动的上游会因管道关闭而结束
                    drop(next_stdin);
                    self.abandon(&pids);
                    return Err(e);
                }
            }
            stdin = next_stdin;
        }

        debug!("管道已启动: {:?}", pids);
        Ok(pids)
    }

    /// 启动中途失败时回收已经派生的进程
    fn abandon(&mut self, pids: &[Pid]) {
        for pid in pids {
            if let Err(e) = self.host.wait(*pid) {
                error!("回收子进程 {} 失败: {}", pid, e);
            }
        }
    }
}
