use std::fmt;

use log::{error, info};
use nix::unistd::Pid;

use crate::shell::executor::host::ProcessHost;
use crate::shell::executor::report::ExecutionReport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Running,
    Done,
}

/// 一条后台执行的命令行，每个阶段一个进程
#[derive(Debug, Clone)]
pub struct Job {
    pub index: usize,
    pub command: String,
    pids: Vec<Pid>,
    codes: Vec<Option<i32>>,
}

impl Job {
    fn new(index: usize, command: String, pids: Vec<Pid>) -> Self {
        let codes = vec![None; pids.len()];
        Self {
            index,
            command,
            pids,
            codes,
        }
    }

    pub fn status(&self) -> JobStatus {
        if self.codes.iter().all(Option::is_some) {
            JobStatus::Done
        } else {
            JobStatus::Running
        }
    }

    fn report(&self) -> ExecutionReport {
        ExecutionReport::with_codes(&self.command, self.codes.iter().flatten().copied().collect())
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self.status() {
            JobStatus::Running => "running",
            JobStatus::Done => "done",
        };
        let pids = self
            .pids
            .iter()
            .map(|pid| pid.to_string())
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "[{}] {} {} {}", self.index, pids, status, self.command)
    }
}

#[derive(Debug, Default)]
pub struct JobManager {
    jobs: Vec<Job>,
}

impl JobManager {
    pub fn new() -> Self {
        Self { jobs: Vec::new() }
    }

    pub fn has_active(&self) -> bool {
        !self.jobs.is_empty()
    }

    fn find_available_index(&self) -> usize {
        let mut index = 1;
        while self.jobs.iter().any(|job| job.index == index) {
            index += 1;
        }
        index
    }

    pub fn add_job(&mut self, pids: Vec<Pid>, command: &str) -> usize {
        let index = self.find_available_index();
        let job = Job::new(index, command.to_string(), pids);
        info!("后台任务已启动: {}", job);
        self.jobs.push(job);
        index
    }

    /// 非阻塞地轮询所有后台任务，返回已经全部结束的任务报告
    pub fn reap<H: ProcessHost>(&mut self, host: &mut H) -> Vec<ExecutionReport> {
        for job in self.jobs.iter_mut() {
            for (pid, code) in job.pids.iter().zip(job.codes.iter_mut()) {
                if code.is_some() {
                    continue;
                }
                match host.try_wait(*pid) {
                    Ok(status) => *code = status,
                    Err(e) => {
                        // 已经无法等待的进程按失败处理，避免任务永远挂着
                        error!("轮询后台进程 {} 失败: {}", pid, e);
                        *code = Some(1);
                    }
                }
            }
        }

        let mut reports = Vec::new();
        self.jobs.retain(|job| {
            if job.status() == JobStatus::Done {
                info!("后台任务已结束: {}", job);
                reports.push(job.report());
                false
            } else {
                true
            }
        });
        reports
    }
}
