use std::io::{self, Write};
use std::path::PathBuf;

use log::{debug, warn};

use crate::shell::error::ShellError;
use crate::shell::executor::host::ProcessHost;
use crate::shell::executor::report::ExecutionReport;
use crate::shell::executor::Executor;
use crate::shell::parser::ast::Stage;
use crate::shell::parser::Parser;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Flow {
    Continue,
    Exit,
}

/// 逐行解释执行，诊断信息写入 `diagnostics`
pub struct Interpreter<H: ProcessHost, W: Write> {
    executor: Executor<H>,
    diagnostics: W,
    max_line_len: usize,
}

impl<H: ProcessHost, W: Write> Interpreter<H, W> {
    pub fn new(host: H, diagnostics: W, max_line_len: usize) -> Self {
        Self {
            executor: Executor::new(host),
            diagnostics,
            max_line_len,
        }
    }

    /// 输出已经结束的后台任务报告
    pub fn reap_background(&mut self) -> io::Result<()> {
        for report in self.executor.reap_background() {
            writeln!(self.diagnostics, "{}", report)?;
        }
        Ok(())
    }

    pub fn eval(&mut self, line: &str) -> io::Result<Flow> {
        if line.trim().is_empty() {
            return Ok(Flow::Continue);
        }
        if line.len() > self.max_line_len {
            warn!("命令过长: {} 字节", line.len());
            self.report_error(&ShellError::LineTooLong)?;
            return Ok(Flow::Continue);
        }

        let (command, background) = split_background(line);
        let pipeline = match Parser::new(command).parse_pipeline() {
            Ok(pipeline) => pipeline,
            Err(e) => {
                debug!("解析失败 {:?}: {}", line, e);
                self.report_error(&ShellError::from(e))?;
                return Ok(Flow::Continue);
            }
        };

        if let Some(stage) = pipeline.single() {
            match stage.program() {
                "exit" if stage.argv.len() == 1 => return self.builtin_exit(line),
                "cd" => {
                    self.builtin_cd(line, stage)?;
                    return Ok(Flow::Continue);
                }
                _ => {}
            }
        }

        match self.executor.execute(line, pipeline, background) {
            Ok(Some(report)) => writeln!(self.diagnostics, "{}", report)?,
            Ok(None) => debug!("后台执行: {}", line),
            Err(e) => self.report_error(&e)?,
        }
        Ok(Flow::Continue)
    }

    fn builtin_exit(&mut self, line: &str) -> io::Result<Flow> {
        self.reap_background()?;
        if self.executor.has_background_jobs() {
            self.report_error(&ShellError::ActiveJobs)?;
            writeln!(self.diagnostics, "{}", ExecutionReport::with_codes(line, vec![1]))?;
            return Ok(Flow::Continue);
        }

        writeln!(self.diagnostics, "Bye...")?;
        writeln!(self.diagnostics, "{}", ExecutionReport::with_codes(line, vec![0]))?;
        Ok(Flow::Exit)
    }

    fn builtin_cd(&mut self, line: &str, stage: &Stage) -> io::Result<()> {
        let target = stage.argv.get(1).map(String::as_str).unwrap_or("~");
        let path = PathBuf::from(shellexpand::tilde(target).as_ref());

        let code = match self.executor.host_mut().change_dir(&path) {
            Ok(()) => 0,
            Err(e) => {
                debug!("cd {} 失败: {}", path.display(), e);
                self.report_error(&ShellError::CannotChangeDir)?;
                1
            }
        };
        writeln!(self.diagnostics, "{}", ExecutionReport::with_codes(line, vec![code]))
    }

    fn report_error(&mut self, err: &ShellError) -> io::Result<()> {
        writeln!(self.diagnostics, "Error: {}", err)
    }
}

/// 去掉行尾的 `&`，返回剩余命令和是否后台执行
fn split_background(line: &str) -> (&str, bool) {
    match line.trim_end_matches(' ').strip_suffix('&') {
        Some(command) => (command, true),
        None => (line, false),
    }
}
