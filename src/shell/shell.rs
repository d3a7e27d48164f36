use log::{debug, error, warn};
use std::error::Error;
use std::io::{self, IsTerminal, Stderr, Write};

use crate::shell::executor::host::NixHost;
use crate::shell::interpreter::{Flow, Interpreter};
use crate::shell::readline::{LineReader, PipedInput, ReadlineError, ReadlineManager};
use crate::utils::config::Config;
use crate::utils::theme::Theme;

pub struct Shell<'a> {
    config: &'a Config,
    theme: Theme,
    input: LineReader<'a>,
    interpreter: Interpreter<NixHost, Stderr>,
}

impl<'a> Shell<'a> {
    pub fn new(config: &'a Config) -> Result<Self, Box<dyn Error>> {
        let input = if io::stdin().is_terminal() {
            LineReader::Interactive(ReadlineManager::new(config)?)
        } else {
            debug!("标准输入不是终端，读取的命令会被回显");
            LineReader::Piped(PipedInput::new(io::stdin().lock(), io::stdout()))
        };

        Ok(Self {
            config,
            theme: Theme::load_theme(&config.theme),
            input,
            interpreter: Interpreter::new(NixHost::new(), io::stderr(), config.line_max),
        })
    }

    pub fn run(&mut self) -> Result<(), Box<dyn Error>> {
        debug!("初始化 cshell...");
        self.input.load_history()?;

        self.run_loop()?;
        self.input.save_history()?;

        debug!("退出 cshell...");
        Ok(())
    }

    fn run_loop(&mut self) -> Result<(), Box<dyn Error>> {
        loop {
            // 每次提示之前回收已经结束的后台任务
            self.interpreter.reap_background()?;
            std::io::stdout().flush()?;

            let prompt = match self.input {
                LineReader::Interactive(_) => (self.theme.prompt_style)(self.config.prompt.as_str()),
                LineReader::Piped(_) => self.config.prompt.clone(),
            };

            match self.input.readline(&prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        self.input.add_history(&line);
                    }
                    if self.interpreter.eval(&line)? == Flow::Exit {
                        break;
                    }
                }
                Err(err) => match err {
                    ReadlineError::Eof => {
                        warn!("接收到 EOF，退出 cshell...");
                        break;
                    }
                    ReadlineError::Interrupted => {
                        debug!("接收到中断信号，丢弃当前输入");
                    }
                    err => {
                        error!("读取输入失败: {}", err);
                        eprintln!("Error: {}", err);
                    }
                },
            }
        }
        Ok(())
    }
}
