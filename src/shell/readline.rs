use crate::utils::config::Config;
use log::{debug, error, warn};
pub use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::Editor;
use rustyline::{CompletionType, Config as RLConfig};
use std::fs;
use std::io::{self, BufRead, Write};

pub struct ReadlineManager<'a> {
    config: &'a Config,
    editor: Editor<(), FileHistory>,
}

impl<'a> ReadlineManager<'a> {
    pub fn new(config: &'a Config) -> Result<Self, ReadlineError> {
        let rl_config = RLConfig::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            .edit_mode(config.get_edit_mode())
            .build();

        let editor = Editor::with_config(rl_config)?;
        Ok(Self { config, editor })
    }

    pub fn load_history(&mut self) -> Result<(), ReadlineError> {
        if let Err(err) = self.editor.load_history(&self.config.history_file) {
            warn!(
                "无法加载历史记录: {} {}",
                self.config.history_file.display(),
                err
            );
        } else {
            debug!("历史记录加载成功");
        }
        Ok(())
    }

    pub fn readline(&mut self, prompt: &str) -> Result<String, ReadlineError> {
        self.editor.readline(prompt)
    }

    pub fn add_history(&mut self, line: &str) -> Result<bool, ReadlineError> {
        self.editor.add_history_entry(line)
    }

    pub fn save_history(&mut self) -> Result<(), ReadlineError> {
        // 确保历史文件目录存在
        if let Some(parent) = self.config.history_file.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                error!("无法创建历史记录目录: {}", err);
                return Ok(());
            }
        }
        if let Err(err) = self.editor.save_history(&self.config.history_file) {
            error!("保存历史记录失败: {}", err);
        } else {
            debug!("历史记录保存成功");
        }
        Ok(())
    }
}

/// 非终端输入：打印提示符，逐行读取，并把读到的行回显出来
pub struct PipedInput<R: BufRead, W: Write> {
    reader: R,
    echo: W,
}

impl<R: BufRead, W: Write> PipedInput<R, W> {
    pub fn new(reader: R, echo: W) -> Self {
        Self { reader, echo }
    }

    pub fn readline(&mut self, prompt: &str) -> Result<String, ReadlineError> {
        write!(self.echo, "{}", prompt)?;
        self.echo.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(ReadlineError::Eof);
        }

        write!(self.echo, "{}", line)?;
        if !line.ends_with('\n') {
            writeln!(self.echo)?;
        }
        self.echo.flush()?;

        if line.ends_with('\n') {
            line.pop();
        }
        Ok(line)
    }
}

/// shell 的输入来源
pub enum LineReader<'a> {
    Interactive(ReadlineManager<'a>),
    Piped(PipedInput<io::StdinLock<'static>, io::Stdout>),
}

impl LineReader<'_> {
    pub fn readline(&mut self, prompt: &str) -> Result<String, ReadlineError> {
        match self {
            LineReader::Interactive(editor) => editor.readline(prompt),
            LineReader::Piped(input) => input.readline(prompt),
        }
    }

    pub fn add_history(&mut self, line: &str) {
        if let LineReader::Interactive(editor) = self {
            if let Err(err) = editor.add_history(line) {
                warn!("无法写入历史记录: {}", err);
            }
        }
    }

    pub fn load_history(&mut self) -> Result<(), ReadlineError> {
        match self {
            LineReader::Interactive(editor) => editor.load_history(),
            LineReader::Piped(_) => Ok(()),
        }
    }

    pub fn save_history(&mut self) -> Result<(), ReadlineError> {
        match self {
            LineReader::Interactive(editor) => editor.save_history(),
            LineReader::Piped(_) => Ok(()),
        }
    }
}
