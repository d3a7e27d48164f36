use thiserror::Error;

use crate::shell::parser::ParseError;

/// 诊断输出统一为 `Error: {err}`
#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("cannot open output file")]
    CannotOpenOutputFile,
    #[error("cannot cd into directory")]
    CannotChangeDir,
    #[error("Background jobs still active...")]
    ActiveJobs,
    #[error("command line too long")]
    LineTooLong,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("pipe failed: {0}")]
    Pipe(nix::Error),
    #[error("fork failed: {0}")]
    Fork(nix::Error),
    #[error("wait failed: {0}")]
    Wait(nix::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
