pub mod ast;
pub mod lexer;
#[allow(clippy::module_inception)]
pub mod parser;
pub mod validator;

pub use parser::Parser;

use thiserror::Error;

/// 解析阶段的错误，出现任何一个都不会执行该行
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum ParseError {
    #[error("missing command")]
    MissingCommand,
    #[error("no output file")]
    NoOutputFile,
    #[error("mislocated output redirection")]
    MislocatedRedirection,
    #[error("too many process arguments")]
    TooManyArguments,
}
