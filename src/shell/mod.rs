mod error;
mod executor;
mod interpreter;
mod job_manager;
mod parser;
mod readline;
#[allow(clippy::module_inception)]
mod shell;

pub use shell::Shell;
