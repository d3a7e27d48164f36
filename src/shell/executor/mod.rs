#[allow(clippy::module_inception)]
pub mod executor;
#[cfg(test)]
pub mod fake;
pub mod host;
pub mod report;

pub use executor::Executor;
