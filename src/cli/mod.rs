//! Command-line interface module.

mod args;
pub mod convert;

pub use args::Cli;
pub use convert::run;
