//! Command-line interface module.

mod args;
pub mod listen;
pub mod send;

pub use args::{Cli, CommandFilter, Commands, GotoArgs};
