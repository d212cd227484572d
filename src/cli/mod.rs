//! CLI commands

mod main;

pub use main::main;
