//! Tools for analysis of simulated control flow

mod error;
mod instruction;
mod ras;
mod stats;
mod trace;

pub use error::Error;
pub use error::Result;
pub use instruction::{analyzed_sequence, Instruction};
pub use ras::{replay, ReturnStack};
pub use stats::{dynamic_counts, static_counts, Counters};
pub use trace::{Trace, TraceEvent};

#[cfg(test)]
mod tests;
