//! Error type for trace analysis

use crate::analysis::Counters;
use crate::trace::SIMULATION_MARKER;
use std::{io, result};
use thiserror::Error;

/// Error type for trace analysis.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying cause of error is I/O related
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// The trace never reached the simulation banner, so there is nothing to
    /// replay.
    #[error("{} pattern not found", SIMULATION_MARKER)]
    MissingMarker,

    /// A taken return was replayed while no call was outstanding.
    #[error("return at {pc:#x} (trace line {line}) has no matching call")]
    RasUnderflow { line: usize, pc: u64 },

    /// A taken return did not land on the address its matching call pushed.
    #[error("return at trace line {line} expected to land at {expected:#x}, landed at {found:#x}")]
    RasMismatch {
        line: usize,
        expected: u64,
        found: u64,
    },

    /// A taken return was the last analyzed instruction, so where it landed
    /// cannot be checked.
    #[error("return at trace line {line} expected to land at {expected:#x}, but the trace ended")]
    DanglingReturn { line: usize, expected: u64 },

    /// The summary tally and the tally taken while replaying disagree.
    ///
    /// Both are computed from the same instruction sequence, so this
    /// indicates a programming error in the analyzer itself.
    #[error("dynamic counts disagree: summary {summary}, replay {replay}")]
    DynamicCountMismatch { summary: Counters, replay: Counters },
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        match err {
            Error::IoError(e) => e,
            Error::MissingMarker => io::Error::new(io::ErrorKind::InvalidData, format!("{}", err)),
            _ => io::Error::new(io::ErrorKind::Other, format!("{}", err)),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;
