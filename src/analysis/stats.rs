//! Per-kind tallies of control-transfer instructions

use crate::analysis::Instruction;
use crate::trace::InstructionKind;
use std::fmt;

/// A tally of control-transfer instructions, one slot per non-`None` kind.
///
/// Slots only ever increase. Static and dynamic counts are kept in separate
/// instances and are not expected to agree with one another.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    privileged_calls: usize,
    privileged_returns: usize,
    calls: usize,
    returns: usize,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one instruction of the given kind.
    ///
    /// `None` has no slot and is ignored.
    pub fn bump(&mut self, kind: InstructionKind) -> &mut Self {
        match kind {
            InstructionKind::None => {}
            InstructionKind::Call => self.calls += 1,
            InstructionKind::Return => self.returns += 1,
            InstructionKind::PrivilegedCall => self.privileged_calls += 1,
            InstructionKind::PrivilegedReturn => self.privileged_returns += 1,
        }

        self
    }

    pub fn get(&self, kind: InstructionKind) -> usize {
        match kind {
            InstructionKind::None => 0,
            InstructionKind::Call => self.calls,
            InstructionKind::Return => self.returns,
            InstructionKind::PrivilegedCall => self.privileged_calls,
            InstructionKind::PrivilegedReturn => self.privileged_returns,
        }
    }

    pub fn total(&self) -> usize {
        InstructionKind::PRIORITY.iter().map(|k| self.get(*k)).sum()
    }
}

/// Renders as `SYSCALL : SYSRETURN : CALL : RETURN = a : b : c : d`.
impl fmt::Display for Counters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = InstructionKind::PRIORITY
            .iter()
            .map(|k| k.to_string())
            .collect();
        let counts: Vec<_> = InstructionKind::PRIORITY
            .iter()
            .map(|k| self.get(*k).to_string())
            .collect();

        write!(f, "{} = {}", names.join(" : "), counts.join(" : "))
    }
}

/// Tally control-transfer markers over the raw text of a trace.
///
/// Every line is scanned, including the ones before the simulation banner.
/// Markers are found by substring search and each line lands in at most one
/// bucket, the first in priority order.
pub fn static_counts<S>(lines: &[S]) -> Counters
where
    S: AsRef<str>,
{
    let mut counters = Counters::new();

    for line in lines {
        counters.bump(InstructionKind::match_text(line.as_ref()));
    }

    counters
}

/// Tally the taken control transfers of an analyzed instruction sequence.
///
/// The replay keeps its own tally as it goes; this one is the reference it is
/// checked against.
pub fn dynamic_counts(instructions: &[Instruction]) -> Counters {
    let mut counters = Counters::new();

    for instr in instructions.iter().filter(|i| i.is_taken()) {
        counters.bump(instr.kind());
    }

    counters
}
