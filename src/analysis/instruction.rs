//! Instruction records and taken/not-taken resolution

use crate::trace::{InstructionKind, Line};
use log::{debug, trace};

/// A single executed instruction recovered from the trace.
///
/// Only lines which carry both a program counter and an instruction
/// encoding become instructions. Lines without an encoding describe an
/// instruction the simulator did not commit and are ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    kind: InstructionKind,
    pc: u64,
    taken: bool,
    machine_code: String,
    line: usize,
}

impl Instruction {
    /// Build a not-taken instruction from a parsed trace line.
    ///
    /// `line` is the zero-based index of the line within the whole trace,
    /// and is only kept for diagnostics.
    pub fn from_line(parsed: &Line<'_>, line: usize) -> Option<Self> {
        let kind = parsed.classify();
        let pc = parsed.pc()?;
        let machine_code = parsed.machine_code()?;

        Some(Instruction {
            kind,
            pc,
            taken: false,
            machine_code: machine_code.to_string(),
            line,
        })
    }

    pub fn kind(&self) -> InstructionKind {
        self.kind
    }

    pub fn pc(&self) -> u64 {
        self.pc
    }

    /// Whether this control transfer actually diverted execution.
    ///
    /// Always `false` for `InstructionKind::None`.
    pub fn is_taken(&self) -> bool {
        self.taken
    }

    pub fn machine_code(&self) -> &str {
        &self.machine_code
    }

    pub fn line(&self) -> usize {
        self.line
    }

    /// The address execution continues at if this instruction falls through.
    ///
    /// For calls, this is also the address the matching return must land on.
    pub fn fallthrough(&self) -> u64 {
        self.pc.wrapping_add(self.kind.fallthrough_stride())
    }

    /// How many lines ahead of this one the next executed instruction sits.
    ///
    /// Privileged calls are followed by a trap-entry line which has to be
    /// skipped over.
    pub fn lookahead_distance(&self) -> usize {
        match self.kind {
            InstructionKind::PrivilegedCall => 2,
            _ => 1,
        }
    }

    /// Decide whether this instruction was taken, given the line at which
    /// execution continued.
    ///
    /// Returns `None` if the outcome cannot be determined because there is no
    /// such line or it carries no usable program counter. Otherwise the
    /// instruction is taken whenever the next program counter is anything
    /// other than the fall-through address.
    pub fn resolve_taken(&self, next: Option<&Line<'_>>) -> Option<bool> {
        let next_pc = next?.pc()?;
        let delta = i128::from(next_pc) - i128::from(self.pc);

        Some(delta != i128::from(self.kind.fallthrough_stride()))
    }
}

/// Recover the sequence of executed instructions from a trace.
///
/// Analysis begins at line `start`, usually the line after the simulation
/// banner. Control-transfer instructions are resolved against the raw trace
/// line that follows them. A control transfer whose outcome cannot be
/// resolved is dropped from the sequence altogether rather than being
/// treated as not taken.
pub fn analyzed_sequence<S>(lines: &[S], start: usize) -> Vec<Instruction>
where
    S: AsRef<str>,
{
    let mut instructions = Vec::new();

    for (index, text) in lines.iter().enumerate().skip(start) {
        let parsed = Line::new(text.as_ref());
        let mut instr = match Instruction::from_line(&parsed, index) {
            Some(instr) => instr,
            None => {
                trace!("Line {} is not a committed instruction", index);
                continue;
            }
        };

        if instr.kind.is_control_transfer() {
            let next = lines
                .get(index + instr.lookahead_distance())
                .map(|l| Line::new(l.as_ref()));

            match instr.resolve_taken(next.as_ref()) {
                Some(taken) => instr.taken = taken,
                None => {
                    debug!(
                        "Dropping {} at {:#x} (line {}): no program counter to resolve against",
                        instr.kind, instr.pc, index
                    );
                    continue;
                }
            }
        }

        instructions.push(instr);
    }

    instructions
}
