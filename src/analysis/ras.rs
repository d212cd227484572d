//! Return-address stack replay

use crate::analysis::{Counters, Error, Instruction, Result, Trace};
use log::trace;

/// A model of a return-address stack.
///
/// Calls push the address their matching return has to land on, returns pop
/// it back off. The stack lives for a single replay.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReturnStack {
    entries: Vec<u64>,
}

impl ReturnStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, return_addr: u64) {
        self.entries.push(return_addr);
    }

    pub fn pop(&mut self) -> Option<u64> {
        self.entries.pop()
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// The topmost `n` entries, innermost last.
    pub fn tail(&self, n: usize) -> &[u64] {
        &self.entries[self.entries.len().saturating_sub(n)..]
    }
}

/// Replay an analyzed instruction sequence against a return-address stack.
///
/// Every instruction is logged to `log` at the call depth it executed at.
/// Each taken return must land on the instruction immediately following it
/// in `instructions`; the first one which doesn't, or which finds the stack
/// empty, halts the replay with an error after the failure has been logged.
///
/// On success, yields a tally of the taken control transfers seen during
/// the replay.
pub fn replay(instructions: &[Instruction], log: &mut Trace) -> Result<Counters> {
    let mut ras = ReturnStack::new();
    let mut counters = Counters::new();

    for (at, instr) in instructions.iter().enumerate() {
        let kind = instr.kind();

        if instr.is_taken() && kind.is_call() {
            counters.bump(kind);
            ras.push(instr.fallthrough());
            trace!(
                "{:#x} [{}]: push {:#x}",
                instr.pc(),
                instr.machine_code(),
                instr.fallthrough()
            );

            log.executed(instr.clone(), ras.depth());
        } else if instr.is_taken() && kind.is_return() {
            counters.bump(kind);

            log.executed(instr.clone(), ras.depth());
            log.stack_tail(ras.tail(2));

            let expected = match ras.pop() {
                Some(expected) => expected,
                None => {
                    log.underflowed();

                    return Err(Error::RasUnderflow {
                        line: instr.line(),
                        pc: instr.pc(),
                    });
                }
            };
            trace!(
                "{:#x} [{}]: pop {:#x}",
                instr.pc(),
                instr.machine_code(),
                expected
            );

            let next = instructions.get(at + 1).ok_or(Error::DanglingReturn {
                line: instr.line(),
                expected,
            })?;

            if next.pc() != expected {
                log.mismatched(next.clone(), ras.depth());

                return Err(Error::RasMismatch {
                    line: instr.line(),
                    expected,
                    found: next.pc(),
                });
            }
        } else {
            log.executed(instr.clone(), ras.depth());
        }
    }

    Ok(counters)
}
