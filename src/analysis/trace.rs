//! Annotated control-flow trace

use crate::analysis::Instruction;

/// An individual event in the annotated trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceEvent {
    /// The execution of an instruction, at a particular call depth.
    ///
    /// The depth is the number of outstanding return addresses at the time
    /// the instruction was logged: calls are logged after their push, and
    /// returns before their pop.
    Execute { instr: Instruction, depth: usize },

    /// The topmost return addresses, innermost last, as they stood right
    /// before a return popped one of them.
    StackTail(Vec<u64>),

    /// A return landed somewhere other than its expected return address.
    ///
    /// Carries the instruction it landed on instead, and the call depth once
    /// the mismatched return address was popped.
    Mismatch { next: Instruction, depth: usize },

    /// A return found no outstanding return address to pop.
    Underflow,
}

/// A Trace is the record of a return-address stack replay: what each
/// instruction did to the stack, and where the replay went wrong, if it did.
///
/// A trace is always complete up to and including the event that halted the
/// replay, so it can be shown to the user even when the replay failed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Trace {
    log: Vec<TraceEvent>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new instruction execution to the trace.
    pub fn executed(&mut self, instr: Instruction, depth: usize) -> &mut Self {
        self.log.push(TraceEvent::Execute { instr, depth });
        self
    }

    /// Add a snapshot of the top of the return-address stack to the trace.
    pub fn stack_tail(&mut self, tail: &[u64]) -> &mut Self {
        self.log.push(TraceEvent::StackTail(tail.to_vec()));
        self
    }

    /// Add a failed return-address check to the trace.
    ///
    /// This should be the last event of a trace.
    pub fn mismatched(&mut self, next: Instruction, depth: usize) -> &mut Self {
        self.log.push(TraceEvent::Mismatch { next, depth });
        self
    }

    /// Add a return with nothing to pop to the trace.
    ///
    /// This should be the last event of a trace.
    pub fn underflowed(&mut self) -> &mut Self {
        self.log.push(TraceEvent::Underflow);
        self
    }

    /// Read out the contents of the trace.
    pub fn iter(&self) -> impl Iterator<Item = &TraceEvent> {
        self.log.iter()
    }
}
