//! Control-transfer classification of trace lines

use std::fmt;

/// Indicates what kind of control transfer a trace line records.
///
/// Every classified line receives exactly one kind. `None` means that no
/// control-transfer marker was recognized on the line; it is still a valid
/// instruction and still shows up in the annotated trace.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InstructionKind {
    None,

    /// Ordinary procedure call.
    Call,

    /// Ordinary procedure return.
    Return,

    /// Trap-style call, e.g. system call entry.
    ///
    /// The simulator logs a one-line trap frame after these, so their
    /// fall-through address is two instructions away rather than one.
    PrivilegedCall,

    /// Trap-style return, e.g. system call exit.
    PrivilegedReturn,
}

impl InstructionKind {
    /// Every control-transfer kind, in classification priority order.
    ///
    /// A line is assigned the first kind in this list whose marker it
    /// carries. `SYSCALL` has to be tested before `CALL` since the former
    /// contains the latter as a substring.
    pub const PRIORITY: [InstructionKind; 4] = [
        InstructionKind::PrivilegedCall,
        InstructionKind::PrivilegedReturn,
        InstructionKind::Call,
        InstructionKind::Return,
    ];

    /// The keyword the simulator writes into the trace for this kind.
    pub fn marker(self) -> Option<&'static str> {
        match self {
            InstructionKind::None => None,
            InstructionKind::Call => Some("CALL"),
            InstructionKind::Return => Some("RETURN"),
            InstructionKind::PrivilegedCall => Some("SYSCALL"),
            InstructionKind::PrivilegedReturn => Some("SYSRETURN"),
        }
    }

    /// Classify a tokenized line by exact token membership.
    pub fn match_tokens(tokens: &[&str]) -> Self {
        Self::first_match(|marker| tokens.iter().any(|t| *t == marker))
    }

    /// Classify raw, untokenized text by substring search.
    ///
    /// This is deliberately looser than `match_tokens`: `XCALL` counts as a
    /// call here but not there.
    pub fn match_text(text: &str) -> Self {
        Self::first_match(|marker| text.contains(marker))
    }

    fn first_match<F>(mut has_marker: F) -> Self
    where
        F: FnMut(&str) -> bool,
    {
        Self::PRIORITY
            .iter()
            .copied()
            .find(|kind| kind.marker().map_or(false, &mut has_marker))
            .unwrap_or(InstructionKind::None)
    }

    pub fn is_control_transfer(self) -> bool {
        self != InstructionKind::None
    }

    pub fn is_call(self) -> bool {
        matches!(
            self,
            InstructionKind::Call | InstructionKind::PrivilegedCall
        )
    }

    pub fn is_return(self) -> bool {
        matches!(
            self,
            InstructionKind::Return | InstructionKind::PrivilegedReturn
        )
    }

    /// Distance between this instruction and the next one when the transfer
    /// is not taken.
    ///
    /// Privileged calls skip over the trap frame line, hence the wider
    /// stride.
    pub fn fallthrough_stride(self) -> u64 {
        match self {
            InstructionKind::PrivilegedCall => 8,
            _ => 4,
        }
    }
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.marker().unwrap_or(""))
    }
}
