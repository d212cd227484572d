//! Tokenized simulator trace lines

use crate::trace::InstructionKind;

/// Name of the field holding an instruction's address.
pub const PC_FIELD: &str = "pc";

/// Name of the field holding an instruction's encoding.
pub const MACHINE_CODE_FIELD: &str = "machcode";

/// One line of simulator output, split on whitespace.
///
/// The simulator writes fields as three separate tokens, `name = value`.
/// There is no quoting or escaping, so a value never contains whitespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> Line<'a> {
    pub fn new(text: &'a str) -> Self {
        Line {
            tokens: text.split_whitespace().collect(),
        }
    }

    /// Extract the value of a `name = value` field.
    ///
    /// Only the first token equal to `name` is considered. If it is not
    /// followed by an `=` token and a value token, the field is absent, even
    /// if a later occurrence of `name` would have matched.
    pub fn field(&self, name: &str) -> Option<&'a str> {
        let at = self.tokens.iter().position(|t| *t == name)?;

        match self.tokens.get(at + 1..at + 3) {
            Some([eq, value]) if *eq == "=" => Some(*value),
            _ => None,
        }
    }

    /// The program counter recorded on this line.
    ///
    /// A `pc` field whose value is not hexadecimal is treated the same as a
    /// missing one.
    pub fn pc(&self) -> Option<u64> {
        self.field(PC_FIELD).and_then(parse_address)
    }

    pub fn machine_code(&self) -> Option<&'a str> {
        self.field(MACHINE_CODE_FIELD)
    }

    /// Determine which control-transfer marker, if any, this line carries.
    pub fn classify(&self) -> InstructionKind {
        InstructionKind::match_tokens(&self.tokens)
    }
}

/// Parse a hexadecimal address, with or without a `0x` prefix.
pub fn parse_address(text: &str) -> Option<u64> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);

    u64::from_str_radix(digits, 16).ok()
}
