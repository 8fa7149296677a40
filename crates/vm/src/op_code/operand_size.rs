//! Operand size information for opcodes.

/// Layout of the operand that follows an opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandSize {
    /// No operand
    None,

    /// Exactly this many bytes
    Fixed(usize),

    /// A little-endian length of this many bytes, then the data
    Prefix(usize),

    /// A variable-length integer length, then the data
    VarPrefix,
}

impl OperandSize {
    /// Checks if the operand has a fixed size.
    pub fn has_fixed_size(&self) -> bool {
        matches!(self, OperandSize::Fixed(_))
    }

    /// Checks if the operand is length prefixed.
    pub fn has_size_prefix(&self) -> bool {
        matches!(self, OperandSize::Prefix(_) | OperandSize::VarPrefix)
    }
}
