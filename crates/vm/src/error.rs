//! Error types for the virtual machine.
//!
//! Every failure during a step is a `VmError`; the engine converts it into
//! the FAULT state and keeps it for the execution receipt.

use thiserror::Error;

/// VM-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    #[error("Stack overflow: {0}")]
    StackOverflow(String),

    #[error("Stack underflow: {0}")]
    StackUnderflow(String),

    #[error("Over max array size: {0}")]
    OverMaxArraySize(String),

    #[error("Over max item size: {0}")]
    OverMaxItemSize(String),

    #[error("Over max big integer size")]
    OverMaxBigIntegerSize,

    #[error("Invocation stack overflow")]
    InvocationStackOverflow,

    #[error("Bad type: {0}")]
    BadType(String),

    #[error("Bad value: {0}")]
    BadValue(String),

    #[error("Index out of bound: {0}")]
    IndexOutOfBound(String),

    #[error("Divide or mod by zero")]
    DivModByZero,

    #[error("Shift by negative value")]
    ShiftByNeg,

    #[error("Opcode not supported: 0x{0:02x}")]
    NotSupportOpcode(u8),

    #[error("Service not supported: {0}")]
    NotSupportService(String),

    #[error("Contract not found: {0}")]
    ContractNotFound(String),

    #[error("Map key does not exist")]
    MapKeyNotExist,

    #[error("Circular reference detected")]
    CircularReference,

    #[error("Over max item count")]
    OverMaxCount,

    #[error("Unexpected end of script: {0}")]
    UnexpectedEof(String),

    #[error("Invalid jump target: {0}")]
    InvalidJump(i64),

    #[error("Out of gas")]
    OutOfGas,

    #[error("Step limit exceeded")]
    StepLimitExceeded,

    #[error("Script threw an exception")]
    Throw,

    #[error("Interop error: {0}")]
    Interop(String),
}

/// Result type for VM operations
pub type VmResult<T> = Result<T, VmError>;

impl VmError {
    pub fn stack_underflow_msg<S: Into<String>>(msg: S) -> Self {
        Self::StackUnderflow(msg.into())
    }

    pub fn bad_type_msg<S: Into<String>>(msg: S) -> Self {
        Self::BadType(msg.into())
    }

    pub fn bad_value_msg<S: Into<String>>(msg: S) -> Self {
        Self::BadValue(msg.into())
    }

    pub fn interop_msg<S: Into<String>>(msg: S) -> Self {
        Self::Interop(msg.into())
    }

    /// Creates a bad type error from the expected and actual type names.
    pub fn invalid_type(expected: &str, found: &str) -> Self {
        Self::BadType(format!("expected {expected}, found {found}"))
    }

    /// Stable, human-readable kind surfaced in execution receipts.
    pub fn kind(&self) -> &'static str {
        match self {
            VmError::StackOverflow(_) => "stack overflow",
            VmError::StackUnderflow(_) => "stack underflow",
            VmError::OverMaxArraySize(_) => "over max array size",
            VmError::OverMaxItemSize(_) => "over max item size",
            VmError::OverMaxBigIntegerSize => "over max biginteger size",
            VmError::InvocationStackOverflow => "invocation stack overflow",
            VmError::BadType(_) => "bad type",
            VmError::BadValue(_) => "bad value",
            VmError::IndexOutOfBound(_) => "index out of bound",
            VmError::DivModByZero => "divide or mod by zero",
            VmError::ShiftByNeg => "shift by negative value",
            VmError::NotSupportOpcode(_) => "opcode not supported",
            VmError::NotSupportService(_) => "service not supported",
            VmError::ContractNotFound(_) => "contract not found",
            VmError::MapKeyNotExist => "map key not exist",
            VmError::CircularReference => "circular reference",
            VmError::OverMaxCount => "over max item count",
            VmError::UnexpectedEof(_) => "unexpected end of script",
            VmError::InvalidJump(_) => "invalid jump",
            VmError::OutOfGas => "out of gas",
            VmError::StepLimitExceeded => "step limit exceeded",
            VmError::Throw => "throw",
            VmError::Interop(_) => "interop error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_is_stable() {
        assert_eq!(VmError::DivModByZero.kind(), "divide or mod by zero");
        assert_eq!(
            VmError::NotSupportService("Foo.Bar".into()).kind(),
            "service not supported"
        );
    }

    #[test]
    fn test_display_includes_context() {
        let err = VmError::invalid_type("Integer", "Array");
        assert_eq!(err.to_string(), "Bad type: expected Integer, found Array");
        assert_eq!(
            VmError::NotSupportOpcode(0xfe).to_string(),
            "Opcode not supported: 0xfe"
        );
    }
}
