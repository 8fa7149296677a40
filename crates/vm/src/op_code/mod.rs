//! OpCode definitions for the virtual machine.
//!
//! Byte values follow the historical NeoVM 2 instruction set. The range
//! `0x01..=0x4B` is PUSHBYTES1..PUSHBYTES75; only its endpoints are named
//! variants, everything in between is decoded generically from the raw byte.

pub mod operand_size;

pub use operand_size::OperandSize;

use crate::error::{VmError, VmResult};
use std::convert::TryFrom;
use std::fmt;

macro_rules! define_opcodes {
    ($($name:ident = $value:literal => $operand:expr,)*) => {
        /// Instruction opcodes.
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[allow(clippy::upper_case_acronyms)]
        pub enum OpCode {
            $($name = $value,)*
        }

        impl OpCode {
            /// Mnemonic of the opcode.
            pub fn name(self) -> &'static str {
                match self {
                    $(OpCode::$name => stringify!($name),)*
                }
            }

            fn declared_operand(self) -> OperandSize {
                match self {
                    $(OpCode::$name => $operand,)*
                }
            }
        }

        impl TryFrom<u8> for OpCode {
            type Error = VmError;

            fn try_from(byte: u8) -> VmResult<Self> {
                match byte {
                    $($value => Ok(OpCode::$name),)*
                    other => Err(VmError::NotSupportOpcode(other)),
                }
            }
        }
    };
}

define_opcodes! {
    // Constants
    PUSH0 = 0x00 => OperandSize::None,
    PUSHBYTES1 = 0x01 => OperandSize::Fixed(1),
    PUSHBYTES75 = 0x4B => OperandSize::Fixed(75),
    PUSHDATA1 = 0x4C => OperandSize::Prefix(1),
    PUSHDATA2 = 0x4D => OperandSize::Prefix(2),
    PUSHDATA4 = 0x4E => OperandSize::Prefix(4),
    PUSHM1 = 0x4F => OperandSize::None,
    PUSH1 = 0x51 => OperandSize::None,
    PUSH2 = 0x52 => OperandSize::None,
    PUSH3 = 0x53 => OperandSize::None,
    PUSH4 = 0x54 => OperandSize::None,
    PUSH5 = 0x55 => OperandSize::None,
    PUSH6 = 0x56 => OperandSize::None,
    PUSH7 = 0x57 => OperandSize::None,
    PUSH8 = 0x58 => OperandSize::None,
    PUSH9 = 0x59 => OperandSize::None,
    PUSH10 = 0x5A => OperandSize::None,
    PUSH11 = 0x5B => OperandSize::None,
    PUSH12 = 0x5C => OperandSize::None,
    PUSH13 = 0x5D => OperandSize::None,
    PUSH14 = 0x5E => OperandSize::None,
    PUSH15 = 0x5F => OperandSize::None,
    PUSH16 = 0x60 => OperandSize::None,

    // Flow control
    NOP = 0x61 => OperandSize::None,
    JMP = 0x62 => OperandSize::Fixed(2),
    JMPIF = 0x63 => OperandSize::Fixed(2),
    JMPIFNOT = 0x64 => OperandSize::Fixed(2),
    CALL = 0x65 => OperandSize::Fixed(2),
    RET = 0x66 => OperandSize::None,
    APPCALL = 0x67 => OperandSize::Fixed(20),
    SYSCALL = 0x68 => OperandSize::VarPrefix,
    TAILCALL = 0x69 => OperandSize::Fixed(20),

    // Stack
    DUPFROMALTSTACK = 0x6A => OperandSize::None,
    TOALTSTACK = 0x6B => OperandSize::None,
    FROMALTSTACK = 0x6C => OperandSize::None,
    XDROP = 0x6D => OperandSize::None,
    DCALL = 0x6E => OperandSize::None,
    XSWAP = 0x72 => OperandSize::None,
    XTUCK = 0x73 => OperandSize::None,
    DEPTH = 0x74 => OperandSize::None,
    DROP = 0x75 => OperandSize::None,
    DUP = 0x76 => OperandSize::None,
    NIP = 0x77 => OperandSize::None,
    OVER = 0x78 => OperandSize::None,
    PICK = 0x79 => OperandSize::None,
    ROLL = 0x7A => OperandSize::None,
    ROT = 0x7B => OperandSize::None,
    SWAP = 0x7C => OperandSize::None,
    TUCK = 0x7D => OperandSize::None,

    // Splice
    CAT = 0x7E => OperandSize::None,
    SUBSTR = 0x7F => OperandSize::None,
    LEFT = 0x80 => OperandSize::None,
    RIGHT = 0x81 => OperandSize::None,
    SIZE = 0x82 => OperandSize::None,

    // Bitwise logic
    INVERT = 0x83 => OperandSize::None,
    AND = 0x84 => OperandSize::None,
    OR = 0x85 => OperandSize::None,
    XOR = 0x86 => OperandSize::None,
    EQUAL = 0x87 => OperandSize::None,

    // Arithmetic
    INC = 0x8B => OperandSize::None,
    DEC = 0x8C => OperandSize::None,
    SIGN = 0x8D => OperandSize::None,
    NEGATE = 0x8F => OperandSize::None,
    ABS = 0x90 => OperandSize::None,
    NOT = 0x91 => OperandSize::None,
    NZ = 0x92 => OperandSize::None,
    ADD = 0x93 => OperandSize::None,
    SUB = 0x94 => OperandSize::None,
    MUL = 0x95 => OperandSize::None,
    DIV = 0x96 => OperandSize::None,
    MOD = 0x97 => OperandSize::None,
    SHL = 0x98 => OperandSize::None,
    SHR = 0x99 => OperandSize::None,
    BOOLAND = 0x9A => OperandSize::None,
    BOOLOR = 0x9B => OperandSize::None,
    NUMEQUAL = 0x9C => OperandSize::None,
    NUMNOTEQUAL = 0x9E => OperandSize::None,
    LT = 0x9F => OperandSize::None,
    GT = 0xA0 => OperandSize::None,
    LTE = 0xA1 => OperandSize::None,
    GTE = 0xA2 => OperandSize::None,
    MIN = 0xA3 => OperandSize::None,
    MAX = 0xA4 => OperandSize::None,
    WITHIN = 0xA5 => OperandSize::None,

    // Crypto
    SHA1 = 0xA7 => OperandSize::None,
    SHA256 = 0xA8 => OperandSize::None,
    HASH160 = 0xA9 => OperandSize::None,
    HASH256 = 0xAA => OperandSize::None,
    CHECKSIG = 0xAC => OperandSize::None,
    VERIFY = 0xAD => OperandSize::None,
    CHECKMULTISIG = 0xAE => OperandSize::None,

    // Array
    ARRAYSIZE = 0xC0 => OperandSize::None,
    PACK = 0xC1 => OperandSize::None,
    UNPACK = 0xC2 => OperandSize::None,
    PICKITEM = 0xC3 => OperandSize::None,
    SETITEM = 0xC4 => OperandSize::None,
    NEWARRAY = 0xC5 => OperandSize::None,
    NEWSTRUCT = 0xC6 => OperandSize::None,
    NEWMAP = 0xC7 => OperandSize::None,
    APPEND = 0xC8 => OperandSize::None,
    REVERSE = 0xC9 => OperandSize::None,
    REMOVE = 0xCA => OperandSize::None,
    HASKEY = 0xCB => OperandSize::None,
    KEYS = 0xCC => OperandSize::None,
    VALUES = 0xCD => OperandSize::None,

    // Exceptions
    THROW = 0xF0 => OperandSize::None,
    THROWIFNOT = 0xF1 => OperandSize::None,
}

impl OpCode {
    /// PUSHF alias of PUSH0.
    pub const PUSHF: OpCode = OpCode::PUSH0;
    /// PUSHT alias of PUSH1.
    pub const PUSHT: OpCode = OpCode::PUSH1;

    /// True for the raw bytes PUSHBYTES1..PUSHBYTES75.
    pub fn is_push_bytes(byte: u8) -> bool {
        (OpCode::PUSHBYTES1 as u8..=OpCode::PUSHBYTES75 as u8).contains(&byte)
    }

    /// Operand layout for a raw opcode byte, including the unnamed
    /// PUSHBYTES range.
    pub fn operand_size_of(byte: u8) -> VmResult<OperandSize> {
        if Self::is_push_bytes(byte) {
            return Ok(OperandSize::Fixed(byte as usize));
        }
        Ok(OpCode::try_from(byte)?.declared_operand())
    }

    pub fn operand_size(self) -> OperandSize {
        self.declared_operand()
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
