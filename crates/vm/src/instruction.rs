//! Instruction decoding.
//!
//! An [`Instruction`] is a view into the shared code buffer: the opcode
//! byte at some position plus the byte range of its operand.

use crate::error::{VmError, VmResult};
use crate::io::MemoryReader;
use crate::op_code::{OpCode, OperandSize};
use std::convert::TryFrom;
use std::sync::Arc;

/// A decoded instruction.
#[derive(Debug, Clone)]
pub struct Instruction {
    code: Arc<[u8]>,
    opcode: u8,
    position: usize,
    operand_start: usize,
    operand_end: usize,
}

impl Instruction {
    /// Decodes the instruction at `position`.
    ///
    /// Length-prefixed operands larger than `max_item_size` are rejected
    /// before anything is read, and a truncated operand is an error.
    pub fn decode(code: &Arc<[u8]>, position: usize, max_item_size: usize) -> VmResult<Self> {
        let mut reader = MemoryReader::at(code, position);
        let opcode = reader.read_u8()?;
        let data_len = match OpCode::operand_size_of(opcode)? {
            OperandSize::None => 0,
            OperandSize::Fixed(n) => n,
            OperandSize::Prefix(prefix) => {
                let len = match prefix {
                    1 => u64::from(reader.read_u8()?),
                    2 => u64::from(reader.read_u16()?),
                    _ => u64::from(reader.read_u32()?),
                };
                if len > max_item_size as u64 {
                    return Err(VmError::OverMaxItemSize(format!(
                        "push of {len} bytes at offset {position}"
                    )));
                }
                len as usize
            }
            OperandSize::VarPrefix => reader.read_var_int(max_item_size as u64)? as usize,
        };
        let operand_start = reader.position();
        reader.read_memory(data_len)?;
        Ok(Self {
            code: code.clone(),
            opcode,
            position,
            operand_start,
            operand_end: reader.position(),
        })
    }

    /// The raw opcode byte.
    pub fn opcode_byte(&self) -> u8 {
        self.opcode
    }

    /// The named opcode, if the byte has one.
    pub fn opcode(&self) -> VmResult<OpCode> {
        OpCode::try_from(self.opcode)
    }

    /// Offset of the opcode byte in the script.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Offset of the byte following this instruction.
    pub fn next_position(&self) -> usize {
        self.operand_end
    }

    /// Total encoded length of the instruction.
    pub fn size(&self) -> usize {
        self.operand_end - self.position
    }

    /// Operand bytes without any length prefix.
    pub fn operand(&self) -> &[u8] {
        &self.code[self.operand_start..self.operand_end]
    }

    /// Signed 16-bit jump offset of JMP, JMPIF, JMPIFNOT and CALL.
    pub fn token_i16(&self) -> VmResult<i16> {
        MemoryReader::new(self.operand()).read_i16()
    }

    /// The 20-byte script hash of APPCALL and TAILCALL.
    pub fn token_hash(&self) -> VmResult<[u8; 20]> {
        <[u8; 20]>::try_from(self.operand())
            .map_err(|_| VmError::bad_value_msg("script hash operand must be 20 bytes"))
    }

    /// The service name of SYSCALL.
    pub fn token_string(&self) -> VmResult<String> {
        String::from_utf8(self.operand().to_vec())
            .map_err(|_| VmError::bad_value_msg("syscall name is not valid UTF-8"))
    }
}
