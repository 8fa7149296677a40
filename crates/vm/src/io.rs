//! Little-endian readers and writers for bytecode operands and serialized
//! values.

use crate::error::{VmError, VmResult};

/// Cursor over a borrowed byte slice.
pub struct MemoryReader<'a> {
    memory: &'a [u8],
    pos: usize,
}

impl<'a> MemoryReader<'a> {
    pub fn new(memory: &'a [u8]) -> Self {
        Self { memory, pos: 0 }
    }

    /// Starts reading at `pos`.
    pub fn at(memory: &'a [u8], pos: usize) -> Self {
        Self { memory, pos }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.memory.len().saturating_sub(self.pos)
    }

    pub fn read_memory(&mut self, count: usize) -> VmResult<&'a [u8]> {
        if count > self.remaining() {
            return Err(VmError::UnexpectedEof(format!(
                "need {} bytes at offset {}, {} left",
                count,
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.memory[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> VmResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_memory(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> VmResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_bool(&mut self) -> VmResult<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(VmError::bad_value_msg(format!(
                "invalid boolean byte 0x{other:02x}"
            ))),
        }
    }

    pub fn read_i16(&mut self) -> VmResult<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u16(&mut self) -> VmResult<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> VmResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> VmResult<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Reads a variable-length integer, rejecting non-minimal encodings.
    pub fn read_var_int(&mut self, max: u64) -> VmResult<u64> {
        let prefix = self.read_u8()?;
        let value = match prefix {
            0xfd => {
                let v = u64::from(self.read_u16()?);
                if v < 0xfd {
                    return Err(VmError::bad_value_msg("non-canonical var int"));
                }
                v
            }
            0xfe => {
                let v = u64::from(self.read_u32()?);
                if v <= 0xffff {
                    return Err(VmError::bad_value_msg("non-canonical var int"));
                }
                v
            }
            0xff => {
                let v = self.read_u64()?;
                if v <= 0xffff_ffff {
                    return Err(VmError::bad_value_msg("non-canonical var int"));
                }
                v
            }
            small => u64::from(small),
        };
        if value > max {
            return Err(VmError::bad_value_msg(format!(
                "var int {value} exceeds maximum {max}"
            )));
        }
        Ok(value)
    }

    pub fn read_var_bytes(&mut self, max: usize) -> VmResult<&'a [u8]> {
        let len = self.read_var_int(max as u64)? as usize;
        self.read_memory(len)
    }
}

/// Append-only writer with an optional size ceiling.
#[derive(Debug, Default)]
pub struct BinaryWriter {
    buffer: Vec<u8>,
    limit: Option<usize>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A writer that fails once more than `limit` bytes are written.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            buffer: Vec::new(),
            limit: Some(limit),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> VmResult<()> {
        if let Some(limit) = self.limit {
            if self.buffer.len() + bytes.len() > limit {
                return Err(VmError::OverMaxItemSize(format!(
                    "output exceeds {limit} bytes"
                )));
            }
        }
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> VmResult<()> {
        self.write_bytes(&[value])
    }

    pub fn write_bool(&mut self, value: bool) -> VmResult<()> {
        self.write_u8(u8::from(value))
    }

    pub fn write_var_int(&mut self, value: u64) -> VmResult<()> {
        if value < 0xfd {
            self.write_u8(value as u8)
        } else if value <= 0xffff {
            self.write_u8(0xfd)?;
            self.write_bytes(&(value as u16).to_le_bytes())
        } else if value <= 0xffff_ffff {
            self.write_u8(0xfe)?;
            self.write_bytes(&(value as u32).to_le_bytes())
        } else {
            self.write_u8(0xff)?;
            self.write_bytes(&value.to_le_bytes())
        }
    }

    pub fn write_var_bytes(&mut self, bytes: &[u8]) -> VmResult<()> {
        self.write_var_int(bytes.len() as u64)?;
        self.write_bytes(bytes)
    }
}
