//! Script builder module for the virtual machine.
//!
//! Assembles bytecode programmatically; used by tests, benchmarks and hosts
//! that generate invocation scripts.

use crate::int_value::IntValue;
use crate::op_code::OpCode;

/// Append-only assembler for NeoVM bytecode.
#[derive(Debug, Default, Clone)]
pub struct ScriptBuilder {
    script: Vec<u8>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current length of the script, the offset of the next emitted byte.
    pub fn len(&self) -> usize {
        self.script.len()
    }

    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }

    /// Appends one raw byte.
    pub fn emit(&mut self, op: u8) -> &mut Self {
        self.script.push(op);
        self
    }

    /// Appends `op`.
    pub fn emit_opcode(&mut self, op: OpCode) -> &mut Self {
        self.emit(op as u8)
    }

    /// Appends `bytes` unchanged.
    pub fn emit_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.script.extend_from_slice(bytes);
        self
    }

    /// Emits the shortest push of `data`.
    pub fn emit_push(&mut self, data: &[u8]) -> &mut Self {
        match data.len() {
            0 => return self.emit_opcode(OpCode::PUSH0),
            n if n <= OpCode::PUSHBYTES75 as usize => self.emit(n as u8),
            n if n <= u8::MAX as usize => self.emit_opcode(OpCode::PUSHDATA1).emit(n as u8),
            n if n <= u16::MAX as usize => self
                .emit_opcode(OpCode::PUSHDATA2)
                .emit_bytes(&(n as u16).to_le_bytes()),
            n => self
                .emit_opcode(OpCode::PUSHDATA4)
                .emit_bytes(&(n as u32).to_le_bytes()),
        };
        self.emit_bytes(data)
    }

    /// Pushes `value` with the small-integer opcodes where one exists.
    pub fn emit_push_int(&mut self, value: i64) -> &mut Self {
        match value {
            -1 => self.emit_opcode(OpCode::PUSHM1),
            0 => self.emit_opcode(OpCode::PUSH0),
            1..=16 => self.emit(OpCode::PUSH1 as u8 + (value as u8 - 1)),
            _ => self.emit_push(&IntValue::from_i64(value).to_bytes()),
        }
    }

    pub fn emit_push_bool(&mut self, value: bool) -> &mut Self {
        self.emit_opcode(if value { OpCode::PUSHT } else { OpCode::PUSHF })
    }

    pub fn emit_push_string(&mut self, value: &str) -> &mut Self {
        self.emit_push(value.as_bytes())
    }

    /// Emits JMP, JMPIF, JMPIFNOT or CALL with an offset relative to the
    /// opcode itself.
    pub fn emit_jump(&mut self, op: OpCode, offset: i16) -> &mut Self {
        self.emit_opcode(op);
        self.emit_bytes(&offset.to_le_bytes())
    }

    pub fn emit_call(&mut self, offset: i16) -> &mut Self {
        self.emit_jump(OpCode::CALL, offset)
    }

    /// Emits SYSCALL with a var-int length-prefixed name.
    pub fn emit_syscall(&mut self, api: &str) -> &mut Self {
        let name = api.as_bytes();
        self.emit_opcode(OpCode::SYSCALL);
        self.emit_var_int(name.len() as u64);
        self.emit_bytes(name)
    }

    /// Emits APPCALL, or TAILCALL when `tail` is set. An all-zero hash makes
    /// the callee read the target from the stack.
    pub fn emit_app_call(&mut self, script_hash: &[u8; 20], tail: bool) -> &mut Self {
        self.emit_opcode(if tail { OpCode::TAILCALL } else { OpCode::APPCALL });
        self.emit_bytes(script_hash)
    }

    fn emit_var_int(&mut self, value: u64) -> &mut Self {
        match value {
            v if v < 0xFD => self.emit(v as u8),
            v if v <= u16::MAX as u64 => self.emit(0xFD).emit_bytes(&(v as u16).to_le_bytes()),
            v if v <= u32::MAX as u64 => self.emit(0xFE).emit_bytes(&(v as u32).to_le_bytes()),
            v => self.emit(0xFF).emit_bytes(&v.to_le_bytes()),
        }
    }

    /// Copies the assembled bytes out.
    pub fn to_array(&self) -> Vec<u8> {
        self.script.clone()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.script
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_push_int() {
        let mut sb = ScriptBuilder::new();
        sb.emit_push_int(-1)
            .emit_push_int(0)
            .emit_push_int(16)
            .emit_push_int(17)
            .emit_push_int(-2);
        assert_eq!(sb.to_array(), vec![0x4F, 0x00, 0x60, 0x01, 0x11, 0x01, 0xFE]);
    }

    #[test]
    fn test_emit_push_thresholds() {
        let mut sb = ScriptBuilder::new();
        sb.emit_push(&[0xAA; 75]);
        assert_eq!(sb.to_array()[0], 75);
        assert_eq!(sb.len(), 76);

        let mut sb = ScriptBuilder::new();
        sb.emit_push(&[0xAA; 76]);
        assert_eq!(&sb.to_array()[..2], &[0x4C, 76]);

        let mut sb = ScriptBuilder::new();
        sb.emit_push(&[0xAA; 256]);
        assert_eq!(&sb.to_array()[..3], &[0x4D, 0x00, 0x01]);
    }

    #[test]
    fn test_emit_syscall() {
        let mut sb = ScriptBuilder::new();
        sb.emit_syscall("System.Runtime.Log");
        let script = sb.into_bytes();
        assert_eq!(script[0], OpCode::SYSCALL as u8);
        assert_eq!(script[1] as usize, "System.Runtime.Log".len());
        assert_eq!(&script[2..], b"System.Runtime.Log");
    }

    #[test]
    fn test_emit_jump_and_app_call() {
        let mut sb = ScriptBuilder::new();
        sb.emit_jump(OpCode::JMP, -3).emit_app_call(&[7u8; 20], true);
        let script = sb.to_array();
        assert_eq!(&script[..3], &[0x62, 0xFD, 0xFF]);
        assert_eq!(script[3], OpCode::TAILCALL as u8);
        assert_eq!(script.len(), 24);
    }
}
