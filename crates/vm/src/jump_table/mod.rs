//! Jump table module for the virtual machine.
//!
//! Maps every opcode byte to its handler. The table is built once and
//! shared read-only between engines.

pub mod bitwise;
pub mod compound;
pub mod control;
pub mod crypto;
pub mod exceptions;
pub mod numeric;
pub mod push;
pub mod splice;
pub mod stack;

use crate::error::VmResult;
use crate::execution_engine::ExecutionEngine;
use crate::host::ExecutionHost;
use crate::instruction::Instruction;
use crate::op_code::OpCode;
use std::fmt;

/// Executes one decoded instruction against the engine.
pub type InstructionHandler<H> = fn(&mut ExecutionEngine<H>, &Instruction) -> VmResult<()>;

/// Opcode-indexed dispatch table shared by every engine built from it.
pub struct JumpTable<H> {
    /// One entry per possible opcode byte.
    handlers: [Option<InstructionHandler<H>>; 256],
}

impl<H> Clone for JumpTable<H> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers,
        }
    }
}

impl<H> fmt::Debug for JumpTable<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registered = self.handlers.iter().filter(|h| h.is_some()).count();
        f.debug_struct("JumpTable")
            .field("registered", &registered)
            .finish()
    }
}

impl<H: ExecutionHost> Default for JumpTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ExecutionHost> JumpTable<H> {
    /// Creates a jump table with every opcode handler registered.
    pub fn new() -> Self {
        let mut jump_table = Self {
            handlers: [None; 256],
        };
        push::register_handlers(&mut jump_table);
        control::register_handlers(&mut jump_table);
        stack::register_handlers(&mut jump_table);
        splice::register_handlers(&mut jump_table);
        bitwise::register_handlers(&mut jump_table);
        numeric::register_handlers(&mut jump_table);
        crypto::register_handlers(&mut jump_table);
        compound::register_handlers(&mut jump_table);
        exceptions::register_handlers(&mut jump_table);
        jump_table
    }

    /// Registers a handler for an opcode, replacing any previous one.
    pub fn register(&mut self, opcode: OpCode, handler: InstructionHandler<H>) {
        self.handlers[opcode as usize] = Some(handler);
    }

    /// Gets the handler for a raw opcode byte.
    pub fn get_handler(&self, byte: u8) -> Option<InstructionHandler<H>> {
        self.handlers[byte as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::BasicHost;
    use std::convert::TryFrom;

    #[test]
    fn test_every_named_opcode_has_handler() {
        let table = JumpTable::<BasicHost>::new();
        for byte in 0..=255u8 {
            if OpCode::is_push_bytes(byte) {
                continue;
            }
            if OpCode::try_from(byte).is_ok() {
                assert!(
                    table.get_handler(byte).is_some(),
                    "missing handler for {:#04x}",
                    byte
                );
            } else {
                assert!(table.get_handler(byte).is_none());
            }
        }
    }
}
