//! Execution context module for the virtual machine.
//!
//! A context is one call frame: a read-only code buffer shared between all
//! frames that run the same script, plus a private instruction pointer.

use crate::crypto;
use crate::error::{VmError, VmResult};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Script hash of a contract, `hash160(code)`.
pub type ScriptHash = [u8; 20];

/// A frame on the invocation stack.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    code: Arc<[u8]>,
    script_hash: ScriptHash,
    instruction_pointer: usize,
    break_points: BTreeSet<usize>,
}

impl ExecutionContext {
    /// Creates a context positioned at the start of `code`.
    pub fn new(code: Vec<u8>) -> Self {
        Self::from_shared(Arc::from(code))
    }

    /// Creates a context over an already shared code buffer.
    pub fn from_shared(code: Arc<[u8]>) -> Self {
        let script_hash = crypto::hash160(&code);
        Self {
            code,
            script_hash,
            instruction_pointer: 0,
            break_points: BTreeSet::new(),
        }
    }

    pub fn code(&self) -> &Arc<[u8]> {
        &self.code
    }

    pub fn code_len(&self) -> usize {
        self.code.len()
    }

    pub fn script_hash(&self) -> &ScriptHash {
        &self.script_hash
    }

    pub fn instruction_pointer(&self) -> usize {
        self.instruction_pointer
    }

    /// Moves the cursor. Positions past the end of the code are rejected;
    /// the end itself is allowed and acts as an implicit RET.
    pub fn set_instruction_pointer(&mut self, position: usize) -> VmResult<()> {
        if position > self.code.len() {
            return Err(VmError::InvalidJump(position as i64));
        }
        self.instruction_pointer = position;
        Ok(())
    }

    /// True once the cursor has consumed the whole script.
    pub fn is_exhausted(&self) -> bool {
        self.instruction_pointer >= self.code.len()
    }

    pub fn add_break_point(&mut self, position: usize) {
        self.break_points.insert(position);
    }

    pub fn remove_break_point(&mut self, position: usize) -> bool {
        self.break_points.remove(&position)
    }

    pub fn has_break_point(&self, position: usize) -> bool {
        self.break_points.contains(&position)
    }
}
