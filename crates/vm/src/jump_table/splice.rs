//! Splice operations for the virtual machine.
//!
//! Offsets and counts must lie within `[0, len]` of the popped byte array;
//! anything outside faults with `OverMaxArraySize`.

use crate::error::{VmError, VmResult};
use crate::execution_engine::ExecutionEngine;
use crate::host::ExecutionHost;
use crate::instruction::Instruction;
use crate::jump_table::JumpTable;
use crate::op_code::OpCode;
use crate::vm_value::VmValue;

/// Registers the splice operation handlers.
pub fn register_handlers<H: ExecutionHost>(jump_table: &mut JumpTable<H>) {
    jump_table.register(OpCode::CAT, cat);
    jump_table.register(OpCode::SUBSTR, substr);
    jump_table.register(OpCode::LEFT, left);
    jump_table.register(OpCode::RIGHT, right);
    jump_table.register(OpCode::SIZE, size);
}

fn bounded(value: i64, len: usize, what: &str) -> VmResult<usize> {
    if value < 0 || value as u64 > len as u64 {
        return Err(VmError::OverMaxArraySize(format!(
            "{} {} outside buffer of {} bytes",
            what, value, len
        )));
    }
    Ok(value as usize)
}

fn cat<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let right = stack.pop_as_bytes()?;
    let mut left = stack.pop_as_bytes()?;
    left.extend_from_slice(&right);
    stack.push(VmValue::ByteArray(left))
}

fn substr<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let count = stack.pop_as_int64()?;
    let start = stack.pop_as_int64()?;
    let bytes = stack.pop_as_bytes()?;
    let start = bounded(start, bytes.len(), "start")?;
    let count = bounded(count, bytes.len(), "count")?;
    let end = bounded((start + count) as i64, bytes.len(), "end")?;
    stack.push(VmValue::ByteArray(bytes[start..end].to_vec()))
}

fn left<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let count = stack.pop_as_int64()?;
    let bytes = stack.pop_as_bytes()?;
    let count = bounded(count, bytes.len(), "count")?;
    stack.push(VmValue::ByteArray(bytes[..count].to_vec()))
}

fn right<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let count = stack.pop_as_int64()?;
    let bytes = stack.pop_as_bytes()?;
    let count = bounded(count, bytes.len(), "count")?;
    stack.push(VmValue::ByteArray(bytes[bytes.len() - count..].to_vec()))
}

fn size<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let bytes = stack.pop_as_bytes()?;
    stack.push(VmValue::from(bytes.len() as i64))
}
