//! Stack operations for the virtual machine.

use crate::error::VmResult;
use crate::execution_engine::ExecutionEngine;
use crate::host::ExecutionHost;
use crate::instruction::Instruction;
use crate::jump_table::JumpTable;
use crate::op_code::OpCode;
use crate::vm_value::VmValue;

/// Registers the stack operation handlers.
pub fn register_handlers<H: ExecutionHost>(jump_table: &mut JumpTable<H>) {
    jump_table.register(OpCode::DUPFROMALTSTACK, dup_from_alt_stack);
    jump_table.register(OpCode::TOALTSTACK, to_alt_stack);
    jump_table.register(OpCode::FROMALTSTACK, from_alt_stack);
    jump_table.register(OpCode::XDROP, xdrop);
    jump_table.register(OpCode::XSWAP, xswap);
    jump_table.register(OpCode::XTUCK, xtuck);
    jump_table.register(OpCode::DEPTH, depth);
    jump_table.register(OpCode::DROP, drop);
    jump_table.register(OpCode::DUP, dup);
    jump_table.register(OpCode::NIP, nip);
    jump_table.register(OpCode::OVER, over);
    jump_table.register(OpCode::PICK, pick);
    jump_table.register(OpCode::ROLL, roll);
    jump_table.register(OpCode::ROT, rot);
    jump_table.register(OpCode::SWAP, swap);
    jump_table.register(OpCode::TUCK, tuck);
}

fn dup_from_alt_stack<H: ExecutionHost>(
    engine: &mut ExecutionEngine<H>,
    _instruction: &Instruction,
) -> VmResult<()> {
    let item = engine.alt_stack().peek(0)?.clone();
    engine.push(item)
}

fn to_alt_stack<H: ExecutionHost>(
    engine: &mut ExecutionEngine<H>,
    _instruction: &Instruction,
) -> VmResult<()> {
    let item = engine.pop()?;
    engine.alt_stack_mut().push(item)
}

fn from_alt_stack<H: ExecutionHost>(
    engine: &mut ExecutionEngine<H>,
    _instruction: &Instruction,
) -> VmResult<()> {
    let item = engine.alt_stack_mut().pop()?;
    engine.push(item)
}

/// Removes the item `n` below the popped index.
fn xdrop<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let n = stack.pop_stack_index()?;
    stack.remove(n)?;
    Ok(())
}

fn xswap<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let n = stack.pop_stack_index()?;
    stack.swap(0, n)
}

/// Copies the top item to depth `n`.
fn xtuck<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let n = stack.pop_stack_index()?;
    let item = stack.peek(0)?.clone();
    stack.insert(n, item)
}

fn depth<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let count = engine.evaluation_stack().len() as i64;
    engine.push(VmValue::from(count))
}

fn drop<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    engine.pop()?;
    Ok(())
}

fn dup<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let item = engine.peek(0)?.clone();
    engine.push(item)
}

fn nip<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    engine.evaluation_stack_mut().remove(1)?;
    Ok(())
}

fn over<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let item = engine.peek(1)?.clone();
    engine.push(item)
}

fn pick<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let n = stack.pop_stack_index()?;
    let item = stack.peek(n)?.clone();
    stack.push(item)
}

fn roll<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let n = stack.pop_stack_index()?;
    let item = stack.remove(n)?;
    stack.push(item)
}

fn rot<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let item = stack.remove(2)?;
    stack.push(item)
}

fn swap<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    engine.evaluation_stack_mut().swap(0, 1)
}

/// Copies the top item below the second one.
fn tuck<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let (x1, x2) = stack.pop_pair()?;
    stack.push(x2.clone())?;
    stack.push(x1)?;
    stack.push(x2)
}
