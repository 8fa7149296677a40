//! Bitwise operations for the virtual machine.

use crate::error::VmResult;
use crate::execution_engine::ExecutionEngine;
use crate::host::ExecutionHost;
use crate::instruction::Instruction;
use crate::int_value::IntValue;
use crate::jump_table::JumpTable;
use crate::op_code::OpCode;
use crate::vm_value::VmValue;

/// Registers the bitwise operation handlers.
pub fn register_handlers<H: ExecutionHost>(jump_table: &mut JumpTable<H>) {
    jump_table.register(OpCode::INVERT, invert);
    jump_table.register(OpCode::AND, and);
    jump_table.register(OpCode::OR, or);
    jump_table.register(OpCode::XOR, xor);
    jump_table.register(OpCode::EQUAL, equal);
}

fn invert<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let x = stack.pop_as_int_value()?;
    stack.push(VmValue::Integer(x.not()?))
}

fn binary<H: ExecutionHost>(
    engine: &mut ExecutionEngine<H>,
    op: fn(&IntValue, &IntValue) -> VmResult<IntValue>,
) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let right = stack.pop_as_int_value()?;
    let left = stack.pop_as_int_value()?;
    stack.push(VmValue::Integer(op(&left, &right)?))
}

fn and<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    binary(engine, IntValue::and)
}

fn or<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    binary(engine, IntValue::or)
}

fn xor<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    binary(engine, IntValue::xor)
}

fn equal<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let (left, right) = stack.pop_pair()?;
    stack.push(VmValue::Bool(left.equals(&right)))
}
