//! Numeric operations for the virtual machine.
//!
//! Operands are read as bounded integers and every result is checked
//! against the big-integer size limit when it is built.

use crate::error::VmResult;
use crate::execution_engine::ExecutionEngine;
use crate::host::ExecutionHost;
use crate::instruction::Instruction;
use crate::int_value::{bigint_from_neo_bytes, IntValue};
use crate::jump_table::JumpTable;
use crate::op_code::OpCode;
use crate::vm_value::VmValue;
use std::cmp::Ordering;

/// Registers the numeric operation handlers.
pub fn register_handlers<H: ExecutionHost>(jump_table: &mut JumpTable<H>) {
    jump_table.register(OpCode::INC, inc);
    jump_table.register(OpCode::DEC, dec);
    jump_table.register(OpCode::SIGN, sign);
    jump_table.register(OpCode::NEGATE, negate);
    jump_table.register(OpCode::ABS, abs);
    jump_table.register(OpCode::NOT, not);
    jump_table.register(OpCode::NZ, nz);
    jump_table.register(OpCode::ADD, add);
    jump_table.register(OpCode::SUB, sub);
    jump_table.register(OpCode::MUL, mul);
    jump_table.register(OpCode::DIV, div);
    jump_table.register(OpCode::MOD, modulo);
    jump_table.register(OpCode::MIN, min);
    jump_table.register(OpCode::MAX, max);
    jump_table.register(OpCode::SHL, shl);
    jump_table.register(OpCode::SHR, shr);

    // Comparison and logic
    jump_table.register(OpCode::BOOLAND, booland);
    jump_table.register(OpCode::BOOLOR, boolor);
    jump_table.register(OpCode::NUMEQUAL, numequal);
    jump_table.register(OpCode::NUMNOTEQUAL, numnotequal);
    jump_table.register(OpCode::LT, lt);
    jump_table.register(OpCode::GT, gt);
    jump_table.register(OpCode::LTE, lte);
    jump_table.register(OpCode::GTE, gte);
    jump_table.register(OpCode::WITHIN, within);
}

fn unary<H: ExecutionHost>(
    engine: &mut ExecutionEngine<H>,
    op: impl FnOnce(&IntValue) -> VmResult<IntValue>,
) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let x = stack.pop_as_int_value()?;
    stack.push(VmValue::Integer(op(&x)?))
}

fn binary<H: ExecutionHost>(
    engine: &mut ExecutionEngine<H>,
    op: impl FnOnce(&IntValue, &IntValue) -> VmResult<IntValue>,
) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let right = stack.pop_as_int_value()?;
    let left = stack.pop_as_int_value()?;
    stack.push(VmValue::Integer(op(&left, &right)?))
}

fn compare<H: ExecutionHost>(
    engine: &mut ExecutionEngine<H>,
    accept: impl FnOnce(Ordering) -> bool,
) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let (left, right) = stack.pop_pair()?;
    let ordering = left.as_bigint()?.cmp(&right.as_bigint()?);
    stack.push(VmValue::Bool(accept(ordering)))
}

fn inc<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    unary(engine, |x| x.add(&IntValue::from_i64(1)))
}

fn dec<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    unary(engine, |x| x.sub(&IntValue::from_i64(1)))
}

fn sign<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    unary(engine, |x| Ok(IntValue::from_i64(x.sign())))
}

fn negate<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    unary(engine, IntValue::negate)
}

fn abs<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    unary(engine, IntValue::abs)
}

/// Boolean negation.
fn not<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let x = stack.pop_as_bool()?;
    stack.push(VmValue::Bool(!x))
}

fn nz<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let x = stack.pop_as_int_value()?;
    stack.push(VmValue::Bool(!x.is_zero()))
}

fn add<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    binary(engine, IntValue::add)
}

fn sub<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    binary(engine, IntValue::sub)
}

fn mul<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    binary(engine, IntValue::mul)
}

fn div<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    binary(engine, IntValue::div)
}

fn modulo<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    binary(engine, IntValue::modulo)
}

fn min<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    binary(engine, |a, b| Ok(a.min(b)))
}

fn max<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    binary(engine, |a, b| Ok(a.max(b)))
}

/// Pops the shift amount, then the value.
fn shl<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    binary(engine, IntValue::shl)
}

fn shr<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    binary(engine, IntValue::shr)
}

fn booland<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let right = stack.pop_as_bool()?;
    let left = stack.pop_as_bool()?;
    stack.push(VmValue::Bool(left && right))
}

fn boolor<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let right = stack.pop_as_bool()?;
    let left = stack.pop_as_bool()?;
    stack.push(VmValue::Bool(left || right))
}

/// Compares the raw byte encodings as integers, without the size bound.
fn num_compare<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, expect_equal: bool) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let right = stack.pop_as_bytes()?;
    let left = stack.pop_as_bytes()?;
    let equal = bigint_from_neo_bytes(&left) == bigint_from_neo_bytes(&right);
    stack.push(VmValue::Bool(equal == expect_equal))
}

fn numequal<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    num_compare(engine, true)
}

fn numnotequal<H: ExecutionHost>(
    engine: &mut ExecutionEngine<H>,
    _instruction: &Instruction,
) -> VmResult<()> {
    num_compare(engine, false)
}

fn lt<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    compare(engine, |o| o == Ordering::Less)
}

fn gt<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    compare(engine, |o| o == Ordering::Greater)
}

fn lte<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    compare(engine, |o| o != Ordering::Greater)
}

fn gte<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    compare(engine, |o| o != Ordering::Less)
}

/// Pushes `a <= x < b` for stack `x a b`.
fn within<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let b = stack.pop_as_int_value()?;
    let a = stack.pop_as_int_value()?;
    let x = stack.pop_as_int_value()?;
    stack.push(VmValue::Bool(x >= a && x < b))
}
