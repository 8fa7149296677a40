//! THROW and THROWIFNOT.

use crate::error::{VmError, VmResult};
use crate::execution_engine::ExecutionEngine;
use crate::host::ExecutionHost;
use crate::instruction::Instruction;
use crate::jump_table::JumpTable;
use crate::op_code::OpCode;

/// Registers the exception handlers.
pub fn register_handlers<H: ExecutionHost>(jump_table: &mut JumpTable<H>) {
    jump_table.register(OpCode::THROW, throw);
    jump_table.register(OpCode::THROWIFNOT, throw_if_not);
}

fn throw<H: ExecutionHost>(_engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    Err(VmError::Throw)
}

fn throw_if_not<H: ExecutionHost>(
    engine: &mut ExecutionEngine<H>,
    _instruction: &Instruction,
) -> VmResult<()> {
    if engine.evaluation_stack_mut().pop_as_bool()? {
        Ok(())
    } else {
        Err(VmError::Throw)
    }
}
