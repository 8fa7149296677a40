//! Push operations for the virtual machine.
//!
//! PUSHBYTES1..PUSHBYTES75 never reach this table; the engine pushes their
//! inline bytes directly.

use crate::error::VmResult;
use crate::execution_engine::ExecutionEngine;
use crate::host::ExecutionHost;
use crate::instruction::Instruction;
use crate::jump_table::JumpTable;
use crate::op_code::OpCode;
use crate::vm_value::VmValue;

/// Registers the push operation handlers.
pub fn register_handlers<H: ExecutionHost>(jump_table: &mut JumpTable<H>) {
    jump_table.register(OpCode::PUSH0, push_int);
    jump_table.register(OpCode::PUSHM1, push_int);
    for opcode in [
        OpCode::PUSH1,
        OpCode::PUSH2,
        OpCode::PUSH3,
        OpCode::PUSH4,
        OpCode::PUSH5,
        OpCode::PUSH6,
        OpCode::PUSH7,
        OpCode::PUSH8,
        OpCode::PUSH9,
        OpCode::PUSH10,
        OpCode::PUSH11,
        OpCode::PUSH12,
        OpCode::PUSH13,
        OpCode::PUSH14,
        OpCode::PUSH15,
        OpCode::PUSH16,
    ] {
        jump_table.register(opcode, push_int);
    }
    jump_table.register(OpCode::PUSHDATA1, push_data);
    jump_table.register(OpCode::PUSHDATA2, push_data);
    jump_table.register(OpCode::PUSHDATA4, push_data);
}

/// Implements PUSH0, PUSHM1 and PUSH1..PUSH16.
fn push_int<H: ExecutionHost>(
    engine: &mut ExecutionEngine<H>,
    instruction: &Instruction,
) -> VmResult<()> {
    let byte = instruction.opcode_byte();
    let value = if byte == OpCode::PUSH0 as u8 {
        0
    } else {
        i64::from(byte) - i64::from(OpCode::PUSH1 as u8) + 1
    };
    engine.push(VmValue::from(value))
}

/// Implements PUSHDATA1, PUSHDATA2 and PUSHDATA4.
fn push_data<H: ExecutionHost>(
    engine: &mut ExecutionEngine<H>,
    instruction: &Instruction,
) -> VmResult<()> {
    engine.push(VmValue::ByteArray(instruction.operand().to_vec()))
}
