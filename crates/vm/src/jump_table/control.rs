//! Control flow operations for the virtual machine.

use crate::error::{VmError, VmResult};
use crate::execution_engine::ExecutionEngine;
use crate::host::ExecutionHost;
use crate::instruction::Instruction;
use crate::jump_table::JumpTable;
use crate::op_code::OpCode;
use std::convert::TryFrom;

/// Registers the control flow handlers.
pub fn register_handlers<H: ExecutionHost>(jump_table: &mut JumpTable<H>) {
    jump_table.register(OpCode::NOP, nop);
    jump_table.register(OpCode::JMP, jmp);
    jump_table.register(OpCode::JMPIF, jmp);
    jump_table.register(OpCode::JMPIFNOT, jmp);
    jump_table.register(OpCode::CALL, call);
    jump_table.register(OpCode::DCALL, dcall);
    jump_table.register(OpCode::RET, ret);
    jump_table.register(OpCode::APPCALL, app_call);
    jump_table.register(OpCode::TAILCALL, app_call);
    jump_table.register(OpCode::SYSCALL, syscall);
}

fn nop<H: ExecutionHost>(_engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    Ok(())
}

/// Implements JMP, JMPIF and JMPIFNOT.
fn jmp<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, instruction: &Instruction) -> VmResult<()> {
    let target = engine.jump_target(instruction)?;
    let take = match instruction.opcode()? {
        OpCode::JMPIF => engine.evaluation_stack_mut().pop_as_bool()?,
        OpCode::JMPIFNOT => !engine.evaluation_stack_mut().pop_as_bool()?,
        _ => true,
    };
    if take {
        engine.current_context_mut()?.set_instruction_pointer(target)?;
    }
    Ok(())
}

/// Pushes a frame over the same code that starts at the jump target. The
/// caller resumes after the CALL once the frame returns.
fn call<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, instruction: &Instruction) -> VmResult<()> {
    let target = engine.jump_target(instruction)?;
    let mut frame = engine.current_context()?.clone();
    frame.set_instruction_pointer(target)?;
    engine.load_context(frame)
}

/// Like CALL with the target popped from the stack.
fn dcall<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let target = engine.evaluation_stack_mut().pop_as_int64()?;
    let mut frame = engine.current_context()?.clone();
    if target < 0 || target as u64 >= frame.code_len() as u64 {
        return Err(VmError::InvalidJump(target));
    }
    frame.set_instruction_pointer(target as usize)?;
    engine.load_context(frame)
}

fn ret<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    engine.unload_context()?;
    Ok(())
}

/// Implements APPCALL and TAILCALL. An all-zero inline hash means the
/// target hash is popped from the stack.
fn app_call<H: ExecutionHost>(
    engine: &mut ExecutionEngine<H>,
    instruction: &Instruction,
) -> VmResult<()> {
    let mut script_hash = instruction.token_hash()?;
    if script_hash.iter().all(|b| *b == 0) {
        let bytes = engine.evaluation_stack_mut().pop_as_bytes()?;
        script_hash = <[u8; 20]>::try_from(bytes.as_slice()).map_err(|_| {
            VmError::bad_value_msg(format!("script hash of {} bytes", bytes.len()))
        })?;
    }
    let code = engine
        .host()
        .code_table()
        .get_code(&script_hash)?
        .ok_or_else(|| VmError::ContractNotFound(hex::encode(script_hash)))?;
    if instruction.opcode_byte() == OpCode::TAILCALL as u8 {
        engine.unload_context()?;
    }
    engine.load_script(code)
}

fn syscall<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, instruction: &Instruction) -> VmResult<()> {
    let name = instruction.token_string()?;
    let interop_service = engine.interop_service().clone();
    interop_service.invoke(&name, engine)
}
