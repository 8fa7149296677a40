//! Cryptographic operations for the virtual machine.
//!
//! Hashing and signature checks are delegated to the host's [`Crypto`]
//! provider so embedders can swap the curve or add caching.
//!
//! [`Crypto`]: crate::crypto::Crypto

use crate::error::{VmError, VmResult};
use crate::execution_engine::ExecutionEngine;
use crate::host::ExecutionHost;
use crate::instruction::Instruction;
use crate::jump_table::JumpTable;
use crate::op_code::OpCode;
use crate::vm_value::VmValue;

/// Registers the cryptographic operation handlers.
pub fn register_handlers<H: ExecutionHost>(jump_table: &mut JumpTable<H>) {
    jump_table.register(OpCode::SHA1, sha1);
    jump_table.register(OpCode::SHA256, sha256);
    jump_table.register(OpCode::HASH160, hash160);
    jump_table.register(OpCode::HASH256, hash256);
    jump_table.register(OpCode::VERIFY, verify);
    jump_table.register(OpCode::CHECKSIG, check_sig);
    jump_table.register(OpCode::CHECKMULTISIG, check_multisig);
}

fn sha1<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let data = engine.evaluation_stack_mut().pop_as_bytes()?;
    let hash = engine.host().crypto().sha1(&data);
    engine.push(VmValue::ByteArray(hash.to_vec()))
}

fn sha256<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let data = engine.evaluation_stack_mut().pop_as_bytes()?;
    let hash = engine.host().crypto().sha256(&data);
    engine.push(VmValue::ByteArray(hash.to_vec()))
}

fn hash160<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let data = engine.evaluation_stack_mut().pop_as_bytes()?;
    let hash = engine.host().crypto().hash160(&data);
    engine.push(VmValue::ByteArray(hash.to_vec()))
}

fn hash256<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let data = engine.evaluation_stack_mut().pop_as_bytes()?;
    let hash = engine.host().crypto().hash256(&data);
    engine.push(VmValue::ByteArray(hash.to_vec()))
}

/// Pops the public key, the signature and the signed data.
fn verify<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let public_key = stack.pop_as_bytes()?;
    let signature = stack.pop_as_bytes()?;
    let data = stack.pop_as_bytes()?;
    let ok = engine
        .host()
        .crypto()
        .verify_signature(&data, &signature, &public_key);
    engine.push(VmValue::Bool(ok))
}

/// Checks a signature over the script container's message.
fn check_sig<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let public_key = stack.pop_as_bytes()?;
    let signature = stack.pop_as_bytes()?;
    let ok = match engine.host().script_container_message() {
        Some(message) => engine
            .host()
            .crypto()
            .verify_signature(&message, &signature, &public_key),
        None => false,
    };
    engine.push(VmValue::Bool(ok))
}

fn pop_group<H: ExecutionHost>(
    engine: &mut ExecutionEngine<H>,
    what: &str,
    max: usize,
) -> VmResult<Vec<Vec<u8>>> {
    let stack = engine.evaluation_stack_mut();
    let count = stack.pop_as_int64()?;
    if count < 1 || count as u64 > max as u64 {
        return Err(VmError::bad_value_msg(format!(
            "{} count {} outside [1, {}]",
            what, count, max
        )));
    }
    (0..count).map(|_| stack.pop_as_bytes()).collect()
}

/// Pops `n` keys and `m` signatures, `1 <= m <= n`, and checks that the
/// signatures match keys in order.
fn check_multisig<H: ExecutionHost>(
    engine: &mut ExecutionEngine<H>,
    _instruction: &Instruction,
) -> VmResult<()> {
    let max_keys = engine.limits().max_array_size;
    let public_keys = pop_group(engine, "public key", max_keys)?;
    let signatures = pop_group(engine, "signature", public_keys.len())?;
    let message = match engine.host().script_container_message() {
        Some(message) => message,
        None => return engine.push(VmValue::Bool(false)),
    };
    let crypto = engine.host().crypto();
    let (m, n) = (signatures.len(), public_keys.len());
    let (mut i, mut j) = (0usize, 0usize);
    let mut ok = true;
    while ok && i < m && j < n {
        if crypto.verify_signature(&message, &signatures[i], &public_keys[j]) {
            i += 1;
        }
        j += 1;
        if m - i > n - j {
            ok = false;
        }
    }
    let ok = ok && i == m;
    engine.push(VmValue::Bool(ok))
}
