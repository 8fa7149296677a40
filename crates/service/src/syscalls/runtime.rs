//! `System.Runtime.*` and `System.ExecutionEngine.GetScriptContainer`

use super::{executing_address, pop_bytes, Engine};
use crate::events::{LogEvent, NotifyEvent};
use neovm::vm_value::notify::to_hex_json;
use neovm::vm_value::serialize as codec;
use neovm::{VmError, VmResult, VmValue};
use neovm_config::ADDRESS_SIZE;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::PublicKey;
use tracing::debug;

pub(super) fn get_time(engine: &mut Engine) -> VmResult<()> {
    let time = engine.host().time();
    engine.push(VmValue::from(i64::from(time)))
}

/// Accepts a 20-byte address or a SEC1 public key, which is checked by
/// the address of its compressed form.
pub(super) fn check_witness(engine: &mut Engine) -> VmResult<()> {
    let data = pop_bytes(engine)?;
    let witnessed = if data.len() == ADDRESS_SIZE {
        let address = <[u8; 20]>::try_from(data.as_slice())
            .map_err(|_| VmError::bad_value_msg("address must be 20 bytes"))?;
        engine
            .host()
            .container()
            .map_or(false, |tx| tx.is_signed_by(&address))
    } else {
        let key = PublicKey::from_sec1_bytes(&data)
            .map_err(|_| VmError::bad_value_msg("invalid public key"))?;
        let compressed = key.to_encoded_point(true);
        engine
            .host()
            .container()
            .map_or(false, |tx| tx.is_signed_by_key(compressed.as_bytes()))
    };
    engine.push(VmValue::Bool(witnessed))
}

pub(super) fn notify(engine: &mut Engine) -> VmResult<()> {
    let value = engine.pop()?;
    let states = to_hex_json(&value)?;
    let contract_address = executing_address(engine)?;
    debug!(contract = %hex::encode(contract_address), "notify");
    engine.host_mut().notify(NotifyEvent {
        contract_address,
        states,
    });
    Ok(())
}

pub(super) fn log(engine: &mut Engine) -> VmResult<()> {
    let message = String::from_utf8_lossy(&pop_bytes(engine)?).into_owned();
    let contract_address = executing_address(engine)?;
    engine.host_mut().log(LogEvent {
        contract_address,
        message,
    });
    Ok(())
}

/// Only application invocations exist, trigger 0.
pub(super) fn get_trigger(engine: &mut Engine) -> VmResult<()> {
    engine.push(VmValue::from(0i64))
}

pub(super) fn serialize(engine: &mut Engine) -> VmResult<()> {
    let value = engine.pop()?;
    let bytes = codec::serialize(&value, engine.limits())?;
    engine.push(VmValue::ByteArray(bytes))
}

pub(super) fn deserialize(engine: &mut Engine) -> VmResult<()> {
    let bytes = pop_bytes(engine)?;
    let value = codec::deserialize(&bytes, engine.limits())?;
    engine.push(value)
}

pub(super) fn get_script_container(engine: &mut Engine) -> VmResult<()> {
    let transaction = engine
        .host()
        .container()
        .cloned()
        .ok_or_else(|| VmError::interop_msg("no script container"))?;
    engine.push(VmValue::from_interop(transaction))
}
