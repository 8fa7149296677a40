//! `System.Storage.*`

use super::{executing_address, min_stack, pop_bytes, pop_interop, Engine};
use neovm::vm_value::InteropInterface;
use neovm::{ScriptHash, VmError, VmResult, VmValue};
use neovm_config::MAX_STORAGE_KEY_SIZE;
use std::any::Any;

/// Capability to read, and unless read-only write, one contract's storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageContext {
    pub address: ScriptHash,
    pub read_only: bool,
}

impl StorageContext {
    pub fn new(address: ScriptHash) -> Self {
        Self {
            address,
            read_only: false,
        }
    }

    pub fn read_only(address: ScriptHash) -> Self {
        Self {
            address,
            read_only: true,
        }
    }
}

impl InteropInterface for StorageContext {
    fn interface_type(&self) -> &str {
        "StorageContext"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.address.to_vec()
    }
}

fn peek_context(engine: &Engine) -> VmResult<StorageContext> {
    let handle = engine.peek(0)?.as_interop()?;
    handle
        .downcast_ref::<StorageContext>()
        .copied()
        .ok_or_else(|| VmError::invalid_type("StorageContext", handle.interface_type()))
}

/// Context and key.
pub(super) fn validate_get(engine: &Engine) -> VmResult<()> {
    min_stack::<2>(engine)?;
    peek_context(engine).map(|_| ())
}

/// Context, key and value.
pub(super) fn validate_put(engine: &Engine) -> VmResult<()> {
    min_stack::<3>(engine)?;
    peek_context(engine).map(|_| ())
}

/// Pops a context that may be written through.
fn pop_writable_context(engine: &mut Engine) -> VmResult<StorageContext> {
    let context: StorageContext = pop_interop(engine)?;
    if context.read_only {
        return Err(VmError::interop_msg("storage context is read only"));
    }
    if engine.host().cache().get_contract(&context.address)?.is_none() {
        return Err(VmError::ContractNotFound(hex::encode(context.address)));
    }
    Ok(context)
}

pub(super) fn get_context(engine: &mut Engine) -> VmResult<()> {
    let address = executing_address(engine)?;
    engine.push(VmValue::from_interop(StorageContext::new(address)))
}

pub(super) fn get_read_only_context(engine: &mut Engine) -> VmResult<()> {
    let address = executing_address(engine)?;
    engine.push(VmValue::from_interop(StorageContext::read_only(address)))
}

pub(super) fn as_read_only(engine: &mut Engine) -> VmResult<()> {
    let context: StorageContext = pop_interop(engine)?;
    engine.push(VmValue::from_interop(StorageContext::read_only(
        context.address,
    )))
}

/// Missing keys read as an empty byte array.
pub(super) fn get(engine: &mut Engine) -> VmResult<()> {
    let context: StorageContext = pop_interop(engine)?;
    let key = pop_bytes(engine)?;
    let value = engine
        .host()
        .cache()
        .get_storage(&context.address, &key)?
        .unwrap_or_default();
    engine.push(VmValue::ByteArray(value))
}

pub(super) fn put(engine: &mut Engine) -> VmResult<()> {
    let context = pop_writable_context(engine)?;
    let key = pop_bytes(engine)?;
    if key.len() > MAX_STORAGE_KEY_SIZE {
        return Err(VmError::OverMaxItemSize(format!(
            "storage key of {} bytes",
            key.len()
        )));
    }
    let value = pop_bytes(engine)?;
    engine
        .host_mut()
        .cache_mut()
        .put_storage(&context.address, &key, value);
    Ok(())
}

pub(super) fn delete(engine: &mut Engine) -> VmResult<()> {
    let context = pop_writable_context(engine)?;
    let key = pop_bytes(engine)?;
    engine
        .host_mut()
        .cache_mut()
        .delete_storage(&context.address, &key);
    Ok(())
}
