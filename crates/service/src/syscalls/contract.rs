//! Contract lifecycle services.

use super::{executing_address, pop_bytes, pop_interop, Engine, StorageContext};
use crate::contract::DeployCode;
use neovm::{VmError, VmResult, VmValue};
use tracing::debug;

/// Pops code, need-storage, name, version, author, email and description.
fn pop_deploy_code(engine: &mut Engine) -> VmResult<DeployCode> {
    let code = pop_bytes(engine)?;
    let need_storage = engine.evaluation_stack_mut().pop_as_bool()?;
    let contract = DeployCode {
        code,
        need_storage,
        name: pop_bytes(engine)?,
        version: pop_bytes(engine)?,
        author: pop_bytes(engine)?,
        email: pop_bytes(engine)?,
        description: pop_bytes(engine)?,
    };
    contract.validate()?;
    Ok(contract)
}

/// Deploys a contract, or returns the one already at its address.
pub(super) fn create(engine: &mut Engine) -> VmResult<()> {
    let contract = pop_deploy_code(engine)?;
    let address = contract.address();
    let cache = engine.host_mut().cache_mut();
    let state = match cache.get_contract(&address)? {
        Some(existing) => existing,
        None => {
            cache.put_contract(&contract)?;
            debug!(address = %hex::encode(address), "contract created");
            contract
        }
    };
    engine.push(VmValue::from_interop(state))
}

/// Moves the executing contract and its storage to new code, then
/// destroys the old contract.
pub(super) fn migrate(engine: &mut Engine) -> VmResult<()> {
    let contract = pop_deploy_code(engine)?;
    let old_address = executing_address(engine)?;
    let new_address = contract.address();
    let cache = engine.host_mut().cache_mut();
    if cache.get_contract(&new_address)?.is_some() {
        return Err(VmError::interop_msg(format!(
            "contract {} already exists",
            hex::encode(new_address)
        )));
    }
    cache.put_contract(&contract)?;
    for (key, value) in cache.find_storage(&old_address)? {
        cache.put_storage(&new_address, &key, value);
    }
    debug!(
        from = %hex::encode(old_address),
        to = %hex::encode(new_address),
        "contract migrated"
    );
    engine.push(VmValue::from_interop(contract))?;
    destroy(engine)
}

/// Removes the executing contract and all of its storage.
pub(super) fn destroy(engine: &mut Engine) -> VmResult<()> {
    let address = executing_address(engine)?;
    let cache = engine.host_mut().cache_mut();
    if cache.get_contract(&address)?.is_none() {
        return Err(VmError::ContractNotFound(hex::encode(address)));
    }
    cache.delete_contract(&address);
    for (key, _) in cache.find_storage(&address)? {
        cache.delete_storage(&address, &key);
    }
    debug!(address = %hex::encode(address), "contract destroyed");
    Ok(())
}

pub(super) fn get_script(engine: &mut Engine) -> VmResult<()> {
    let contract: DeployCode = pop_interop(engine)?;
    engine.push(VmValue::ByteArray(contract.code))
}

/// Storage context of a contract handle. Only the executing contract may
/// obtain its own context.
pub(super) fn get_storage_context(engine: &mut Engine) -> VmResult<()> {
    let contract: DeployCode = pop_interop(engine)?;
    let address = contract.address();
    if engine.host().cache().get_contract(&address)?.is_none() {
        return Err(VmError::ContractNotFound(hex::encode(address)));
    }
    if address != executing_address(engine)? {
        return Err(VmError::interop_msg(
            "storage context requested for another contract",
        ));
    }
    engine.push(VmValue::from_interop(StorageContext::new(address)))
}
