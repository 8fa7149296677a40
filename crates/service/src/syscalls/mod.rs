//! The syscall catalogue of the service host.
//!
//! Every service is a plain function over the engine. Validators run
//! before the handler and reject calls whose stack does not have the
//! expected depth or interop type, so handlers can pop without rechecking.

mod blockchain;
mod contract;
mod header;
mod runtime;
mod storage;

pub use storage::StorageContext;

use crate::host::ServiceHost;
use neovm::{ExecutionEngine, InteropInterface, InteropService, ScriptHash, VmError, VmResult};
use neovm_config::{
    BLOCKCHAIN_GETBLOCK_GAS, BLOCKCHAIN_GETCONTRACT_GAS, BLOCKCHAIN_GETHEADER_GAS,
    BLOCKCHAIN_GETTRANSACTION_GAS, CONTRACT_CREATE_GAS, CONTRACT_MIGRATE_GAS, OPCODE_GAS,
    RUNTIME_CHECKWITNESS_GAS, STORAGE_DELETE_GAS, STORAGE_GET_GAS, STORAGE_PUT_GAS,
};

pub type Engine = ExecutionEngine<ServiceHost>;

pub const BLOCKCHAIN_GET_HEIGHT: &str = "System.Blockchain.GetHeight";
pub const BLOCKCHAIN_GET_HEADER: &str = "System.Blockchain.GetHeader";
pub const BLOCKCHAIN_GET_BLOCK: &str = "System.Blockchain.GetBlock";
pub const BLOCKCHAIN_GET_TRANSACTION: &str = "System.Blockchain.GetTransaction";
pub const BLOCKCHAIN_GET_CONTRACT: &str = "System.Blockchain.GetContract";
pub const BLOCKCHAIN_GET_TRANSACTION_HEIGHT: &str = "System.Blockchain.GetTransactionHeight";

pub const HEADER_GET_INDEX: &str = "System.Header.GetIndex";
pub const HEADER_GET_HASH: &str = "System.Header.GetHash";
pub const HEADER_GET_PREV_HASH: &str = "System.Header.GetPrevHash";
pub const HEADER_GET_TIMESTAMP: &str = "System.Header.GetTimestamp";

pub const BLOCK_GET_TRANSACTION_COUNT: &str = "System.Block.GetTransactionCount";
pub const BLOCK_GET_TRANSACTIONS: &str = "System.Block.GetTransactions";
pub const BLOCK_GET_TRANSACTION: &str = "System.Block.GetTransaction";

pub const TRANSACTION_GET_HASH: &str = "System.Transaction.GetHash";

pub const CONTRACT_CREATE: &str = "Ontology.Contract.Create";
pub const CONTRACT_MIGRATE: &str = "Ontology.Contract.Migrate";
pub const CONTRACT_GET_SCRIPT: &str = "Ontology.Contract.GetScript";
pub const CONTRACT_DESTROY: &str = "System.Contract.Destroy";
pub const CONTRACT_GET_STORAGE_CONTEXT: &str = "System.Contract.GetStorageContext";

pub const STORAGE_GET_CONTEXT: &str = "System.Storage.GetContext";
pub const STORAGE_GET_READ_ONLY_CONTEXT: &str = "System.Storage.GetReadOnlyContext";
pub const STORAGE_GET: &str = "System.Storage.Get";
pub const STORAGE_PUT: &str = "System.Storage.Put";
pub const STORAGE_DELETE: &str = "System.Storage.Delete";
pub const STORAGE_CONTEXT_AS_READ_ONLY: &str = "System.StorageContext.AsReadOnly";

pub const RUNTIME_GET_TIME: &str = "System.Runtime.GetTime";
pub const RUNTIME_CHECK_WITNESS: &str = "System.Runtime.CheckWitness";
pub const RUNTIME_NOTIFY: &str = "System.Runtime.Notify";
pub const RUNTIME_LOG: &str = "System.Runtime.Log";
pub const RUNTIME_GET_TRIGGER: &str = "System.Runtime.GetTrigger";
pub const RUNTIME_SERIALIZE: &str = "System.Runtime.Serialize";
pub const RUNTIME_DESERIALIZE: &str = "System.Runtime.Deserialize";

pub const GET_SCRIPT_CONTAINER: &str = "System.ExecutionEngine.GetScriptContainer";

/// Builds the registry shared by every engine the service creates.
pub fn build_interop_service() -> InteropService<ServiceHost> {
    let mut service = InteropService::new();

    service.register_method(BLOCKCHAIN_GET_HEIGHT, blockchain::get_height, None, OPCODE_GAS);
    service.register_method(
        BLOCKCHAIN_GET_HEADER,
        blockchain::get_header,
        Some(min_stack::<1>),
        BLOCKCHAIN_GETHEADER_GAS,
    );
    service.register_method(
        BLOCKCHAIN_GET_BLOCK,
        blockchain::get_block,
        Some(min_stack::<1>),
        BLOCKCHAIN_GETBLOCK_GAS,
    );
    service.register_method(
        BLOCKCHAIN_GET_TRANSACTION,
        blockchain::get_transaction,
        Some(min_stack::<1>),
        BLOCKCHAIN_GETTRANSACTION_GAS,
    );
    service.register_method(
        BLOCKCHAIN_GET_CONTRACT,
        blockchain::get_contract,
        Some(min_stack::<1>),
        BLOCKCHAIN_GETCONTRACT_GAS,
    );
    service.register_method(
        BLOCKCHAIN_GET_TRANSACTION_HEIGHT,
        blockchain::get_transaction_height,
        Some(min_stack::<1>),
        OPCODE_GAS,
    );

    service.register_method(
        HEADER_GET_INDEX,
        header::get_index,
        Some(header::validate_header),
        OPCODE_GAS,
    );
    service.register_method(
        HEADER_GET_HASH,
        header::get_hash,
        Some(header::validate_header),
        OPCODE_GAS,
    );
    service.register_method(
        HEADER_GET_PREV_HASH,
        header::get_prev_hash,
        Some(header::validate_header),
        OPCODE_GAS,
    );
    service.register_method(
        HEADER_GET_TIMESTAMP,
        header::get_timestamp,
        Some(header::validate_header),
        OPCODE_GAS,
    );
    service.register_method(
        BLOCK_GET_TRANSACTION_COUNT,
        header::get_transaction_count,
        Some(top_is::<crate::ledger::Block>),
        OPCODE_GAS,
    );
    service.register_method(
        BLOCK_GET_TRANSACTIONS,
        header::get_transactions,
        Some(top_is::<crate::ledger::Block>),
        OPCODE_GAS,
    );
    service.register_method(
        BLOCK_GET_TRANSACTION,
        header::get_block_transaction,
        Some(header::validate_block_transaction),
        OPCODE_GAS,
    );
    service.register_method(
        TRANSACTION_GET_HASH,
        header::get_transaction_hash,
        Some(top_is::<crate::ledger::Transaction>),
        OPCODE_GAS,
    );

    service.register_method(
        CONTRACT_CREATE,
        contract::create,
        Some(min_stack::<7>),
        CONTRACT_CREATE_GAS,
    );
    service.register_method(
        CONTRACT_MIGRATE,
        contract::migrate,
        Some(min_stack::<7>),
        CONTRACT_MIGRATE_GAS,
    );
    service.register_method(
        CONTRACT_GET_SCRIPT,
        contract::get_script,
        Some(top_is::<crate::contract::DeployCode>),
        OPCODE_GAS,
    );
    service.register_method(CONTRACT_DESTROY, contract::destroy, None, OPCODE_GAS);
    service.register_method(
        CONTRACT_GET_STORAGE_CONTEXT,
        contract::get_storage_context,
        Some(top_is::<crate::contract::DeployCode>),
        OPCODE_GAS,
    );

    service.register_method(STORAGE_GET_CONTEXT, storage::get_context, None, OPCODE_GAS);
    service.register_method(
        STORAGE_GET_READ_ONLY_CONTEXT,
        storage::get_read_only_context,
        None,
        OPCODE_GAS,
    );
    service.register_method(
        STORAGE_GET,
        storage::get,
        Some(storage::validate_get),
        STORAGE_GET_GAS,
    );
    service.register_method(
        STORAGE_PUT,
        storage::put,
        Some(storage::validate_put),
        STORAGE_PUT_GAS,
    );
    service.register_method(
        STORAGE_DELETE,
        storage::delete,
        Some(storage::validate_get),
        STORAGE_DELETE_GAS,
    );
    service.register_method(
        STORAGE_CONTEXT_AS_READ_ONLY,
        storage::as_read_only,
        Some(top_is::<StorageContext>),
        OPCODE_GAS,
    );

    service.register_method(RUNTIME_GET_TIME, runtime::get_time, None, OPCODE_GAS);
    service.register_method(
        RUNTIME_CHECK_WITNESS,
        runtime::check_witness,
        Some(min_stack::<1>),
        RUNTIME_CHECKWITNESS_GAS,
    );
    service.register_method(
        RUNTIME_NOTIFY,
        runtime::notify,
        Some(min_stack::<1>),
        OPCODE_GAS,
    );
    service.register_method(RUNTIME_LOG, runtime::log, Some(min_stack::<1>), OPCODE_GAS);
    service.register_method(RUNTIME_GET_TRIGGER, runtime::get_trigger, None, OPCODE_GAS);
    service.register_method(
        RUNTIME_SERIALIZE,
        runtime::serialize,
        Some(min_stack::<1>),
        OPCODE_GAS,
    );
    service.register_method(
        RUNTIME_DESERIALIZE,
        runtime::deserialize,
        Some(min_stack::<1>),
        OPCODE_GAS,
    );
    service.register_method(
        GET_SCRIPT_CONTAINER,
        runtime::get_script_container,
        None,
        OPCODE_GAS,
    );

    service
}

/// Requires at least `N` items on the evaluation stack.
fn min_stack<const N: usize>(engine: &Engine) -> VmResult<()> {
    let count = engine.evaluation_stack().len();
    if count < N {
        return Err(VmError::StackUnderflow(format!(
            "service needs {N} arguments, stack has {count}"
        )));
    }
    Ok(())
}

/// Requires the top of the stack to be an interop handle to a `T`.
fn top_is<T: InteropInterface>(engine: &Engine) -> VmResult<()> {
    min_stack::<1>(engine)?;
    let handle = engine.peek(0)?.as_interop()?;
    if handle.downcast_ref::<T>().is_none() {
        return Err(VmError::invalid_type(
            std::any::type_name::<T>(),
            handle.interface_type(),
        ));
    }
    Ok(())
}

/// Pops an interop handle and clones the `T` it wraps.
fn pop_interop<T: InteropInterface + Clone>(engine: &mut Engine) -> VmResult<T> {
    let handle = engine.pop()?.as_interop()?;
    handle
        .downcast_ref::<T>()
        .cloned()
        .ok_or_else(|| VmError::invalid_type(std::any::type_name::<T>(), handle.interface_type()))
}

fn pop_bytes(engine: &mut Engine) -> VmResult<Vec<u8>> {
    engine.evaluation_stack_mut().pop_as_bytes()
}

/// Address of the contract whose code is running.
fn executing_address(engine: &Engine) -> VmResult<ScriptHash> {
    Ok(*engine.current_context()?.script_hash())
}
