#![allow(dead_code)]

use neovm::{ScriptHash, ScriptBuilder};
use neovm_config::ServiceConfig;
use neovm_service::syscalls::{STORAGE_GET_CONTEXT, STORAGE_PUT};
use neovm_service::{CacheDb, DeployCode, ExecutionResult, MemoryLedger, MemoryStorage, NeoVmService};
use std::sync::Arc;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("debug")
        .try_init();
}

pub struct Chain {
    pub storage: Arc<MemoryStorage>,
    pub ledger: Arc<MemoryLedger>,
}

impl Chain {
    pub fn new() -> Self {
        init_tracing();
        Self {
            storage: Arc::new(MemoryStorage::new()),
            ledger: Arc::new(MemoryLedger::new()),
        }
    }

    pub fn service(&self) -> NeoVmService {
        self.service_with(ServiceConfig::default())
    }

    pub fn service_with(&self, config: ServiceConfig) -> NeoVmService {
        NeoVmService::new(config, self.ledger.clone(), self.storage.clone())
    }

    pub fn invoke(&self, code: Vec<u8>) -> ExecutionResult {
        self.service().invoke(code).expect("invoke should succeed")
    }

    /// Stores a contract directly in the backing storage.
    pub fn deploy(&self, code: Vec<u8>) -> ScriptHash {
        let contract = DeployCode::new(code);
        let mut cache = CacheDb::new(self.storage.clone());
        cache.put_contract(&contract).expect("put should succeed");
        cache.commit().expect("commit should succeed");
        contract.address()
    }

    pub fn seed_storage(&self, address: &ScriptHash, key: &[u8], value: &[u8]) {
        let mut cache = CacheDb::new(self.storage.clone());
        cache.put_storage(address, key, value.to_vec());
        cache.commit().expect("commit should succeed");
    }

    pub fn storage_value(&self, address: &ScriptHash, key: &[u8]) -> Option<Vec<u8>> {
        CacheDb::new(self.storage.clone())
            .get_storage(address, key)
            .expect("read should succeed")
    }

    pub fn contract(&self, address: &ScriptHash) -> Option<DeployCode> {
        CacheDb::new(self.storage.clone())
            .get_contract(address)
            .expect("read should succeed")
    }
}

/// Emits `Storage.Put(GetContext(), key, value)`.
pub fn emit_put<'a>(sb: &'a mut ScriptBuilder, key: &[u8], value: &[u8]) -> &'a mut ScriptBuilder {
    sb.emit_push(value)
        .emit_push(key)
        .emit_syscall(STORAGE_GET_CONTEXT)
        .emit_syscall(STORAGE_PUT)
}

pub fn result_int(outcome: &ExecutionResult) -> i64 {
    outcome
        .result
        .as_ref()
        .expect("result should be present")
        .as_int64()
        .expect("result should be an integer")
}

pub fn result_bytes(outcome: &ExecutionResult) -> Vec<u8> {
    outcome
        .result
        .as_ref()
        .expect("result should be present")
        .as_bytes()
        .expect("result should be bytes")
}
