//! Capabilities the engine borrows from its embedder.

use crate::crypto::{Crypto, DefaultCrypto};
use crate::error::VmResult;
use crate::execution_context::ScriptHash;
use hashbrown::HashMap;

/// Resolves contract code by script hash for APPCALL and TAILCALL.
pub trait CodeTable {
    /// Returns `Ok(None)` when no contract is deployed at `script_hash`.
    fn get_code(&self, script_hash: &ScriptHash) -> VmResult<Option<Vec<u8>>>;
}

/// The environment an [`ExecutionEngine`](crate::ExecutionEngine) runs in.
pub trait ExecutionHost {
    fn code_table(&self) -> &dyn CodeTable;

    fn crypto(&self) -> &dyn Crypto;

    /// Message signed by the script container, checked by CHECKSIG and
    /// CHECKMULTISIG. `None` when the engine runs without a container.
    fn script_container_message(&self) -> Option<Vec<u8>> {
        None
    }
}

/// An in-memory code table.
#[derive(Debug, Default, Clone)]
pub struct MemoryCodeTable {
    contracts: HashMap<ScriptHash, Vec<u8>>,
}

impl MemoryCodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `code` under its script hash and returns the hash.
    pub fn insert(&mut self, code: Vec<u8>) -> ScriptHash {
        let script_hash = crate::crypto::hash160(&code);
        self.contracts.insert(script_hash, code);
        script_hash
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

impl CodeTable for MemoryCodeTable {
    fn get_code(&self, script_hash: &ScriptHash) -> VmResult<Option<Vec<u8>>> {
        Ok(self.contracts.get(script_hash).cloned())
    }
}

/// Host for running bytecode without a blockchain around it.
#[derive(Debug, Default, Clone)]
pub struct BasicHost {
    pub code_table: MemoryCodeTable,
    pub crypto: DefaultCrypto,
    pub message: Option<Vec<u8>>,
}

impl BasicHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the message checked by the signature opcodes.
    pub fn with_message(mut self, message: Vec<u8>) -> Self {
        self.message = Some(message);
        self
    }

    /// Registers a contract callable through APPCALL.
    pub fn deploy(&mut self, code: Vec<u8>) -> ScriptHash {
        self.code_table.insert(code)
    }
}

impl ExecutionHost for BasicHost {
    fn code_table(&self) -> &dyn CodeTable {
        &self.code_table
    }

    fn crypto(&self) -> &dyn Crypto {
        &self.crypto
    }

    fn script_container_message(&self) -> Option<Vec<u8>> {
        self.message.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_table_lookup() {
        let mut host = BasicHost::new();
        let hash = host.deploy(vec![0x51, 0x66]);
        assert_eq!(
            host.code_table().get_code(&hash).expect("lookup should succeed"),
            Some(vec![0x51, 0x66])
        );
        assert_eq!(
            host.code_table()
                .get_code(&[0u8; 20])
                .expect("lookup should succeed"),
            None
        );
        assert!(host.script_container_message().is_none());
    }
}
