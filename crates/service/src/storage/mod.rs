//! Persistent key-value storage consumed by the service.
//!
//! Keys are grouped into tables by a one-byte [`DataEntryPrefix`]. Contract
//! storage items live under `prefix ++ contract_address ++ user_key`.

mod cache_db;
mod memory_storage;

pub use cache_db::CacheDb;
pub use memory_storage::MemoryStorage;

use crate::error::ServiceResult;
use neovm::ScriptHash;

/// Table prefixes for persisted entries.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataEntryPrefix {
    /// Deployed contracts, keyed by address
    Contract = 0x01,
    /// Contract storage items
    Storage = 0x02,
}

impl DataEntryPrefix {
    pub fn key(self, body: &[u8]) -> Vec<u8> {
        let mut key = Vec::with_capacity(body.len() + 1);
        key.push(self as u8);
        key.extend_from_slice(body);
        key
    }
}

/// Contract-scoped storage key: `contract_address ++ user_key`.
pub fn storage_key(address: &ScriptHash, key: &[u8]) -> Vec<u8> {
    let mut full = Vec::with_capacity(address.len() + key.len());
    full.extend_from_slice(address);
    full.extend_from_slice(key);
    full
}

/// A write set entry. `None` deletes the key.
pub type WriteBatch = Vec<(Vec<u8>, Option<Vec<u8>>)>;

/// Backing store for committed state.
///
/// Implementations must allow concurrent reads and apply a whole
/// [`WriteBatch`] atomically.
pub trait Storage: Send + Sync {
    fn get(&self, key: &[u8]) -> ServiceResult<Option<Vec<u8>>>;

    /// All entries whose key starts with `prefix`, in ascending key order.
    fn find(&self, prefix: &[u8]) -> ServiceResult<Vec<(Vec<u8>, Vec<u8>)>>;

    fn write_batch(&self, batch: WriteBatch) -> ServiceResult<()>;
}
