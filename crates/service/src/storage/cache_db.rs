use super::{storage_key, DataEntryPrefix, Storage, WriteBatch};
use crate::contract::DeployCode;
use crate::error::ServiceResult;
use neovm::ScriptHash;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Write overlay over a [`Storage`].
///
/// Reads fall through to the backing store; writes stay in memory until
/// [`commit`](Self::commit). Dropping the overlay discards them.
pub struct CacheDb {
    store: Arc<dyn Storage>,
    memory: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl CacheDb {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self {
            store,
            memory: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &[u8]) -> ServiceResult<Option<Vec<u8>>> {
        match self.memory.get(key) {
            Some(entry) => Ok(entry.clone()),
            None => self.store.get(key),
        }
    }

    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.memory.insert(key, Some(value));
    }

    pub fn delete(&mut self, key: Vec<u8>) {
        self.memory.insert(key, None);
    }

    /// Live entries under `prefix`, overlay applied, in ascending key order.
    pub fn find(&self, prefix: &[u8]) -> ServiceResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut merged: BTreeMap<Vec<u8>, Option<Vec<u8>>> = self
            .store
            .find(prefix)?
            .into_iter()
            .map(|(k, v)| (k, Some(v)))
            .collect();
        for (key, value) in self
            .memory
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
        {
            merged.insert(key.clone(), value.clone());
        }
        Ok(merged
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect())
    }

    /// Number of pending writes.
    pub fn pending(&self) -> usize {
        self.memory.len()
    }

    /// Flushes all pending writes to the backing store in one batch.
    pub fn commit(&mut self) -> ServiceResult<()> {
        let batch: WriteBatch = std::mem::take(&mut self.memory).into_iter().collect();
        if batch.is_empty() {
            return Ok(());
        }
        self.store.write_batch(batch)
    }

    pub fn get_contract(&self, address: &ScriptHash) -> ServiceResult<Option<DeployCode>> {
        match self.get(&DataEntryPrefix::Contract.key(address))? {
            Some(bytes) => DeployCode::from_bytes(&bytes).map(Some),
            None => Ok(None),
        }
    }

    pub fn put_contract(&mut self, contract: &DeployCode) -> ServiceResult<()> {
        let key = DataEntryPrefix::Contract.key(&contract.address());
        self.put(key, contract.to_bytes()?);
        Ok(())
    }

    pub fn delete_contract(&mut self, address: &ScriptHash) {
        self.delete(DataEntryPrefix::Contract.key(address));
    }

    pub fn get_storage(&self, address: &ScriptHash, key: &[u8]) -> ServiceResult<Option<Vec<u8>>> {
        self.get(&DataEntryPrefix::Storage.key(&storage_key(address, key)))
    }

    pub fn put_storage(&mut self, address: &ScriptHash, key: &[u8], value: Vec<u8>) {
        self.put(DataEntryPrefix::Storage.key(&storage_key(address, key)), value);
    }

    pub fn delete_storage(&mut self, address: &ScriptHash, key: &[u8]) {
        self.delete(DataEntryPrefix::Storage.key(&storage_key(address, key)));
    }

    /// All storage items of a contract as `(user_key, value)` pairs.
    pub fn find_storage(&self, address: &ScriptHash) -> ServiceResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let prefix = DataEntryPrefix::Storage.key(address);
        Ok(self
            .find(&prefix)?
            .into_iter()
            .map(|(k, v)| (k[prefix.len()..].to_vec(), v))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_overlay_reads_and_discards() {
        let backing = MemoryStorage::new();
        backing
            .write_batch(vec![(b"k".to_vec(), Some(b"old".to_vec()))])
            .expect("write should succeed");
        let mut cache = CacheDb::new(Arc::new(backing.clone()));
        assert_eq!(cache.get(b"k").expect("get"), Some(b"old".to_vec()));

        cache.put(b"k".to_vec(), b"new".to_vec());
        cache.delete(b"gone".to_vec());
        assert_eq!(cache.get(b"k").expect("get"), Some(b"new".to_vec()));
        assert_eq!(backing.get(b"k").expect("get"), Some(b"old".to_vec()));

        drop(cache);
        assert_eq!(backing.get(b"k").expect("get"), Some(b"old".to_vec()));
    }

    #[test]
    fn test_commit_applies_deletes() {
        let backing = MemoryStorage::new();
        backing
            .write_batch(vec![(b"a".to_vec(), Some(b"1".to_vec()))])
            .expect("write should succeed");
        let mut cache = CacheDb::new(Arc::new(backing.clone()));
        cache.delete(b"a".to_vec());
        cache.put(b"b".to_vec(), b"2".to_vec());
        assert_eq!(cache.pending(), 2);
        cache.commit().expect("commit should succeed");
        assert_eq!(cache.pending(), 0);
        assert_eq!(backing.get(b"a").expect("get"), None);
        assert_eq!(backing.get(b"b").expect("get"), Some(b"2".to_vec()));
    }

    #[test]
    fn test_find_storage_merges_overlay() {
        let backing = MemoryStorage::new();
        let address = [1u8; 20];
        let mut seed = CacheDb::new(Arc::new(backing.clone()));
        seed.put_storage(&address, b"x", b"1".to_vec());
        seed.put_storage(&address, b"y", b"2".to_vec());
        seed.put_storage(&[2u8; 20], b"x", b"other".to_vec());
        seed.commit().expect("commit should succeed");

        let mut cache = CacheDb::new(Arc::new(backing));
        cache.delete_storage(&address, b"x");
        cache.put_storage(&address, b"z", b"3".to_vec());
        let items = cache.find_storage(&address).expect("find should succeed");
        assert_eq!(
            items,
            vec![
                (b"y".to_vec(), b"2".to_vec()),
                (b"z".to_vec(), b"3".to_vec())
            ]
        );
    }

    #[test]
    fn test_contract_records() {
        let mut cache = CacheDb::new(Arc::new(MemoryStorage::new()));
        let contract = DeployCode::new(vec![0x51]);
        let address = contract.address();
        assert!(cache.get_contract(&address).expect("get").is_none());
        cache.put_contract(&contract).expect("put should succeed");
        assert_eq!(cache.get_contract(&address).expect("get"), Some(contract));
        cache.delete_contract(&address);
        assert!(cache.get_contract(&address).expect("get").is_none());
    }
}
