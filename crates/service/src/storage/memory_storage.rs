use super::{Storage, WriteBatch};
use crate::error::ServiceResult;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// An in-memory [`Storage`] backed by a `BTreeMap`.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner_data: Arc<RwLock<BTreeMap<Vec<u8>, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner_data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner_data.read().is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &[u8]) -> ServiceResult<Option<Vec<u8>>> {
        Ok(self.inner_data.read().get(key).cloned())
    }

    fn find(&self, prefix: &[u8]) -> ServiceResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let data = self.inner_data.read();
        Ok(data
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn write_batch(&self, batch: WriteBatch) -> ServiceResult<()> {
        let mut data = self.inner_data.write();
        for (key, value) in batch {
            match value {
                Some(value) => {
                    data.insert(key, value);
                }
                None => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }
}
