//! Map container keyed by the comparison bytes of primitive keys.

use super::VmValue;
use crate::error::{VmError, VmResult};
use std::collections::BTreeMap;

/// Ordered map from primitive keys to values.
///
/// Entries are indexed by [`VmValue::key_bytes`], so two keys address the
/// same entry exactly when EQUAL holds for them. Iteration is in ascending
/// key-byte order. The original key value is kept alongside.
#[derive(Debug, Clone, Default)]
pub struct MapValue {
    entries: BTreeMap<Vec<u8>, (VmValue, VmValue)>,
}

/// Byte index of a map key. Only primitives can be keys.
pub fn map_key(key: &VmValue) -> VmResult<Vec<u8>> {
    if !key.is_primitive() {
        return Err(VmError::invalid_type("primitive map key", key.type_name()));
    }
    key.key_bytes()
}

impl MapValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &VmValue) -> VmResult<Option<VmValue>> {
        let index = map_key(key)?;
        Ok(self.entries.get(&index).map(|(_, value)| value.clone()))
    }

    pub fn contains_key(&self, key: &VmValue) -> VmResult<bool> {
        Ok(self.entries.contains_key(&map_key(key)?))
    }

    /// Inserts or replaces an entry. A new key beyond `max_size` entries fails.
    pub fn set(&mut self, key: VmValue, value: VmValue, max_size: usize) -> VmResult<()> {
        let index = map_key(&key)?;
        if !self.entries.contains_key(&index) && self.entries.len() >= max_size {
            return Err(VmError::OverMaxArraySize(format!(
                "map already holds {} entries",
                self.entries.len()
            )));
        }
        self.entries.insert(index, (key, value));
        Ok(())
    }

    pub fn remove(&mut self, key: &VmValue) -> VmResult<Option<VmValue>> {
        let index = map_key(key)?;
        Ok(self.entries.remove(&index).map(|(_, value)| value))
    }

    /// Keys in ascending byte order.
    pub fn keys(&self) -> Vec<VmValue> {
        self.entries.values().map(|(key, _)| key.clone()).collect()
    }

    /// Values in ascending key-byte order.
    pub fn values(&self) -> Vec<VmValue> {
        self.entries.values().map(|(_, value)| value.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VmValue, &VmValue)> {
        self.entries.values().map(|(key, value)| (key, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let mut map = MapValue::new();
        map.set(VmValue::from(1i64), VmValue::from(b"one".to_vec()), 16)
            .expect("set should succeed");
        // ByteArray [0x01] addresses the same entry as Integer 1
        let hit = map
            .get(&VmValue::from(vec![1u8]))
            .expect("get should succeed")
            .expect("entry should exist");
        assert!(hit.equals(&VmValue::from(b"one".to_vec())));

        assert!(map.get(&VmValue::new_array(vec![])).is_err());
        assert!(map
            .remove(&VmValue::from(1i64))
            .expect("remove should succeed")
            .is_some());
        assert!(map.is_empty());
    }

    #[test]
    fn test_bool_and_integer_keys_share_entries() {
        let mut map = MapValue::new();
        map.set(VmValue::from(0i64), VmValue::from(5i64), 16)
            .expect("set should succeed");
        let hit = map
            .get(&VmValue::Bool(false))
            .expect("get should succeed")
            .expect("entry should exist");
        assert!(hit.equals(&VmValue::from(5i64)));
        assert!(map
            .contains_key(&VmValue::from(Vec::new()))
            .expect("lookup should succeed"));

        map.set(VmValue::Bool(true), VmValue::from(6i64), 16)
            .expect("set should succeed");
        map.set(VmValue::from(1i64), VmValue::from(7i64), 16)
            .expect("replace should succeed");
        assert_eq!(map.len(), 2);
        assert!(!map
            .contains_key(&VmValue::from(vec![0u8]))
            .expect("lookup should succeed"));
    }

    #[test]
    fn test_size_limit_only_for_new_keys() {
        let mut map = MapValue::new();
        map.set(VmValue::from(1i64), VmValue::Bool(true), 1)
            .expect("set should succeed");
        map.set(VmValue::from(1i64), VmValue::Bool(false), 1)
            .expect("replace should succeed");
        assert!(matches!(
            map.set(VmValue::from(2i64), VmValue::Bool(true), 1),
            Err(VmError::OverMaxArraySize(_))
        ));
    }

    #[test]
    fn test_keys_sorted_by_bytes() {
        let mut map = MapValue::new();
        for key in [b"b".to_vec(), b"a".to_vec(), b"ab".to_vec()] {
            map.set(VmValue::from(key), VmValue::Bool(true), 16)
                .expect("set should succeed");
        }
        let keys: Vec<Vec<u8>> = map
            .keys()
            .iter()
            .map(|k| k.as_bytes().expect("bytes should succeed"))
            .collect();
        assert_eq!(keys, vec![b"a".to_vec(), b"ab".to_vec(), b"b".to_vec()]);
    }
}
