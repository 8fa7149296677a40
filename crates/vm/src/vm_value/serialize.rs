//! Binary serialization used by `System.Runtime.Serialize` and
//! `System.Runtime.Deserialize`.
//!
//! Layout: one type tag byte, then var-bytes for primitives or a var-int
//! count followed by the children for containers. Map entries are written
//! in ascending key-byte order so the output is deterministic.

use super::{
    ArrayRef, MapValue, VmValue, ARRAY_TYPE, BOOLEAN_TYPE, BYTEARRAY_TYPE, INTEGER_TYPE,
    MAP_TYPE, STRUCT_TYPE,
};
use crate::error::{VmError, VmResult};
use crate::int_value::IntValue;
use crate::io::{BinaryWriter, MemoryReader};
use crate::limits::ExecutionEngineLimits;
use std::rc::Rc;

/// Serializes a value tree, rejecting cycles, nesting deeper than
/// `limits.max_struct_depth` and output larger than `limits.max_item_size`.
pub fn serialize(value: &VmValue, limits: &ExecutionEngineLimits) -> VmResult<Vec<u8>> {
    let mut writer = BinaryWriter::with_limit(limits.max_item_size);
    let mut path = Vec::new();
    write_value(value, &mut writer, &mut path, 0, limits.max_struct_depth)?;
    Ok(writer.into_bytes())
}

fn check_depth(depth: usize, max_depth: usize) -> VmResult<()> {
    if depth > max_depth {
        return Err(VmError::bad_value_msg("value nesting exceeds maximum depth"));
    }
    Ok(())
}

fn enter(path: &mut Vec<usize>, ptr: usize) -> VmResult<()> {
    if path.contains(&ptr) {
        return Err(VmError::CircularReference);
    }
    path.push(ptr);
    Ok(())
}

fn write_items(
    tag: u8,
    items: &ArrayRef,
    writer: &mut BinaryWriter,
    path: &mut Vec<usize>,
    depth: usize,
    max_depth: usize,
) -> VmResult<()> {
    enter(path, Rc::as_ptr(items) as usize)?;
    let items = items.borrow();
    writer.write_u8(tag)?;
    writer.write_var_int(items.len() as u64)?;
    for item in items.iter() {
        write_value(item, writer, path, depth + 1, max_depth)?;
    }
    path.pop();
    Ok(())
}

fn write_value(
    value: &VmValue,
    writer: &mut BinaryWriter,
    path: &mut Vec<usize>,
    depth: usize,
    max_depth: usize,
) -> VmResult<()> {
    check_depth(depth, max_depth)?;
    match value {
        VmValue::Bool(b) => {
            writer.write_u8(BOOLEAN_TYPE)?;
            writer.write_bool(*b)
        }
        VmValue::ByteArray(bytes) => {
            writer.write_u8(BYTEARRAY_TYPE)?;
            writer.write_var_bytes(bytes)
        }
        VmValue::Integer(i) => {
            writer.write_u8(INTEGER_TYPE)?;
            writer.write_var_bytes(&i.to_bytes())
        }
        VmValue::Array(items) => write_items(ARRAY_TYPE, items, writer, path, depth, max_depth),
        VmValue::Struct(items) => {
            write_items(STRUCT_TYPE, items, writer, path, depth, max_depth)
        }
        VmValue::Map(map) => {
            enter(path, Rc::as_ptr(map) as usize)?;
            let map = map.borrow();
            writer.write_u8(MAP_TYPE)?;
            writer.write_var_int(map.len() as u64)?;
            for (key, item) in map.iter() {
                write_value(key, writer, path, depth + 1, max_depth)?;
                write_value(item, writer, path, depth + 1, max_depth)?;
            }
            path.pop();
            Ok(())
        }
        VmValue::Interop(_) => Err(VmError::invalid_type("serializable value", "Interop")),
    }
}

/// Rebuilds a value tree from its serialized form under the same depth,
/// size and element-count bounds that [`serialize`] enforces.
pub fn deserialize(data: &[u8], limits: &ExecutionEngineLimits) -> VmResult<VmValue> {
    let mut reader = MemoryReader::new(data);
    read_value(&mut reader, 0, limits)
}

fn read_items(
    reader: &mut MemoryReader<'_>,
    depth: usize,
    limits: &ExecutionEngineLimits,
) -> VmResult<Vec<VmValue>> {
    let count = reader.read_var_int(limits.max_array_size as u64)? as usize;
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(read_value(reader, depth + 1, limits)?);
    }
    Ok(items)
}

fn read_value(
    reader: &mut MemoryReader<'_>,
    depth: usize,
    limits: &ExecutionEngineLimits,
) -> VmResult<VmValue> {
    check_depth(depth, limits.max_struct_depth)?;
    match reader.read_u8()? {
        BOOLEAN_TYPE => Ok(VmValue::Bool(reader.read_bool()?)),
        BYTEARRAY_TYPE => Ok(VmValue::ByteArray(
            reader.read_var_bytes(limits.max_item_size)?.to_vec(),
        )),
        INTEGER_TYPE => {
            let bytes = reader.read_var_bytes(limits.max_item_size)?;
            Ok(VmValue::Integer(IntValue::from_bytes(bytes)?))
        }
        ARRAY_TYPE => Ok(VmValue::new_array(read_items(reader, depth, limits)?)),
        STRUCT_TYPE => Ok(VmValue::new_struct(read_items(reader, depth, limits)?)),
        MAP_TYPE => {
            let count = reader.read_var_int(limits.max_array_size as u64)?;
            let mut map = MapValue::new();
            for _ in 0..count {
                let key = read_value(reader, depth + 1, limits)?;
                let value = read_value(reader, depth + 1, limits)?;
                map.set(key, value, limits.max_array_size)?;
            }
            Ok(VmValue::Map(Rc::new(std::cell::RefCell::new(map))))
        }
        other => Err(VmError::bad_type_msg(format!(
            "unknown serialized type tag 0x{other:02x}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neovm_config::MAX_STRUCT_DEPTH;

    const LIMITS: ExecutionEngineLimits = ExecutionEngineLimits::DEFAULT;

    #[test]
    fn test_serialize_layout() {
        let value = VmValue::new_array(vec![
            VmValue::Bool(true),
            VmValue::from(-1i64),
            VmValue::from(b"ab".to_vec()),
        ]);
        let bytes = serialize(&value, &LIMITS).expect("serialize should succeed");
        assert_eq!(hex::encode(&bytes), "8003010102_01ff_00026162".replace('_', ""));
    }

    #[test]
    fn test_map_written_in_key_order() {
        let map = VmValue::new_map();
        {
            let handle = map.as_map().expect("map expected");
            let mut inner = handle.borrow_mut();
            inner
                .set(VmValue::from(b"z".to_vec()), VmValue::from(1i64), 8)
                .expect("set should succeed");
            inner
                .set(VmValue::from(b"a".to_vec()), VmValue::from(2i64), 8)
                .expect("set should succeed");
        }
        let bytes = serialize(&map, &LIMITS).expect("serialize should succeed");
        assert_eq!(hex::encode(&bytes), "820200016102010200017a020101");

        let back = deserialize(&bytes, &LIMITS).expect("deserialize should succeed");
        let handle = back.as_map().expect("map expected");
        let first = handle.borrow().keys()[0].as_bytes().expect("bytes should succeed");
        assert_eq!(first, b"a".to_vec());
    }

    #[test]
    fn test_nested_struct_survives() {
        let value = VmValue::new_struct(vec![
            VmValue::new_struct(vec![VmValue::from(300i64)]),
            VmValue::from(b"x".to_vec()),
        ]);
        let bytes = serialize(&value, &LIMITS).expect("serialize should succeed");
        let back = deserialize(&bytes, &LIMITS).expect("deserialize should succeed");
        assert!(back.equals(&value));
    }

    #[test]
    fn test_cycle_rejected() {
        let array = VmValue::new_array(vec![]);
        let handle = array.as_array().expect("array expected");
        handle.borrow_mut().push(array.clone());
        assert_eq!(serialize(&array, &LIMITS).unwrap_err(), VmError::CircularReference);
    }

    #[test]
    fn test_shared_child_is_not_a_cycle() {
        let child = VmValue::new_array(vec![VmValue::from(1i64)]);
        let parent = VmValue::new_array(vec![child.clone(), child]);
        assert!(serialize(&parent, &LIMITS).is_ok());
    }

    #[test]
    fn test_depth_limit() {
        let mut value = VmValue::from(1i64);
        for _ in 0..MAX_STRUCT_DEPTH {
            value = VmValue::new_array(vec![value]);
        }
        assert!(serialize(&value, &LIMITS).is_ok());
        let deeper = VmValue::new_array(vec![value]);
        assert!(serialize(&deeper, &LIMITS).is_err());
    }

    #[test]
    fn test_deserialize_honours_serialize_depth() {
        let mut value = VmValue::from(1i64);
        for _ in 0..MAX_STRUCT_DEPTH {
            value = VmValue::new_array(vec![value]);
        }
        let bytes = serialize(&value, &LIMITS).expect("serialize should succeed");
        assert!(deserialize(&bytes, &LIMITS).is_ok());

        // one more single-element array around the deepest accepted blob
        let mut deeper = vec![ARRAY_TYPE, 0x01];
        deeper.extend_from_slice(&bytes);
        assert!(matches!(deserialize(&deeper, &LIMITS), Err(VmError::BadValue(_))));
    }

    #[test]
    fn test_configured_limits_apply() {
        let shallow = ExecutionEngineLimits {
            max_struct_depth: 1,
            ..ExecutionEngineLimits::DEFAULT
        };
        let one = VmValue::new_array(vec![VmValue::from(1i64)]);
        let two = VmValue::new_array(vec![one.clone()]);
        assert!(serialize(&one, &shallow).is_ok());
        assert!(serialize(&two, &shallow).is_err());
        let bytes = serialize(&two, &LIMITS).expect("serialize should succeed");
        assert!(deserialize(&bytes, &shallow).is_err());

        let small = ExecutionEngineLimits {
            max_item_size: 4,
            ..ExecutionEngineLimits::DEFAULT
        };
        assert!(serialize(&VmValue::from(b"abcdef".to_vec()), &small).is_err());
        assert!(deserialize(&[0x00, 0x06, 1, 2, 3, 4, 5, 6], &small).is_err());
    }

    #[test]
    fn test_interop_and_garbage_rejected() {
        #[derive(Debug)]
        struct Handle;
        impl super::super::InteropInterface for Handle {
            fn interface_type(&self) -> &str {
                "Handle"
            }
            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }
        assert!(serialize(&VmValue::from_interop(Handle), &LIMITS).is_err());
        assert!(deserialize(&[0x40], &LIMITS).is_err());
        assert!(deserialize(&[0x80, 0x02, 0x01, 0x01], &LIMITS).is_err());
        assert!(deserialize(&[0x01, 0x02], &LIMITS).is_err());
    }
}
