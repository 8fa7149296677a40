//! JSON rendering of notification payloads.

use super::VmValue;
use crate::error::{VmError, VmResult};
use neovm_config::{MAX_CLONE_COUNT, MAX_NOTIFY_LENGTH};
use serde_json::Value;

/// Renders a value as JSON with hex strings for primitives.
///
/// Integer zero and `false` render as `"00"`. The walk stops with an error
/// once more than `MAX_CLONE_COUNT` children or `MAX_NOTIFY_LENGTH` bytes
/// have been rendered, which also bounds self-referential containers.
pub fn to_hex_json(value: &VmValue) -> VmResult<Value> {
    let mut count = 0usize;
    let mut length = 0usize;
    let rendered = render(value, &mut count, &mut length)?;
    if length > MAX_NOTIFY_LENGTH {
        return Err(VmError::OverMaxItemSize(
            "notification exceeds maximum length".to_string(),
        ));
    }
    Ok(rendered)
}

fn hex_string(bytes: &[u8], length: &mut usize) -> Value {
    *length += bytes.len();
    Value::String(hex::encode(bytes))
}

fn render(value: &VmValue, count: &mut usize, length: &mut usize) -> VmResult<Value> {
    if *count > MAX_CLONE_COUNT {
        return Err(VmError::OverMaxCount);
    }
    if *length > MAX_NOTIFY_LENGTH {
        return Err(VmError::OverMaxItemSize(
            "notification exceeds maximum length".to_string(),
        ));
    }
    match value {
        VmValue::Bool(b) => Ok(hex_string(&[u8::from(*b)], length)),
        VmValue::ByteArray(bytes) => Ok(hex_string(bytes, length)),
        VmValue::Integer(i) => {
            let mut bytes = i.to_bytes();
            if bytes.is_empty() {
                bytes.push(0);
            }
            Ok(hex_string(&bytes, length))
        }
        VmValue::Array(items) | VmValue::Struct(items) => {
            let items = items.borrow();
            let mut out = Vec::with_capacity(items.len());
            for item in items.iter() {
                *count += 1;
                out.push(render(item, count, length)?);
            }
            Ok(Value::Array(out))
        }
        VmValue::Map(map) => {
            let map = map.borrow();
            let mut out = Vec::with_capacity(map.len());
            for (key, item) in map.iter() {
                *count += 1;
                let key = render(key, count, length)?;
                let item = render(item, count, length)?;
                out.push(Value::Array(vec![key, item]));
            }
            Ok(Value::Array(out))
        }
        VmValue::Interop(interop) => Ok(hex_string(&interop.to_bytes(), length)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitives_render_as_hex() {
        let value = VmValue::new_array(vec![
            VmValue::from(0i64),
            VmValue::from(255i64),
            VmValue::Bool(true),
            VmValue::Bool(false),
            VmValue::from(b"hi".to_vec()),
        ]);
        let json = to_hex_json(&value).expect("render should succeed");
        assert_eq!(json, json!(["00", "ff00", "01", "00", "6869"]));
    }

    #[test]
    fn test_map_renders_pairs() {
        let map = VmValue::new_map();
        map.as_map()
            .expect("map expected")
            .borrow_mut()
            .set(VmValue::from(1i64), VmValue::from(b"x".to_vec()), 4)
            .expect("set should succeed");
        assert_eq!(
            to_hex_json(&map).expect("render should succeed"),
            json!([["01", "78"]])
        );
    }

    #[test]
    fn test_self_reference_is_bounded() {
        let array = VmValue::new_array(vec![]);
        array.as_array().expect("array expected").borrow_mut().push(array.clone());
        assert_eq!(to_hex_json(&array).unwrap_err(), VmError::OverMaxCount);
    }

    #[test]
    fn test_length_limit() {
        let big = VmValue::from(vec![0xaa; MAX_NOTIFY_LENGTH + 1]);
        assert!(to_hex_json(&big).is_err());
    }
}
