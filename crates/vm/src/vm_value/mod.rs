//! Value model of the virtual machine.
//!
//! [`VmValue`] is the closed set of values that can live on the stacks.
//! Arrays and maps are shared handles: a mutation through one alias is seen
//! through all of them. Structs share the same handle type but are deep
//! copied wherever they are assigned into a container, so they behave as
//! values.

pub mod interop;
pub mod map_value;
pub mod notify;
pub mod serialize;

use crate::error::{VmError, VmResult};
use crate::int_value::{bigint_from_neo_bytes, IntValue};
use num_bigint::BigInt;
use std::cell::RefCell;
use std::rc::Rc;

pub use interop::{InteropInterface, InteropValue};
pub use map_value::MapValue;

/// Shared, mutable element list backing arrays and structs.
pub type ArrayRef = Rc<RefCell<Vec<VmValue>>>;
/// Shared, mutable map handle.
pub type MapRef = Rc<RefCell<MapValue>>;

/// Serialization type tags.
pub const BYTEARRAY_TYPE: u8 = 0x00;
pub const BOOLEAN_TYPE: u8 = 0x01;
pub const INTEGER_TYPE: u8 = 0x02;
pub const INTEROP_TYPE: u8 = 0x40;
pub const ARRAY_TYPE: u8 = 0x80;
pub const STRUCT_TYPE: u8 = 0x81;
pub const MAP_TYPE: u8 = 0x82;

/// A value on the evaluation or alt stack.
#[derive(Debug, Clone)]
pub enum VmValue {
    Bool(bool),
    Integer(IntValue),
    ByteArray(Vec<u8>),
    Array(ArrayRef),
    Struct(ArrayRef),
    Map(MapRef),
    Interop(InteropValue),
}

impl VmValue {
    /// Creates an array value from the given items.
    pub fn new_array(items: Vec<VmValue>) -> Self {
        VmValue::Array(Rc::new(RefCell::new(items)))
    }

    /// Creates a struct value from the given items.
    pub fn new_struct(items: Vec<VmValue>) -> Self {
        VmValue::Struct(Rc::new(RefCell::new(items)))
    }

    /// Creates an empty map value.
    pub fn new_map() -> Self {
        VmValue::Map(Rc::new(RefCell::new(MapValue::new())))
    }

    pub fn from_interop<T: InteropInterface>(value: T) -> Self {
        VmValue::Interop(InteropValue::new(value))
    }

    /// Name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            VmValue::Bool(_) => "Boolean",
            VmValue::Integer(_) => "Integer",
            VmValue::ByteArray(_) => "ByteArray",
            VmValue::Array(_) => "Array",
            VmValue::Struct(_) => "Struct",
            VmValue::Map(_) => "Map",
            VmValue::Interop(_) => "Interop",
        }
    }

    /// Serialization tag of the variant.
    pub fn type_tag(&self) -> u8 {
        match self {
            VmValue::Bool(_) => BOOLEAN_TYPE,
            VmValue::Integer(_) => INTEGER_TYPE,
            VmValue::ByteArray(_) => BYTEARRAY_TYPE,
            VmValue::Array(_) => ARRAY_TYPE,
            VmValue::Struct(_) => STRUCT_TYPE,
            VmValue::Map(_) => MAP_TYPE,
            VmValue::Interop(_) => INTEROP_TYPE,
        }
    }

    /// True for Bool, Integer and ByteArray.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            VmValue::Bool(_) | VmValue::Integer(_) | VmValue::ByteArray(_)
        )
    }

    /// NeoVM byte encoding of a primitive value.
    pub fn as_bytes(&self) -> VmResult<Vec<u8>> {
        match self {
            VmValue::Bool(b) => Ok(vec![u8::from(*b)]),
            VmValue::Integer(i) => Ok(i.to_bytes()),
            VmValue::ByteArray(bytes) => Ok(bytes.clone()),
            other => Err(VmError::invalid_type("ByteArray", other.type_name())),
        }
    }

    pub fn as_bool(&self) -> VmResult<bool> {
        match self {
            VmValue::Bool(b) => Ok(*b),
            VmValue::Integer(i) => Ok(!i.is_zero()),
            VmValue::ByteArray(bytes) => Ok(bytes.iter().any(|b| *b != 0)),
            VmValue::Struct(_) | VmValue::Map(_) | VmValue::Interop(_) => Ok(true),
            VmValue::Array(_) => Err(VmError::invalid_type("Boolean", "Array")),
        }
    }

    /// Integer view of a primitive, bounded to the big-integer size limit.
    pub fn as_int_value(&self) -> VmResult<IntValue> {
        match self {
            VmValue::Bool(b) => Ok(IntValue::from_i64(i64::from(*b))),
            VmValue::Integer(i) => Ok(i.clone()),
            VmValue::ByteArray(bytes) => IntValue::from_bytes(bytes),
            other => Err(VmError::invalid_type("Integer", other.type_name())),
        }
    }

    /// Integer view without the size bound. Only comparisons use this.
    pub fn as_bigint(&self) -> VmResult<BigInt> {
        match self {
            VmValue::Bool(b) => Ok(BigInt::from(u8::from(*b))),
            VmValue::Integer(i) => Ok(i.to_bigint()),
            VmValue::ByteArray(bytes) => Ok(bigint_from_neo_bytes(bytes)),
            other => Err(VmError::invalid_type("Integer", other.type_name())),
        }
    }

    pub fn as_int64(&self) -> VmResult<i64> {
        self.as_int_value()?
            .to_i64()
            .ok_or_else(|| VmError::bad_value_msg("integer does not fit in 64 bits"))
    }

    pub fn as_array(&self) -> VmResult<ArrayRef> {
        match self {
            VmValue::Array(items) => Ok(items.clone()),
            other => Err(VmError::invalid_type("Array", other.type_name())),
        }
    }

    pub fn as_struct(&self) -> VmResult<ArrayRef> {
        match self {
            VmValue::Struct(items) => Ok(items.clone()),
            other => Err(VmError::invalid_type("Struct", other.type_name())),
        }
    }

    pub fn as_map(&self) -> VmResult<MapRef> {
        match self {
            VmValue::Map(map) => Ok(map.clone()),
            other => Err(VmError::invalid_type("Map", other.type_name())),
        }
    }

    pub fn as_interop(&self) -> VmResult<InteropValue> {
        match self {
            VmValue::Interop(value) => Ok(value.clone()),
            other => Err(VmError::invalid_type("Interop", other.type_name())),
        }
    }

    /// Byte form shared by EQUAL and map indexing.
    ///
    /// Booleans take their integer encoding, so `false`, `0` and the empty
    /// byte array are one key, as are `true`, `1` and `[0x01]`.
    pub fn key_bytes(&self) -> VmResult<Vec<u8>> {
        match self {
            VmValue::Bool(b) => Ok(IntValue::from_i64(i64::from(*b)).to_bytes()),
            VmValue::Integer(i) => Ok(i.to_bytes()),
            VmValue::ByteArray(bytes) => Ok(bytes.clone()),
            other => Err(VmError::invalid_type("primitive", other.type_name())),
        }
    }

    /// Equality as seen by EQUAL, map lookups and struct comparison.
    ///
    /// Primitives compare by [`key_bytes`](Self::key_bytes), which makes
    /// Bool and Integer compare numerically (`true == 1`, `false == 0`).
    /// Arrays and maps compare by identity, structs element-wise with these
    /// same rules, interop handles by identity or equal host bytes.
    pub fn equals(&self, other: &VmValue) -> bool {
        match (self, other) {
            (VmValue::Integer(a), VmValue::Integer(b)) => a == b,
            (a, b) if a.is_primitive() && b.is_primitive() => {
                match (a.key_bytes(), b.key_bytes()) {
                    (Ok(x), Ok(y)) => x == y,
                    _ => false,
                }
            }
            (VmValue::Array(a), VmValue::Array(b)) => Rc::ptr_eq(a, b),
            (VmValue::Map(a), VmValue::Map(b)) => Rc::ptr_eq(a, b),
            (VmValue::Struct(a), VmValue::Struct(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equals(y))
            }
            (VmValue::Interop(a), VmValue::Interop(b)) => a.equals(b),
            _ => false,
        }
    }

    /// Copy used when a value is assigned into a container.
    ///
    /// Structs are deep copied (nested structs included, arrays and maps
    /// still shared); every other variant is returned as a handle clone.
    pub fn clone_for_assign(&self, max_count: usize) -> VmResult<VmValue> {
        match self {
            VmValue::Struct(items) => {
                let mut count = 0usize;
                clone_struct(items, &mut count, max_count)
            }
            other => Ok(other.clone()),
        }
    }

    /// Number of elements of an array, struct or map.
    pub fn container_len(&self) -> Option<usize> {
        match self {
            VmValue::Array(items) | VmValue::Struct(items) => Some(items.borrow().len()),
            VmValue::Map(map) => Some(map.borrow().len()),
            _ => None,
        }
    }
}

fn clone_struct(items: &ArrayRef, count: &mut usize, max_count: usize) -> VmResult<VmValue> {
    let source = items.borrow();
    let mut copied = Vec::with_capacity(source.len());
    for item in source.iter() {
        *count += 1;
        if *count > max_count {
            return Err(VmError::OverMaxCount);
        }
        match item {
            VmValue::Struct(inner) => copied.push(clone_struct(inner, count, max_count)?),
            other => copied.push(other.clone()),
        }
    }
    Ok(VmValue::new_struct(copied))
}

impl From<bool> for VmValue {
    fn from(value: bool) -> Self {
        VmValue::Bool(value)
    }
}

impl From<i64> for VmValue {
    fn from(value: i64) -> Self {
        VmValue::Integer(IntValue::from_i64(value))
    }
}

impl From<IntValue> for VmValue {
    fn from(value: IntValue) -> Self {
        VmValue::Integer(value)
    }
}

impl From<Vec<u8>> for VmValue {
    fn from(value: Vec<u8>) -> Self {
        VmValue::ByteArray(value)
    }
}

impl From<&[u8]> for VmValue {
    fn from(value: &[u8]) -> Self {
        VmValue::ByteArray(value.to_vec())
    }
}
