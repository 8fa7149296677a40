//! Array, struct and map operations for the virtual machine.
//!
//! Structs are copied whenever they are stored into a container so that
//! later writes through the stored copy never reach the original.

use crate::error::{VmError, VmResult};
use crate::execution_engine::ExecutionEngine;
use crate::host::ExecutionHost;
use crate::instruction::Instruction;
use crate::jump_table::JumpTable;
use crate::op_code::OpCode;
use crate::vm_value::VmValue;

/// Registers the compound type handlers.
pub fn register_handlers<H: ExecutionHost>(jump_table: &mut JumpTable<H>) {
    jump_table.register(OpCode::ARRAYSIZE, array_size);
    jump_table.register(OpCode::PACK, pack);
    jump_table.register(OpCode::UNPACK, unpack);
    jump_table.register(OpCode::PICKITEM, pick_item);
    jump_table.register(OpCode::SETITEM, set_item);
    jump_table.register(OpCode::NEWARRAY, new_array);
    jump_table.register(OpCode::NEWSTRUCT, new_struct);
    jump_table.register(OpCode::NEWMAP, new_map);
    jump_table.register(OpCode::APPEND, append);
    jump_table.register(OpCode::REVERSE, reverse);
    jump_table.register(OpCode::REMOVE, remove);
    jump_table.register(OpCode::HASKEY, has_key);
    jump_table.register(OpCode::KEYS, keys);
    jump_table.register(OpCode::VALUES, values);
}

fn element_index(index: &VmValue, len: usize) -> VmResult<usize> {
    let i = index.as_int64()?;
    if i < 0 || i as u64 >= len as u64 {
        return Err(VmError::IndexOutOfBound(format!(
            "index {} on container of {} elements",
            i, len
        )));
    }
    Ok(i as usize)
}

fn check_count<H: ExecutionHost>(engine: &ExecutionEngine<H>, count: i64) -> VmResult<usize> {
    let max = engine.limits().max_array_size;
    if count < 0 || count as u64 > max as u64 {
        return Err(VmError::OverMaxArraySize(format!(
            "{} elements requested, limit {}",
            count, max
        )));
    }
    Ok(count as usize)
}

/// Element count of a container, or byte length of a primitive.
fn array_size<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let item = engine.pop()?;
    let len = match item.container_len() {
        Some(len) => len,
        None => item.as_bytes()?.len(),
    };
    engine.push(VmValue::from(len as i64))
}

fn pack<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let count = engine.evaluation_stack_mut().pop_as_int64()?;
    let count = check_count(engine, count)?;
    let stack = engine.evaluation_stack_mut();
    if count > stack.len() {
        return Err(VmError::stack_underflow_msg(format!(
            "PACK of {} items with {} on the stack",
            count,
            stack.len()
        )));
    }
    let items = (0..count)
        .map(|_| stack.pop())
        .collect::<VmResult<Vec<_>>>()?;
    stack.push(VmValue::new_array(items))
}

fn unpack<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let array = stack.pop_as_array()?;
    let items = array.borrow().clone();
    for item in items.iter().rev() {
        stack.push(item.clone())?;
    }
    stack.push(VmValue::from(items.len() as i64))
}

fn pick_item<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let (item, key) = stack.pop_pair()?;
    let value = match &item {
        VmValue::Array(items) | VmValue::Struct(items) => {
            let items = items.borrow();
            items[element_index(&key, items.len())?].clone()
        }
        VmValue::Map(map) => map.borrow().get(&key)?.ok_or(VmError::MapKeyNotExist)?,
        VmValue::Bool(_) | VmValue::Integer(_) | VmValue::ByteArray(_) => {
            let bytes = item.as_bytes()?;
            VmValue::from(i64::from(bytes[element_index(&key, bytes.len())?]))
        }
        VmValue::Interop(_) => return Err(VmError::invalid_type("Array", item.type_name())),
    };
    stack.push(value)
}

fn set_item<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let limits = *engine.limits();
    let stack = engine.evaluation_stack_mut();
    let value = stack.pop()?.clone_for_assign(limits.max_clone_count)?;
    let key = stack.pop()?;
    let item = stack.pop()?;
    match &item {
        VmValue::Array(items) | VmValue::Struct(items) => {
            let mut items = items.borrow_mut();
            let index = element_index(&key, items.len())?;
            items[index] = value;
        }
        VmValue::Map(map) => map.borrow_mut().set(key, value, limits.max_array_size)?,
        other => return Err(VmError::invalid_type("Array", other.type_name())),
    }
    Ok(())
}

fn filled(count: usize) -> Vec<VmValue> {
    vec![VmValue::Bool(false); count]
}

fn new_array<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let count = engine.evaluation_stack_mut().pop_as_int64()?;
    let count = check_count(engine, count)?;
    engine.push(VmValue::new_array(filled(count)))
}

fn new_struct<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let count = engine.evaluation_stack_mut().pop_as_int64()?;
    let count = check_count(engine, count)?;
    engine.push(VmValue::new_struct(filled(count)))
}

fn new_map<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    engine.push(VmValue::new_map())
}

fn append<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let limits = *engine.limits();
    let stack = engine.evaluation_stack_mut();
    let value = stack.pop()?.clone_for_assign(limits.max_clone_count)?;
    match stack.pop()? {
        VmValue::Array(items) | VmValue::Struct(items) => {
            let mut items = items.borrow_mut();
            if items.len() >= limits.max_array_size {
                return Err(VmError::OverMaxArraySize(format!(
                    "append to container of {} elements",
                    items.len()
                )));
            }
            items.push(value);
            Ok(())
        }
        other => Err(VmError::invalid_type("Array", other.type_name())),
    }
}

fn reverse<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    match engine.pop()? {
        VmValue::Array(items) | VmValue::Struct(items) => {
            items.borrow_mut().reverse();
            Ok(())
        }
        other => Err(VmError::invalid_type("Array", other.type_name())),
    }
}

fn remove<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let (item, key) = stack.pop_pair()?;
    match item {
        VmValue::Map(map) => {
            map.borrow_mut().remove(&key)?;
            Ok(())
        }
        VmValue::Array(items) | VmValue::Struct(items) => {
            let mut items = items.borrow_mut();
            let index = element_index(&key, items.len())?;
            items.remove(index);
            Ok(())
        }
        other => Err(VmError::invalid_type("Map", other.type_name())),
    }
}

fn has_key<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let (item, key) = stack.pop_pair()?;
    let found = item.as_map()?.borrow().contains_key(&key)?;
    stack.push(VmValue::Bool(found))
}

/// Keys in ascending order of their byte encoding.
fn keys<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let keys = stack.pop_as_map()?.borrow().keys();
    stack.push(VmValue::new_array(keys))
}

fn values<H: ExecutionHost>(engine: &mut ExecutionEngine<H>, _instruction: &Instruction) -> VmResult<()> {
    let stack = engine.evaluation_stack_mut();
    let values = stack.pop_as_map()?.borrow().values();
    stack.push(VmValue::new_array(values))
}
