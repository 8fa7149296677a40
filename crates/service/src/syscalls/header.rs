//! `System.Header.*`, `System.Block.*` and `System.Transaction.*`

use super::{min_stack, pop_interop, Engine};
use crate::ledger::{Block, Header, Transaction};
use neovm::{VmError, VmResult, VmValue};

/// Header accessors accept a header or a whole block.
pub(super) fn validate_header(engine: &Engine) -> VmResult<()> {
    min_stack::<1>(engine)?;
    let handle = engine.peek(0)?.as_interop()?;
    if handle.downcast_ref::<Header>().is_none() && handle.downcast_ref::<Block>().is_none() {
        return Err(VmError::invalid_type("Header", handle.interface_type()));
    }
    Ok(())
}

/// Block at the top, transaction index below it.
pub(super) fn validate_block_transaction(engine: &Engine) -> VmResult<()> {
    min_stack::<2>(engine)?;
    let handle = engine.peek(0)?.as_interop()?;
    let block = handle
        .downcast_ref::<Block>()
        .ok_or_else(|| VmError::invalid_type("Block", handle.interface_type()))?;
    let index = engine.peek(1)?.as_int64()?;
    if index < 0 || index as usize >= block.transactions.len() {
        return Err(VmError::IndexOutOfBound(format!(
            "transaction {index} of {}",
            block.transactions.len()
        )));
    }
    Ok(())
}

fn pop_header(engine: &mut Engine) -> VmResult<Header> {
    let handle = engine.pop()?.as_interop()?;
    if let Some(header) = handle.downcast_ref::<Header>() {
        return Ok(header.clone());
    }
    handle
        .downcast_ref::<Block>()
        .map(|block| block.header.clone())
        .ok_or_else(|| VmError::invalid_type("Header", handle.interface_type()))
}

pub(super) fn get_index(engine: &mut Engine) -> VmResult<()> {
    let header = pop_header(engine)?;
    engine.push(VmValue::from(i64::from(header.height)))
}

pub(super) fn get_hash(engine: &mut Engine) -> VmResult<()> {
    let header = pop_header(engine)?;
    engine.push(VmValue::ByteArray(header.hash().to_vec()))
}

pub(super) fn get_prev_hash(engine: &mut Engine) -> VmResult<()> {
    let header = pop_header(engine)?;
    engine.push(VmValue::ByteArray(header.prev_hash.to_vec()))
}

pub(super) fn get_timestamp(engine: &mut Engine) -> VmResult<()> {
    let header = pop_header(engine)?;
    engine.push(VmValue::from(i64::from(header.timestamp)))
}

pub(super) fn get_transaction_count(engine: &mut Engine) -> VmResult<()> {
    let block: Block = pop_interop(engine)?;
    engine.push(VmValue::from(block.transactions.len() as i64))
}

pub(super) fn get_transactions(engine: &mut Engine) -> VmResult<()> {
    let block: Block = pop_interop(engine)?;
    let max = engine.limits().max_array_size;
    if block.transactions.len() > max {
        return Err(VmError::OverMaxArraySize(format!(
            "block holds {} transactions",
            block.transactions.len()
        )));
    }
    let items = block
        .transactions
        .into_iter()
        .map(VmValue::from_interop)
        .collect();
    engine.push(VmValue::new_array(items))
}

pub(super) fn get_block_transaction(engine: &mut Engine) -> VmResult<()> {
    let block: Block = pop_interop(engine)?;
    let index = engine.pop()?.as_int64()? as usize;
    let transaction = block
        .transactions
        .get(index)
        .cloned()
        .ok_or_else(|| VmError::IndexOutOfBound(format!("transaction {index}")))?;
    engine.push(VmValue::from_interop(transaction))
}

pub(super) fn get_transaction_hash(engine: &mut Engine) -> VmResult<()> {
    let transaction: Transaction = pop_interop(engine)?;
    engine.push(VmValue::ByteArray(transaction.hash().to_vec()))
}
