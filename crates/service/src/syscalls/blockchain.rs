//! `System.Blockchain.*`

use super::{pop_bytes, Engine};
use crate::ledger::{Block, Hash256, Header};
use neovm::{VmError, VmResult, VmValue};
use tracing::debug;

/// A block reference: a height of at most five bytes or a 32-byte hash.
enum BlockRef {
    Height(u32),
    Hash(Hash256),
}

fn pop_block_ref(engine: &mut Engine) -> VmResult<BlockRef> {
    let data = pop_bytes(engine)?;
    if data.len() <= 5 {
        let height = data
            .iter()
            .rev()
            .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));
        return u32::try_from(height)
            .map(BlockRef::Height)
            .map_err(|_| VmError::bad_value_msg(format!("block height {height} out of range")));
    }
    Hash256::try_from(data.as_slice())
        .map(BlockRef::Hash)
        .map_err(|_| VmError::bad_value_msg(format!("block reference of {} bytes", data.len())))
}

fn pop_hash256(engine: &mut Engine) -> VmResult<Hash256> {
    let data = pop_bytes(engine)?;
    Hash256::try_from(data.as_slice())
        .map_err(|_| VmError::bad_value_msg(format!("hash of {} bytes", data.len())))
}

pub(super) fn get_height(engine: &mut Engine) -> VmResult<()> {
    let height = engine.host().ledger().current_height();
    engine.push(VmValue::from(i64::from(height)))
}

pub(super) fn get_header(engine: &mut Engine) -> VmResult<()> {
    let header: Option<Header> = match pop_block_ref(engine)? {
        BlockRef::Height(height) => engine.host().ledger().header_by_height(height)?,
        BlockRef::Hash(hash) => engine.host().ledger().header_by_hash(&hash)?,
    };
    let header = header.ok_or_else(|| VmError::interop_msg("header not found"))?;
    debug!(height = header.height, "header loaded");
    engine.push(VmValue::from_interop(header))
}

pub(super) fn get_block(engine: &mut Engine) -> VmResult<()> {
    let block: Option<Block> = match pop_block_ref(engine)? {
        BlockRef::Height(height) => engine.host().ledger().block_by_height(height)?,
        BlockRef::Hash(hash) => engine.host().ledger().block_by_hash(&hash)?,
    };
    let block = block.ok_or_else(|| VmError::interop_msg("block not found"))?;
    engine.push(VmValue::from_interop(block))
}

pub(super) fn get_transaction(engine: &mut Engine) -> VmResult<()> {
    let hash = pop_hash256(engine)?;
    let (transaction, _) = engine
        .host()
        .ledger()
        .transaction(&hash)?
        .ok_or_else(|| VmError::interop_msg("transaction not found"))?;
    engine.push(VmValue::from_interop(transaction))
}

pub(super) fn get_transaction_height(engine: &mut Engine) -> VmResult<()> {
    let hash = pop_hash256(engine)?;
    let (_, height) = engine
        .host()
        .ledger()
        .transaction(&hash)?
        .ok_or_else(|| VmError::interop_msg("transaction not found"))?;
    engine.push(VmValue::from(i64::from(height)))
}

pub(super) fn get_contract(engine: &mut Engine) -> VmResult<()> {
    let data = pop_bytes(engine)?;
    let address = <[u8; 20]>::try_from(data.as_slice())
        .map_err(|_| VmError::bad_value_msg(format!("address of {} bytes", data.len())))?;
    let contract = engine
        .host()
        .cache()
        .get_contract(&address)?
        .ok_or_else(|| VmError::ContractNotFound(hex::encode(address)))?;
    engine.push(VmValue::from_interop(contract))
}
