//! Read-only blockchain data exposed to contracts.
//!
//! Headers, blocks and transactions travel on the evaluation stack as
//! interop handles and are inspected through the `System.Header.*`,
//! `System.Block.*` and `System.Transaction.*` syscalls.

use crate::error::{ServiceError, ServiceResult};
use hashbrown::HashMap;
use neovm::crypto::{hash160, hash256};
use neovm::vm_value::InteropInterface;
use neovm::ScriptHash;
use parking_lot::RwLock;
use std::any::Any;

/// 32-byte block or transaction hash.
pub type Hash256 = [u8; 32];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    pub version: u32,
    pub prev_hash: Hash256,
    pub merkle_root: Hash256,
    pub timestamp: u32,
    pub height: u32,
    pub consensus_data: u64,
    pub next_bookkeeper: ScriptHash,
}

impl Header {
    /// Unsigned header bytes, the preimage of [`hash`](Self::hash).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(4 + 32 + 32 + 4 + 4 + 8 + 20);
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&self.prev_hash);
        bytes.extend_from_slice(&self.merkle_root);
        bytes.extend_from_slice(&self.timestamp.to_le_bytes());
        bytes.extend_from_slice(&self.height.to_le_bytes());
        bytes.extend_from_slice(&self.consensus_data.to_le_bytes());
        bytes.extend_from_slice(&self.next_bookkeeper);
        bytes
    }

    pub fn hash(&self) -> Hash256 {
        hash256(&self.to_bytes())
    }
}

impl InteropInterface for Header {
    fn interface_type(&self) -> &str {
        "Header"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.hash().to_vec()
    }
}

/// A transaction as seen by contracts: an invocation payload plus the
/// addresses that signed it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transaction {
    pub version: u8,
    pub nonce: u32,
    pub payload: Vec<u8>,
    pub signers: Vec<ScriptHash>,
}

impl Transaction {
    pub fn new(payload: Vec<u8>, signers: Vec<ScriptHash>) -> Self {
        Self {
            payload,
            signers,
            ..Self::default()
        }
    }

    /// Bytes covered by the signatures, checked by CHECKSIG.
    pub fn signing_message(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(13 + self.payload.len() + 20 * self.signers.len());
        bytes.push(self.version);
        bytes.extend_from_slice(&self.nonce.to_le_bytes());
        bytes.extend_from_slice(&(self.payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&self.payload);
        bytes.extend_from_slice(&(self.signers.len() as u32).to_le_bytes());
        for signer in &self.signers {
            bytes.extend_from_slice(signer);
        }
        bytes
    }

    pub fn hash(&self) -> Hash256 {
        hash256(&self.signing_message())
    }

    /// True when `address` signed this transaction.
    pub fn is_signed_by(&self, address: &ScriptHash) -> bool {
        self.signers.iter().any(|signer| signer == address)
    }

    /// True when the owner of the SEC1-encoded `public_key` signed.
    pub fn is_signed_by_key(&self, public_key: &[u8]) -> bool {
        self.is_signed_by(&hash160(public_key))
    }
}

impl InteropInterface for Transaction {
    fn interface_type(&self) -> &str {
        "Transaction"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.hash().to_vec()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    pub header: Header,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn hash(&self) -> Hash256 {
        self.header.hash()
    }
}

impl InteropInterface for Block {
    fn interface_type(&self) -> &str {
        "Block"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.hash().to_vec()
    }
}

/// Ledger queries answered for `System.Blockchain.*`.
///
/// Lookups of unknown heights or hashes return `Ok(None)`; errors are
/// reserved for failures of the store itself.
pub trait LedgerStore: Send + Sync {
    fn current_height(&self) -> u32;

    fn header_by_height(&self, height: u32) -> ServiceResult<Option<Header>>;

    fn header_by_hash(&self, hash: &Hash256) -> ServiceResult<Option<Header>>;

    fn block_by_height(&self, height: u32) -> ServiceResult<Option<Block>>;

    fn block_by_hash(&self, hash: &Hash256) -> ServiceResult<Option<Block>>;

    /// The transaction and the height of the block that holds it.
    fn transaction(&self, hash: &Hash256) -> ServiceResult<Option<(Transaction, u32)>>;
}

#[derive(Debug, Default)]
struct LedgerData {
    blocks: Vec<Block>,
    by_hash: HashMap<Hash256, u32>,
    transactions: HashMap<Hash256, (u32, usize)>,
}

/// An in-memory chain of blocks, heights starting at zero.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    data: RwLock<LedgerData>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a block. Its header height must be the next height.
    pub fn add_block(&self, block: Block) -> ServiceResult<()> {
        let mut data = self.data.write();
        let expected = data.blocks.len() as u32;
        if block.header.height != expected {
            return Err(ServiceError::ledger(format!(
                "block height {} does not follow {}",
                block.header.height,
                data.blocks.len()
            )));
        }
        data.by_hash.insert(block.hash(), expected);
        for (index, tx) in block.transactions.iter().enumerate() {
            data.transactions.insert(tx.hash(), (expected, index));
        }
        data.blocks.push(block);
        Ok(())
    }
}

impl LedgerStore for MemoryLedger {
    fn current_height(&self) -> u32 {
        (self.data.read().blocks.len() as u32).saturating_sub(1)
    }

    fn header_by_height(&self, height: u32) -> ServiceResult<Option<Header>> {
        Ok(self.block_by_height(height)?.map(|block| block.header))
    }

    fn header_by_hash(&self, hash: &Hash256) -> ServiceResult<Option<Header>> {
        Ok(self.block_by_hash(hash)?.map(|block| block.header))
    }

    fn block_by_height(&self, height: u32) -> ServiceResult<Option<Block>> {
        Ok(self.data.read().blocks.get(height as usize).cloned())
    }

    fn block_by_hash(&self, hash: &Hash256) -> ServiceResult<Option<Block>> {
        let data = self.data.read();
        Ok(data
            .by_hash
            .get(hash)
            .and_then(|height| data.blocks.get(*height as usize))
            .cloned())
    }

    fn transaction(&self, hash: &Hash256) -> ServiceResult<Option<(Transaction, u32)>> {
        let data = self.data.read();
        Ok(data.transactions.get(hash).and_then(|(height, index)| {
            data.blocks
                .get(*height as usize)
                .and_then(|block| block.transactions.get(*index))
                .map(|tx| (tx.clone(), *height))
        }))
    }
}
