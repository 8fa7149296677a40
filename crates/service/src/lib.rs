//! # NeoVM Service
//!
//! The blockchain-aware host around the [`neovm`] engine.
//!
//! [`NeoVmService`] runs one contract invocation at a time. It registers
//! the ledger, storage, contract and runtime syscalls, charges gas before
//! every instruction, and commits storage writes only when the engine
//! halts.
//!
//! ## Example
//!
//! ```rust
//! use neovm::{OpCode, ScriptBuilder};
//! use neovm_config::ServiceConfig;
//! use neovm_service::{MemoryLedger, MemoryStorage, NeoVmService};
//! use std::sync::Arc;
//!
//! let service = NeoVmService::new(
//!     ServiceConfig::default(),
//!     Arc::new(MemoryLedger::new()),
//!     Arc::new(MemoryStorage::new()),
//! );
//! let mut sb = ScriptBuilder::new();
//! sb.emit_push_int(2).emit_push_int(3).emit_opcode(OpCode::MUL);
//!
//! let outcome = service.invoke(sb.to_array()).unwrap();
//! assert!(outcome.is_halt());
//! assert_eq!(outcome.result.unwrap().as_int64().unwrap(), 6);
//! ```

pub mod contract;
pub mod error;
pub mod events;
pub mod gas;
pub mod host;
pub mod ledger;
pub mod service;
pub mod storage;
pub mod syscalls;

pub use contract::DeployCode;
pub use error::{ServiceError, ServiceResult};
pub use events::{LogEvent, NotifyEvent};
pub use gas::GasMeter;
pub use host::ServiceHost;
pub use ledger::{Block, Hash256, Header, LedgerStore, MemoryLedger, Transaction};
pub use service::{ExecutionResult, NeoVmService};
pub use storage::{CacheDb, MemoryStorage, Storage};
pub use syscalls::StorageContext;
