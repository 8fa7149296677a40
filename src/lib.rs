//! # NeoVM-RS
//!
//! A deterministic NeoVM smart-contract execution engine in Rust.
//!
//! The workspace is split into three crates, re-exported here:
//!
//! - [`config`] - consensus constants, gas prices and TOML configuration
//! - [`vm`] - the stack machine: values, bounded integers, opcodes and the
//!   execution engine
//! - [`service`] - the blockchain-aware host with ledger, storage, contract
//!   and runtime syscalls plus gas accounting
//!
//! ## Quick Start
//!
//! ```rust
//! use neovm_rs::prelude::*;
//! use std::sync::Arc;
//!
//! let service = NeoVmService::new(
//!     ServiceConfig::default(),
//!     Arc::new(MemoryLedger::new()),
//!     Arc::new(MemoryStorage::new()),
//! );
//!
//! let mut sb = ScriptBuilder::new();
//! sb.emit_push_int(40).emit_push_int(2).emit_opcode(OpCode::ADD);
//!
//! let outcome = service.invoke(sb.to_array()).unwrap();
//! assert_eq!(outcome.state, VMState::HALT);
//! assert_eq!(outcome.gas_consumed, 3);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub use neovm as vm;
pub use neovm_config as config;
pub use neovm_service as service;

/// Common imports for embedding the VM
pub mod prelude {
    pub use crate::config::{ServiceConfig, VmConfig};
    pub use crate::service::{
        DeployCode, ExecutionResult, LedgerStore, MemoryLedger, MemoryStorage, NeoVmService,
        ServiceError, Storage, Transaction,
    };
    pub use crate::vm::{
        BasicHost, ExecutionEngine, OpCode, ScriptBuilder, VMState, VmError, VmValue,
    };
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Installs a `tracing` subscriber filtered by `RUST_LOG`, defaulting to
/// `info`. Does nothing if a subscriber is already installed.
#[cfg(feature = "subscriber")]
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(env_filter).try_init();
    tracing::debug!(version = VERSION, "tracing initialised");
}
