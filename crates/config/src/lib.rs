//! NeoVM Configuration Module
//!
//! Consensus constants shared by the virtual machine and its host, plus the
//! serde-driven configuration types that let a node override the runtime
//! limits and gas budget.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Maximum depth of the evaluation stack plus the alt stack
pub const STACK_LIMIT: usize = 2 * 1024;
/// Maximum byte length of any single stack item
pub const MAX_ITEM_SIZE: usize = 1024 * 1024;
/// Maximum byte length of a byte array produced by serialization or CAT
pub const MAX_BYTEARRAY_SIZE: usize = MAX_ITEM_SIZE;
/// Maximum number of elements in an array, struct or map
pub const MAX_ARRAY_SIZE: usize = 1024;
/// Maximum number of frames on the invocation stack
pub const MAX_INVOCATION_STACK_SIZE: usize = 1024;
/// Maximum byte length of an integer in NeoVM encoding
pub const MAX_BIGINT_SIZE: usize = 32;
/// Maximum nesting depth accepted by serialization
pub const MAX_STRUCT_DEPTH: usize = 10;
/// Maximum number of items visited when cloning or walking a value tree
pub const MAX_CLONE_COUNT: usize = 1024;
/// Maximum length of a rendered notification
pub const MAX_NOTIFY_LENGTH: usize = 64 * 1024;
/// Size of a contract address in bytes
pub const ADDRESS_SIZE: usize = 20;
/// Maximum length of a user storage key
pub const MAX_STORAGE_KEY_SIZE: usize = 1024;
/// Maximum number of executed instructions per invocation
pub const VM_STEP_LIMIT: u64 = 400_000;

/// Contract deployment limits
pub const MAX_CONTRACT_CODE_SIZE: usize = 1024 * 1024;
pub const MAX_CONTRACT_FIELD_SIZE: usize = 252;
pub const MAX_CONTRACT_DESC_SIZE: usize = 65536;

/// Gas prices
pub const OPCODE_GAS: u64 = 1;
pub const BLOCKCHAIN_GETHEADER_GAS: u64 = 100;
pub const BLOCKCHAIN_GETBLOCK_GAS: u64 = 200;
pub const BLOCKCHAIN_GETTRANSACTION_GAS: u64 = 100;
pub const BLOCKCHAIN_GETCONTRACT_GAS: u64 = 100;
pub const CONTRACT_CREATE_GAS: u64 = 20_000_000;
pub const CONTRACT_MIGRATE_GAS: u64 = 20_000_000;
pub const STORAGE_GET_GAS: u64 = 200;
pub const STORAGE_PUT_GAS: u64 = 4000;
pub const STORAGE_DELETE_GAS: u64 = 100;
pub const RUNTIME_CHECKWITNESS_GAS: u64 = 200;
pub const APPCALL_GAS: u64 = 10;
pub const TAILCALL_GAS: u64 = 10;
pub const SHA1_GAS: u64 = 10;
pub const SHA256_GAS: u64 = 10;
pub const HASH160_GAS: u64 = 20;
pub const HASH256_GAS: u64 = 20;
/// Storage.Put is charged per started kilobyte of key plus value
pub const STORAGE_PUT_BLOCK_SIZE: u64 = 1024;

/// Default gas budget for a single invocation
pub const DEFAULT_GAS_LIMIT: u64 = 20_000_000;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Runtime limits of the virtual machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    pub max_stack_size: usize,
    pub max_item_size: usize,
    pub max_array_size: usize,
    /// May only tighten `MAX_BIGINT_SIZE`; integers never encode wider.
    pub max_bigint_size: usize,
    pub max_invocation_stack_size: usize,
    pub max_struct_depth: usize,
    pub max_clone_count: usize,
    /// Disables HASKEY, KEYS, VALUES and DCALL
    pub disable_has_key: bool,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_stack_size: STACK_LIMIT,
            max_item_size: MAX_ITEM_SIZE,
            max_array_size: MAX_ARRAY_SIZE,
            max_bigint_size: MAX_BIGINT_SIZE,
            max_invocation_stack_size: MAX_INVOCATION_STACK_SIZE,
            max_struct_depth: MAX_STRUCT_DEPTH,
            max_clone_count: MAX_CLONE_COUNT,
            disable_has_key: false,
        }
    }
}

impl VmConfig {
    /// Checks that every limit is usable.
    pub fn validate(&self) -> ConfigResult<()> {
        let checks: [(&'static str, usize); 7] = [
            ("max_stack_size", self.max_stack_size),
            ("max_item_size", self.max_item_size),
            ("max_array_size", self.max_array_size),
            ("max_bigint_size", self.max_bigint_size),
            ("max_invocation_stack_size", self.max_invocation_stack_size),
            ("max_struct_depth", self.max_struct_depth),
            ("max_clone_count", self.max_clone_count),
        ];
        for (field, value) in checks {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        if self.max_bigint_size > MAX_BIGINT_SIZE {
            return Err(ConfigError::Invalid {
                field: "max_bigint_size",
                reason: format!(
                    "{} exceeds the integer encoding bound {}",
                    self.max_bigint_size, MAX_BIGINT_SIZE
                ),
            });
        }
        if self.max_array_size > self.max_stack_size {
            return Err(ConfigError::Invalid {
                field: "max_array_size",
                reason: format!(
                    "{} exceeds max_stack_size {}",
                    self.max_array_size, self.max_stack_size
                ),
            });
        }
        Ok(())
    }
}

/// Host-side execution settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub gas_limit: u64,
    pub step_limit: u64,
    /// Dry runs are bounded by `step_limit` in addition to gas
    pub pre_exec: bool,
    pub vm: VmConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            gas_limit: DEFAULT_GAS_LIMIT,
            step_limit: VM_STEP_LIMIT,
            pre_exec: false,
            vm: VmConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: ServiceConfig =
            toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml_str(&text)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.step_limit == 0 && self.pre_exec {
            return Err(ConfigError::Invalid {
                field: "step_limit",
                reason: "must be greater than zero".to_string(),
            });
        }
        self.vm.validate()
    }
}
