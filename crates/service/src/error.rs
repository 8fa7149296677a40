//! Error types for the service layer.

use neovm::VmError;
use neovm_config::ConfigError;
use thiserror::Error;

/// Service-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("VM error: {0}")]
    Vm(#[from] VmError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Contract error: {0}")]
    Contract(String),

    #[error("Invalid code: {0}")]
    InvalidCode(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }

    pub fn ledger<S: Into<String>>(msg: S) -> Self {
        Self::Ledger(msg.into())
    }

    pub fn contract<S: Into<String>>(msg: S) -> Self {
        Self::Contract(msg.into())
    }
}

/// Syscall handlers run inside the engine, so host failures surface there
/// as interop faults.
impl From<ServiceError> for VmError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Vm(inner) => inner,
            other => VmError::Interop(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vm_error_round_trips() {
        let err: ServiceError = VmError::DivModByZero.into();
        assert_eq!(VmError::from(err), VmError::DivModByZero);
    }

    #[test]
    fn test_host_error_becomes_interop_fault() {
        let vm_err = VmError::from(ServiceError::contract("contract exists"));
        assert_eq!(vm_err.kind(), "interop error");
        assert_eq!(
            vm_err.to_string(),
            "Interop error: Contract error: contract exists"
        );
    }
}
