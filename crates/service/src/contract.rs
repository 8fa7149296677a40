//! Deployed contract records.

use crate::error::{ServiceError, ServiceResult};
use neovm::crypto::hash160;
use neovm::io::{BinaryWriter, MemoryReader};
use neovm::vm_value::InteropInterface;
use neovm::ScriptHash;
use neovm_config::{MAX_CONTRACT_CODE_SIZE, MAX_CONTRACT_DESC_SIZE, MAX_CONTRACT_FIELD_SIZE};
use std::any::Any;

/// A deployed contract: its code plus descriptive metadata.
///
/// Metadata fields are opaque bytes, bounded in length only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeployCode {
    pub code: Vec<u8>,
    pub need_storage: bool,
    pub name: Vec<u8>,
    pub version: Vec<u8>,
    pub author: Vec<u8>,
    pub email: Vec<u8>,
    pub description: Vec<u8>,
}

impl DeployCode {
    /// A contract with the given code and empty metadata.
    pub fn new(code: Vec<u8>) -> Self {
        Self {
            code,
            need_storage: true,
            ..Self::default()
        }
    }

    /// The contract address, `hash160(code)`.
    pub fn address(&self) -> ScriptHash {
        hash160(&self.code)
    }

    /// Checks the deployment size limits.
    pub fn validate(&self) -> ServiceResult<()> {
        if self.code.len() > MAX_CONTRACT_CODE_SIZE {
            return Err(ServiceError::contract("code too long"));
        }
        let fields = [
            ("name", &self.name),
            ("version", &self.version),
            ("author", &self.author),
            ("email", &self.email),
        ];
        for (field, value) in fields {
            if value.len() > MAX_CONTRACT_FIELD_SIZE {
                return Err(ServiceError::contract(format!("{field} too long")));
            }
        }
        if self.description.len() > MAX_CONTRACT_DESC_SIZE {
            return Err(ServiceError::contract("description too long"));
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> ServiceResult<Vec<u8>> {
        let mut writer = BinaryWriter::new();
        writer.write_var_bytes(&self.code)?;
        writer.write_bool(self.need_storage)?;
        for field in [
            &self.name,
            &self.version,
            &self.author,
            &self.email,
            &self.description,
        ] {
            writer.write_var_bytes(field)?;
        }
        Ok(writer.into_bytes())
    }

    pub fn from_bytes(bytes: &[u8]) -> ServiceResult<Self> {
        let mut reader = MemoryReader::new(bytes);
        let code = reader.read_var_bytes(MAX_CONTRACT_CODE_SIZE)?.to_vec();
        let need_storage = reader.read_bool()?;
        let name = reader.read_var_bytes(MAX_CONTRACT_FIELD_SIZE)?.to_vec();
        let version = reader.read_var_bytes(MAX_CONTRACT_FIELD_SIZE)?.to_vec();
        let author = reader.read_var_bytes(MAX_CONTRACT_FIELD_SIZE)?.to_vec();
        let email = reader.read_var_bytes(MAX_CONTRACT_FIELD_SIZE)?.to_vec();
        let description = reader.read_var_bytes(MAX_CONTRACT_DESC_SIZE)?.to_vec();
        if reader.remaining() != 0 {
            return Err(ServiceError::Decode(format!(
                "{} trailing bytes after contract record",
                reader.remaining()
            )));
        }
        Ok(Self {
            code,
            need_storage,
            name,
            version,
            author,
            email,
            description,
        })
    }
}

impl InteropInterface for DeployCode {
    fn interface_type(&self) -> &str {
        "DeployCode"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.address().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DeployCode {
        DeployCode {
            code: vec![0x51, 0x52, 0x93],
            need_storage: true,
            name: b"counter".to_vec(),
            version: b"1.0".to_vec(),
            author: b"dev".to_vec(),
            email: b"dev@example.org".to_vec(),
            description: b"increments a counter".to_vec(),
        }
    }

    #[test]
    fn test_record_decodes_to_same_contract() {
        let contract = sample();
        let bytes = contract.to_bytes().expect("encode should succeed");
        let decoded = DeployCode::from_bytes(&bytes).expect("decode should succeed");
        assert_eq!(decoded, contract);
        assert_eq!(decoded.address(), hash160(&[0x51, 0x52, 0x93]));
    }

    #[test]
    fn test_metadata_is_not_required_to_be_utf8() {
        let mut contract = sample();
        contract.author = vec![0xff, 0xfe, 0x00];
        contract.validate().expect("raw metadata should pass");
        let bytes = contract.to_bytes().expect("encode should succeed");
        let decoded = DeployCode::from_bytes(&bytes).expect("decode should succeed");
        assert_eq!(decoded.author, vec![0xff, 0xfe, 0x00]);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = sample().to_bytes().expect("encode should succeed");
        bytes.push(0);
        assert!(matches!(
            DeployCode::from_bytes(&bytes),
            Err(ServiceError::Decode(_))
        ));
    }

    #[test]
    fn test_field_limits() {
        let mut contract = sample();
        contract.name = vec![b'n'; MAX_CONTRACT_FIELD_SIZE + 1];
        assert!(contract.validate().is_err());
        let mut contract = sample();
        contract.description = vec![b'd'; MAX_CONTRACT_DESC_SIZE];
        contract.validate().expect("description at the limit should pass");
    }
}
