//! Hashing and signature verification used by the crypto opcodes and by
//! script hash computation.

use p256::ecdsa::signature::Verifier;
use p256::ecdsa::{Signature, VerifyingKey};
use ripemd::Ripemd160;
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Computes SHA-1 hash of the input data.
pub fn sha1(data: &[u8]) -> [u8; 20] {
    Sha1::digest(data).into()
}

/// Computes SHA-256 hash of the input data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Computes RIPEMD-160 of SHA-256, the script hash function.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(sha256(data)).into()
}

/// Computes double SHA-256.
pub fn hash256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Crypto capability consumed by the engine.
pub trait Crypto {
    fn sha1(&self, data: &[u8]) -> [u8; 20] {
        sha1(data)
    }

    fn sha256(&self, data: &[u8]) -> [u8; 32] {
        sha256(data)
    }

    fn hash160(&self, data: &[u8]) -> [u8; 20] {
        hash160(data)
    }

    fn hash256(&self, data: &[u8]) -> [u8; 32] {
        hash256(data)
    }

    /// Returns false for malformed keys or signatures as well as for
    /// signatures that do not match.
    fn verify_signature(&self, message: &[u8], signature: &[u8], public_key: &[u8]) -> bool;
}

/// secp256r1 verification with 64-byte `r || s` signatures and SEC1 keys.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultCrypto;

impl Crypto for DefaultCrypto {
    fn verify_signature(&self, message: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
        let key = match VerifyingKey::from_sec1_bytes(public_key) {
            Ok(key) => key,
            Err(_) => return false,
        };
        let signature = match Signature::from_slice(signature) {
            Ok(sig) => sig,
            Err(_) => match Signature::from_der(signature) {
                Ok(sig) => sig,
                Err(_) => return false,
            },
        };
        key.verify(message, &signature).is_ok()
    }
}
