// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    decrypt::decode_clear_words,
    error::FhevmError,
    types::{ClearValue, FheType, Handle, Keypair, TypedValue},
};
use alloy::{
    hex,
    primitives::{keccak256, Address, Bytes, U256},
};
use rand::RngCore;
use serde_json::Value;
use zeroize::Zeroizing;

const SALT_LEN: usize = 32;

/// Everything an engine needs to bind a ciphertext to its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptionContext {
    pub contract_address: Address,
    pub user_address: Address,
    pub acl_contract_address: Address,
    pub chain_id: u64,
}

/// The cryptographic half of an FHE client: ciphertext packing and reconstruction of user
/// decryption shares.
pub trait FheEngine: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether `encrypt_inputs` yields real ciphertexts that may leave the process
    fn produces_ciphertext(&self) -> bool;

    fn encrypt_inputs(
        &self,
        values: &[TypedValue],
        context: &EncryptionContext,
    ) -> Result<Bytes, FhevmError>;

    fn generate_keypair(&self) -> Result<Keypair, FhevmError>;

    /// Turn the shares returned for a user decryption into one clear value per handle
    fn reconstruct_user_decrypt(
        &self,
        keypair: &Keypair,
        handles: &[Handle],
        shares: &Value,
    ) -> Result<Vec<ClearValue>, FhevmError>;
}

/// Engine speaking the plaintext format of the mocked coprocessor. Its output is not a
/// ciphertext, so a relayer instance refuses to send it.
///
/// A packed input is `[count][32 byte salt]` followed by `[type id][32 byte big endian value]`
/// per value. The salt is fresh per input so equal plaintexts never share handles.
/// Keypairs are a random 32 byte secret with `keccak256(secret)` as public key. Decryption
/// shares carry the plaintext words directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleartextEngine;

impl CleartextEngine {
    pub fn pack(values: &[TypedValue]) -> Result<Bytes, FhevmError> {
        let count = u8::try_from(values.len()).map_err(|_| FhevmError::TooManyValues {
            limit: u8::MAX as usize,
        })?;
        let mut out = Vec::with_capacity(1 + SALT_LEN + values.len() * 33);
        out.push(count);
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        out.extend_from_slice(&salt);
        for value in values {
            out.push(value.ty.id());
            out.extend_from_slice(&value.value.to_be_bytes::<32>());
        }
        Ok(out.into())
    }

    pub fn unpack(bytes: &[u8]) -> Result<Vec<TypedValue>, FhevmError> {
        let (count, rest) = bytes
            .split_first()
            .ok_or_else(|| FhevmError::Engine("empty ciphertext".into()))?;
        let expected = SALT_LEN + *count as usize * 33;
        if rest.len() != expected {
            return Err(FhevmError::Engine(format!(
                "ciphertext of {} values must be {} bytes, got {}",
                count,
                1 + expected,
                bytes.len()
            )));
        }
        rest[SALT_LEN..]
            .chunks_exact(33)
            .map(|chunk| {
                let ty = FheType::from_id(chunk[0])?;
                let value = U256::from_be_slice(&chunk[1..]);
                if value > ty.max_value() {
                    return Err(FhevmError::ValueOutOfRange { ty, value });
                }
                Ok(TypedValue { ty, value })
            })
            .collect()
    }

    pub fn keypair_matches(keypair: &Keypair) -> bool {
        keccak256(keypair.private_key.as_slice()).as_slice() == keypair.public_key.as_ref()
    }
}

impl FheEngine for CleartextEngine {
    fn name(&self) -> &'static str {
        "cleartext"
    }

    fn produces_ciphertext(&self) -> bool {
        false
    }

    fn encrypt_inputs(
        &self,
        values: &[TypedValue],
        _context: &EncryptionContext,
    ) -> Result<Bytes, FhevmError> {
        Self::pack(values)
    }

    fn generate_keypair(&self) -> Result<Keypair, FhevmError> {
        let mut private_key = Zeroizing::new(vec![0u8; 32]);
        rand::thread_rng().fill_bytes(private_key.as_mut_slice());
        let public_key = Bytes::copy_from_slice(keccak256(private_key.as_slice()).as_slice());
        Ok(Keypair {
            public_key,
            private_key,
        })
    }

    fn reconstruct_user_decrypt(
        &self,
        keypair: &Keypair,
        handles: &[Handle],
        shares: &Value,
    ) -> Result<Vec<ClearValue>, FhevmError> {
        if !Self::keypair_matches(keypair) {
            return Err(FhevmError::Engine("keypair does not match".into()));
        }
        let share = shares
            .as_array()
            .and_then(|s| s.first())
            .ok_or_else(|| FhevmError::Engine("no decryption shares returned".into()))?;
        let payload = share
            .get("payload")
            .or_else(|| share.get("decrypted_value"))
            .and_then(Value::as_str)
            .ok_or_else(|| FhevmError::Engine("share has no payload".into()))?;
        let words = hex::decode(payload).map_err(|e| FhevmError::Engine(e.to_string()))?;
        decode_clear_words(handles, &words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pack_unpack() -> Result<(), FhevmError> {
        let values = vec![
            TypedValue {
                ty: FheType::Uint8,
                value: U256::from(4u8),
            },
            TypedValue {
                ty: FheType::Bool,
                value: U256::from(1u8),
            },
        ];
        let packed = CleartextEngine::pack(&values)?;
        assert_eq!(packed.len(), 1 + SALT_LEN + 2 * 33);
        assert_eq!(packed[0], 2);
        assert_eq!(packed[1 + SALT_LEN], FheType::Uint8.id());
        assert_eq!(CleartextEngine::unpack(&packed)?, values);

        assert!(CleartextEngine::unpack(&packed[..40]).is_err());
        assert!(CleartextEngine::unpack(&[]).is_err());
        Ok(())
    }

    #[test]
    fn test_equal_values_pack_differently() -> Result<(), FhevmError> {
        let values = [TypedValue {
            ty: FheType::Uint32,
            value: U256::from(7u8),
        }];
        let first = CleartextEngine::pack(&values)?;
        let second = CleartextEngine::pack(&values)?;
        assert_ne!(first, second);
        assert_eq!(CleartextEngine::unpack(&first)?, CleartextEngine::unpack(&second)?);
        assert!(!CleartextEngine.produces_ciphertext());
        Ok(())
    }

    #[test]
    fn test_keypair() -> Result<(), FhevmError> {
        let engine = CleartextEngine;
        let keypair = engine.generate_keypair()?;
        assert_eq!(keypair.public_key.len(), 32);
        assert!(CleartextEngine::keypair_matches(&keypair));
        assert_ne!(engine.generate_keypair()?.public_key, keypair.public_key);
        Ok(())
    }

    #[test]
    fn test_reconstruct_from_payload() -> Result<(), FhevmError> {
        let engine = CleartextEngine;
        let keypair = engine.generate_keypair()?;
        let handle = Handle::compose(keccak256(b"h"), 0, 1, FheType::Uint32);
        let word = hex::encode_prefixed(U256::from(42u8).to_be_bytes::<32>());

        let values = engine.reconstruct_user_decrypt(
            &keypair,
            &[handle],
            &json!([{"payload": word, "signature": "00"}]),
        )?;
        assert_eq!(values, vec![ClearValue::from(42u64)]);

        let stranger = engine.generate_keypair()?;
        let mismatched = Keypair {
            public_key: stranger.public_key,
            private_key: keypair.private_key.clone(),
        };
        assert!(engine
            .reconstruct_user_decrypt(&mismatched, &[handle], &json!([{"payload": word}]))
            .is_err());
        Ok(())
    }
}
