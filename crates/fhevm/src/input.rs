// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    buffer::Buffer,
    error::FhevmError,
    types::{FheType, Handle, TypedValue},
};
use alloy::primitives::{keccak256, Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::debug;

/// Total plaintext bits a single encrypted input may carry
pub const MAX_INPUT_BITS: u32 = 2048;
/// Number of values a single encrypted input may carry
pub const MAX_INPUT_VALUES: usize = 256;

const SIGNATURE_LEN: usize = 65;
const HANDLE_DOMAIN: &[u8] = b"ZK-w_hdl";

/// Collects plaintexts bound to one `(contract, user)` pair ahead of encryption.
#[derive(Debug, Clone)]
pub struct EncryptedInputBuilder {
    contract_address: Address,
    user_address: Address,
    values: Vec<TypedValue>,
}

impl EncryptedInputBuilder {
    pub fn new(contract_address: Address, user_address: Address) -> Self {
        Self {
            contract_address,
            user_address,
            values: Vec::new(),
        }
    }

    pub fn add(&mut self, ty: FheType, value: U256) -> Result<&mut Self, FhevmError> {
        if value > ty.max_value() {
            return Err(FhevmError::ValueOutOfRange { ty, value });
        }
        if self.values.len() >= MAX_INPUT_VALUES {
            return Err(FhevmError::TooManyValues {
                limit: MAX_INPUT_VALUES,
            });
        }
        let requested = self.total_bits() + ty.budget_bits();
        if requested > MAX_INPUT_BITS {
            return Err(FhevmError::TooManyBits {
                requested,
                limit: MAX_INPUT_BITS,
            });
        }
        self.values.push(TypedValue { ty, value });
        Ok(self)
    }

    pub fn add_bool(&mut self, value: bool) -> Result<&mut Self, FhevmError> {
        self.add(FheType::Bool, U256::from(value as u8))
    }

    pub fn add8(&mut self, value: u64) -> Result<&mut Self, FhevmError> {
        self.add(FheType::Uint8, U256::from(value))
    }

    pub fn add16(&mut self, value: u64) -> Result<&mut Self, FhevmError> {
        self.add(FheType::Uint16, U256::from(value))
    }

    pub fn add32(&mut self, value: u64) -> Result<&mut Self, FhevmError> {
        self.add(FheType::Uint32, U256::from(value))
    }

    pub fn add64(&mut self, value: u64) -> Result<&mut Self, FhevmError> {
        self.add(FheType::Uint64, U256::from(value))
    }

    pub fn add128(&mut self, value: u128) -> Result<&mut Self, FhevmError> {
        self.add(FheType::Uint128, U256::from(value))
    }

    pub fn add256(&mut self, value: U256) -> Result<&mut Self, FhevmError> {
        self.add(FheType::Uint256, value)
    }

    pub fn add_address(&mut self, value: Address) -> Result<&mut Self, FhevmError> {
        self.add(
            FheType::Address,
            U256::from_be_slice(value.into_word().as_slice()),
        )
    }

    pub fn values(&self) -> &[TypedValue] {
        &self.values
    }

    pub fn types(&self) -> Vec<FheType> {
        self.values.iter().map(|v| v.ty).collect()
    }

    pub fn total_bits(&self) -> u32 {
        self.values.iter().map(|v| v.ty.budget_bits()).sum()
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    pub fn user_address(&self) -> Address {
        self.user_address
    }
}

/// Derive the handles of the values packed into `ciphertext`.
pub fn derive_input_handles(
    ciphertext: &[u8],
    types: &[FheType],
    acl: Address,
    chain_id: u64,
) -> Vec<Handle> {
    let blob_hash = keccak256(ciphertext);
    types
        .iter()
        .enumerate()
        .map(|(index, ty)| {
            let mut preimage = Vec::with_capacity(HANDLE_DOMAIN.len() + 32 + 1 + 20 + 32);
            preimage.extend_from_slice(HANDLE_DOMAIN);
            preimage.extend_from_slice(blob_hash.as_slice());
            preimage.push(index as u8);
            preimage.extend_from_slice(acl.as_slice());
            preimage.extend_from_slice(&U256::from(chain_id).to_be_bytes::<32>());
            Handle::compose(keccak256(&preimage), index as u8, chain_id, *ty)
        })
        .collect()
}

/// Decoded input proof: `[n_handles][n_signers][handles][signatures][extra_data]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputProof {
    pub handles: Vec<Handle>,
    pub signatures: Vec<Bytes>,
    pub extra_data: Bytes,
}

impl InputProof {
    pub fn encode(&self) -> Result<Bytes, FhevmError> {
        let n_handles = u8::try_from(self.handles.len())
            .map_err(|_| FhevmError::InvalidInputProof("too many handles".into()))?;
        let n_signers = u8::try_from(self.signatures.len())
            .map_err(|_| FhevmError::InvalidInputProof("too many signatures".into()))?;

        let mut out = Vec::with_capacity(
            2 + 32 * self.handles.len()
                + SIGNATURE_LEN * self.signatures.len()
                + self.extra_data.len(),
        );
        out.push(n_handles);
        out.push(n_signers);
        for handle in &self.handles {
            out.extend_from_slice(handle.as_slice());
        }
        for signature in &self.signatures {
            if signature.len() != SIGNATURE_LEN {
                return Err(FhevmError::InvalidInputProof(format!(
                    "signature must be {SIGNATURE_LEN} bytes, got {}",
                    signature.len()
                )));
            }
            out.extend_from_slice(signature);
        }
        out.extend_from_slice(&self.extra_data);
        Ok(out.into())
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, FhevmError> {
        let [n_handles, n_signers, rest @ ..] = bytes else {
            return Err(FhevmError::InvalidInputProof("proof is too short".into()));
        };
        let (n_handles, n_signers) = (*n_handles as usize, *n_signers as usize);
        let needed = 32 * n_handles + SIGNATURE_LEN * n_signers;
        if rest.len() < needed {
            return Err(FhevmError::InvalidInputProof(format!(
                "expected at least {} bytes, got {}",
                needed + 2,
                bytes.len()
            )));
        }

        let (handle_bytes, rest) = rest.split_at(32 * n_handles);
        let (signature_bytes, extra_data) = rest.split_at(SIGNATURE_LEN * n_signers);
        let handles = handle_bytes
            .chunks_exact(32)
            .map(Handle::from_slice)
            .collect::<Result<Vec<_>, _>>()?;
        let signatures = signature_bytes
            .chunks_exact(SIGNATURE_LEN)
            .map(Bytes::copy_from_slice)
            .collect();

        Ok(Self {
            handles,
            signatures,
            extra_data: Bytes::copy_from_slice(extra_data),
        })
    }
}

/// The output of encryption: one handle per value plus the proof the contract verifies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EncryptedInputJson", into = "EncryptedInputJson")]
pub struct EncryptedInput {
    pub handles: Vec<Handle>,
    pub input_proof: Bytes,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EncryptedInputJson {
    handles: Vec<Buffer>,
    input_proof: Buffer,
}

impl TryFrom<EncryptedInputJson> for EncryptedInput {
    type Error = FhevmError;

    fn try_from(value: EncryptedInputJson) -> Result<Self, Self::Error> {
        let handles = value
            .handles
            .iter()
            .map(|b| Handle::from_slice(b))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            handles,
            input_proof: value.input_proof.into_inner().into(),
        })
    }
}

impl From<EncryptedInput> for EncryptedInputJson {
    fn from(value: EncryptedInput) -> Self {
        Self {
            handles: value
                .handles
                .iter()
                .map(|h| Buffer::from(h.as_slice()))
                .collect(),
            input_proof: Buffer::new(value.input_proof.to_vec()),
        }
    }
}

impl EncryptedInput {
    pub fn to_json(&self) -> Result<String, FhevmError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, FhevmError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), FhevmError> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?).map_err(|source| FhevmError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Encrypted input written to {}", path.display());
        Ok(())
    }

    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, FhevmError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| FhevmError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn handle(&self, index: usize) -> Result<Handle, FhevmError> {
        self.handles.get(index).copied().ok_or_else(|| {
            FhevmError::InvalidRequest(format!(
                "encrypted input has {} handles, index {index} requested",
                self.handles.len()
            ))
        })
    }
}
