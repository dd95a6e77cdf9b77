// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::error::FhevmError;
use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use zeroize::Zeroizing;

/// Version byte written into every handle
pub const HANDLE_VERSION: u8 = 0;

/// Index byte used for handles produced by computation rather than user input
pub const COMPUTED_HANDLE_INDEX: u8 = 0xff;

/// Encrypted types supported by the FHE coprocessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FheType {
    Bool,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uint128,
    Address,
    Uint256,
}

impl FheType {
    pub fn id(&self) -> u8 {
        match self {
            FheType::Bool => 0,
            FheType::Uint8 => 2,
            FheType::Uint16 => 3,
            FheType::Uint32 => 4,
            FheType::Uint64 => 5,
            FheType::Uint128 => 6,
            FheType::Address => 7,
            FheType::Uint256 => 8,
        }
    }

    pub fn from_id(id: u8) -> Result<Self, FhevmError> {
        Ok(match id {
            0 => FheType::Bool,
            2 => FheType::Uint8,
            3 => FheType::Uint16,
            4 => FheType::Uint32,
            5 => FheType::Uint64,
            6 => FheType::Uint128,
            7 => FheType::Address,
            8 => FheType::Uint256,
            other => return Err(FhevmError::UnknownFheType(other)),
        })
    }

    /// Width of the plaintext
    pub fn bits(&self) -> u32 {
        match self {
            FheType::Bool => 1,
            FheType::Uint8 => 8,
            FheType::Uint16 => 16,
            FheType::Uint32 => 32,
            FheType::Uint64 => 64,
            FheType::Uint128 => 128,
            FheType::Address => 160,
            FheType::Uint256 => 256,
        }
    }

    /// Bits counted against the encrypted input budget. Booleans are packed as two bits.
    pub fn budget_bits(&self) -> u32 {
        match self {
            FheType::Bool => 2,
            other => other.bits(),
        }
    }

    pub fn max_value(&self) -> U256 {
        match self.bits() {
            256 => U256::MAX,
            bits => (U256::from(1u8) << bits as usize) - U256::from(1u8),
        }
    }

    /// Reduce a value modulo the width of this type
    pub fn truncate(&self, value: U256) -> U256 {
        value & self.max_value()
    }

    pub fn name(&self) -> &'static str {
        match self {
            FheType::Bool => "ebool",
            FheType::Uint8 => "euint8",
            FheType::Uint16 => "euint16",
            FheType::Uint32 => "euint32",
            FheType::Uint64 => "euint64",
            FheType::Uint128 => "euint128",
            FheType::Address => "eaddress",
            FheType::Uint256 => "euint256",
        }
    }
}

impl fmt::Display for FheType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An opaque on-chain reference to a ciphertext.
///
/// Layout: `[0..21]` hash prefix, `[21]` input index, `[22..30]` chain id (big endian),
/// `[30]` FHE type id, `[31]` handle version.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Handle(B256);

impl Handle {
    pub const ZERO: Handle = Handle(B256::ZERO);

    pub fn new(bytes: B256) -> Self {
        Self(bytes)
    }

    /// Build a handle from the first 21 bytes of `hash` and the handle metadata
    pub fn compose(hash: B256, index: u8, chain_id: u64, ty: FheType) -> Self {
        let mut bytes = [0u8; 32];
        bytes[..21].copy_from_slice(&hash[..21]);
        bytes[21] = index;
        bytes[22..30].copy_from_slice(&chain_id.to_be_bytes());
        bytes[30] = ty.id();
        bytes[31] = HANDLE_VERSION;
        Self(B256::from(bytes))
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, FhevmError> {
        if bytes.len() != 32 {
            return Err(FhevmError::InvalidHandle(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self(B256::from_slice(bytes)))
    }

    pub fn fhe_type(&self) -> Result<FheType, FhevmError> {
        FheType::from_id(self.0[30])
    }

    pub fn index(&self) -> u8 {
        self.0[21]
    }

    pub fn chain_id(&self) -> u64 {
        let mut id = [0u8; 8];
        id.copy_from_slice(&self.0[22..30]);
        u64::from_be_bytes(id)
    }

    pub fn is_computed(&self) -> bool {
        self.index() == COMPUTED_HANDLE_INDEX
    }

    /// An uninitialized encrypted variable reads back as the zero handle
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn as_b256(&self) -> B256 {
        self.0
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl From<B256> for Handle {
    fn from(value: B256) -> Self {
        Self(value)
    }
}

impl From<Handle> for B256 {
    fn from(value: Handle) -> Self {
        value.0
    }
}

impl FromStr for Handle {
    type Err = FhevmError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = alloy::hex::decode(s.trim())
            .map_err(|e| FhevmError::InvalidHandle(format!("{s}: {e}")))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A plaintext value of an encrypted type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClearValue {
    Bool(bool),
    Uint(U256),
    Address(Address),
}

impl ClearValue {
    /// Interpret a 32 byte word the way the given type is ABI encoded
    pub fn from_word(ty: FheType, word: U256) -> Self {
        match ty {
            FheType::Bool => ClearValue::Bool(!word.is_zero()),
            FheType::Address => {
                ClearValue::Address(Address::from_word(B256::from(word.to_be_bytes::<32>())))
            }
            other => ClearValue::Uint(other.truncate(word)),
        }
    }

    pub fn to_word(&self) -> U256 {
        match self {
            ClearValue::Bool(b) => U256::from(*b as u8),
            ClearValue::Uint(v) => *v,
            ClearValue::Address(a) => U256::from_be_slice(a.into_word().as_slice()),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ClearValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ClearValue::Uint(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for ClearValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClearValue::Bool(b) => write!(f, "{b}"),
            ClearValue::Uint(v) => write!(f, "{v}"),
            ClearValue::Address(a) => write!(f, "{a}"),
        }
    }
}

impl From<bool> for ClearValue {
    fn from(value: bool) -> Self {
        ClearValue::Bool(value)
    }
}

impl From<u64> for ClearValue {
    fn from(value: u64) -> Self {
        ClearValue::Uint(U256::from(value))
    }
}

impl From<U256> for ClearValue {
    fn from(value: U256) -> Self {
        ClearValue::Uint(value)
    }
}

impl From<Address> for ClearValue {
    fn from(value: Address) -> Self {
        ClearValue::Address(value)
    }
}

/// A plaintext queued for encryption together with the type it is encrypted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedValue {
    pub ty: FheType,
    pub value: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleContractPair {
    pub handle: Handle,
    pub contract_address: Address,
}

/// Ephemeral keypair used to receive a user decryption.
#[derive(Clone)]
pub struct Keypair {
    pub public_key: Bytes,
    pub private_key: Zeroizing<Vec<u8>>,
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}
