// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::types::{FheType, Handle};
use alloy::primitives::U256;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FhevmError {
    #[error("Unknown FHE type id {0}")]
    UnknownFheType(u8),

    #[error("Value {value} does not fit in {ty}")]
    ValueOutOfRange { ty: FheType, value: U256 },

    #[error("Encrypted input would use {requested} bits, the limit is {limit}")]
    TooManyBits { requested: u32, limit: u32 },

    #[error("Encrypted input is limited to {limit} values")]
    TooManyValues { limit: usize },

    #[error("Encrypted input has no values")]
    EmptyInput,

    #[error("Invalid buffer: {0}")]
    InvalidBuffer(String),

    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    #[error("Invalid input proof: {0}")]
    InvalidInputProof(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Decryption not permitted: {0}")]
    Denied(String),

    #[error("No decrypted value returned for handle {0}")]
    MissingResult(Handle),

    #[error("Could not sign request: {0}")]
    Signing(#[from] alloy::signers::Error),

    #[error("Relayer responded with status {status}: {body}")]
    Relayer { status: u16, body: String },

    #[error("Relayer request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Could not access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
