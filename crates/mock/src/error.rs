// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::Address;
use ctk_fhevm::{FheType, FhevmError, Handle};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MockError {
    #[error("Handle {0} is not known to the coprocessor")]
    UnknownHandle(Handle),

    #[error("{account} is not allowed to use handle {handle}")]
    NotAllowed { handle: Handle, account: Address },

    #[error("Handle {0} is not publicly decryptable")]
    NotPublic(Handle),

    #[error("Input proof rejected: {0}")]
    InvalidProof(String),

    #[error("Operands have different types: {left} and {right}")]
    TypeMismatch { left: FheType, right: FheType },

    #[error("Expected an {expected} handle, got {found}")]
    UnexpectedType { expected: FheType, found: FheType },

    #[error("No contract deployed at {0} on the in-process mock network")]
    NoContract(Address),

    #[error("{0}")]
    Reverted(String),

    #[error(transparent)]
    Fhevm(#[from] FhevmError),
}

impl From<MockError> for FhevmError {
    fn from(value: MockError) -> Self {
        match value {
            MockError::Fhevm(e) => e,
            MockError::InvalidProof(msg) => FhevmError::InvalidInputProof(msg),
            MockError::UnknownHandle(handle) => FhevmError::InvalidHandle(handle.to_string()),
            e @ (MockError::NotAllowed { .. } | MockError::NotPublic(_)) => {
                FhevmError::Denied(e.to_string())
            }
            e => FhevmError::InvalidRequest(e.to_string()),
        }
    }
}
