// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    error::FhevmError,
    instance::{FhevmInstance, UserDecryptRequest},
    types::{ClearValue, Handle, HandleContractPair},
};
use alloy::{
    hex,
    primitives::{Address, U256},
    signers::Signer,
};
use std::collections::HashMap;
use tracing::info;

/// How long a user decryption authorization stays valid
pub const USER_DECRYPT_DURATION_DAYS: u64 = 10;

/// Decrypt a single handle for the owner of `signer`.
///
/// A fresh keypair is generated for every call and the wallet signs an EIP-712 authorization
/// over it that covers `contract_address` only.
pub async fn setup_user_decrypt<S>(
    instance: &dyn FhevmInstance,
    signer: &S,
    handle: Handle,
    contract_address: Address,
) -> Result<ClearValue, FhevmError>
where
    S: Signer + ?Sized,
{
    info!("Generating keypair for user decryption");
    let keypair = instance.generate_keypair()?;

    let handle_contract_pairs = vec![HandleContractPair {
        handle,
        contract_address,
    }];
    let start_timestamp = u64::try_from(chrono::Utc::now().timestamp())
        .map_err(|_| FhevmError::InvalidRequest("system clock is before the epoch".into()))?;
    let contract_addresses = vec![contract_address];

    info!("Creating EIP-712 document");
    let eip712 = instance.create_eip712(
        &keypair.public_key,
        &contract_addresses,
        start_timestamp,
        USER_DECRYPT_DURATION_DAYS,
    )?;

    info!("Signing decryption request");
    let signature = signer.sign_hash(&eip712.signing_hash()).await?;
    // the relayer expects the signature without its 0x prefix
    let signature = hex::encode(signature.as_bytes());

    info!("Requesting user decryption");
    let mut results = instance
        .user_decrypt(UserDecryptRequest {
            handle_contract_pairs,
            keypair,
            signature,
            contract_addresses,
            user_address: signer.address(),
            start_timestamp,
            duration_days: USER_DECRYPT_DURATION_DAYS,
        })
        .await?;

    results
        .remove(&handle)
        .ok_or(FhevmError::MissingResult(handle))
}

/// Decrypt handles that their contract marked as publicly decryptable.
pub async fn public_decrypt(
    instance: &dyn FhevmInstance,
    handles: &[Handle],
) -> Result<HashMap<Handle, ClearValue>, FhevmError> {
    if handles.is_empty() {
        return Err(FhevmError::InvalidRequest(
            "at least one handle is required".into(),
        ));
    }
    info!("Requesting public decryption of {} handle(s)", handles.len());
    let results = instance.public_decrypt(handles).await?;
    if let Some(missing) = handles.iter().find(|h| !results.contains_key(*h)) {
        return Err(FhevmError::MissingResult(*missing));
    }
    Ok(results)
}

/// Decode one 32 byte ABI word per handle, typed by the handle's FHE type
pub fn decode_clear_words(handles: &[Handle], data: &[u8]) -> Result<Vec<ClearValue>, FhevmError> {
    if data.len() < handles.len() * 32 {
        return Err(FhevmError::InvalidRequest(format!(
            "expected {} decrypted words, got {} bytes",
            handles.len(),
            data.len()
        )));
    }
    handles
        .iter()
        .zip(data.chunks_exact(32))
        .map(|(handle, word)| Ok(ClearValue::from_word(handle.fhe_type()?, U256::from_be_slice(word))))
        .collect()
}
