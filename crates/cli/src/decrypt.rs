// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::backend::Backend;
use anyhow::Result;
use ctk_config::Network;
use ctk_crypto::{load_wallet, CredentialChain};
use ctk_evm::address_file::read_address;
use ctk_fhevm::{public_decrypt, setup_user_decrypt};
use std::path::Path;
use tracing::{info, instrument};

#[instrument(skip_all)]
pub async fn user_decrypt_counter(
    network: Network,
    config_file: &Path,
    key_file: &Path,
    address_file: &Path,
    credentials: &CredentialChain,
) -> Result<()> {
    info!("Loading wallet");
    let wallet = load_wallet(key_file, credentials).await?;
    info!("Loading contract address");
    let contract_address = read_address(address_file)?;
    let backend = Backend::load(network, config_file)?;
    let fhevm = backend.fhevm().await?;

    let counter = backend.counter(contract_address, &wallet).await?;
    info!("Calling getCount on contract to get ciphertext handle");
    let handle = counter.get_count().await?;
    if handle.is_zero() {
        println!("Decrypted count: 0 (counter was never written)");
        return Ok(());
    }

    info!("Requesting decryption...");
    let count = setup_user_decrypt(fhevm.as_ref(), &wallet, handle, contract_address).await?;
    println!("Decrypted count: {count}");

    Ok(())
}

#[instrument(skip_all)]
pub async fn public_decrypt_simple_value(
    network: Network,
    config_file: &Path,
    address_file: &Path,
) -> Result<()> {
    info!("Loading contract address");
    let contract_address = read_address(address_file)?;
    let backend = Backend::load(network, config_file)?;
    let fhevm = backend.fhevm().await?;

    let store = backend.store(contract_address, None).await?;
    info!("Getting ciphertext handle");
    let handles = [store.encrypted_simple_value().await?];

    info!("Requesting decryption...");
    let result = public_decrypt(fhevm.as_ref(), &handles).await?;
    println!("Result:");
    for handle in &handles {
        if let Some(value) = result.get(handle) {
            println!("{handle} {value}");
        }
    }

    Ok(())
}
