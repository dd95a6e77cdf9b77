// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::prompt::wait_for_enter;
use alloy::hex;
use anyhow::Result;
use ctk_crypto::{load_wallet, CredentialChain};
use std::path::Path;
use zeroize::Zeroizing;

pub async fn address(key_file: &Path, credentials: &CredentialChain) -> Result<()> {
    let wallet = load_wallet(key_file, credentials).await?;
    println!("Address: {}", wallet.address());

    Ok(())
}

pub async fn private_key(key_file: &Path, credentials: &CredentialChain) -> Result<()> {
    let wallet = load_wallet(key_file, credentials).await?;
    wait_for_enter(
        "Continuing will print your private key to the terminal (Enter to continue, Ctrl+C to exit)",
    )?;
    let key = Zeroizing::new(hex::encode_prefixed(wallet.to_bytes()));
    println!("Private key: {}", key.as_str());

    Ok(())
}
