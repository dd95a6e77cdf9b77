// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use ctk_crypto::{import_wallet, private_key_from_env, CredentialChain};
use std::path::Path;

/// Encrypt the key found in PRIVATE_KEY into `key_file`
pub async fn execute(key_file: &Path, credentials: &CredentialChain) -> Result<()> {
    let private_key = private_key_from_env(key_file)?;
    let wallet = import_wallet(key_file, private_key, credentials).await?;
    println!("Account saved to file: {}", key_file.display());
    println!("Address: {}", wallet.address());

    Ok(())
}
