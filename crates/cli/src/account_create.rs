// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use ctk_crypto::{create_wallet, CredentialChain};
use std::path::Path;

pub async fn execute(key_file: &Path, credentials: &CredentialChain) -> Result<()> {
    let wallet = create_wallet(key_file, credentials).await?;
    println!("Account saved to file: {}", key_file.display());
    println!("Address: {}", wallet.address());

    Ok(())
}
