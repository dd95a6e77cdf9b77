// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::backend::Backend;
use alloy::primitives::utils::format_ether;
use anyhow::Result;
use ctk_config::Network;
use ctk_crypto::{load_wallet, CredentialChain};
use ctk_evm::ensure_minimum_balance;
use std::path::Path;
use tracing::info;

pub async fn execute(
    network: Network,
    config_file: &Path,
    key_file: &Path,
    credentials: &CredentialChain,
) -> Result<()> {
    info!("Loading wallet");
    let wallet = load_wallet(key_file, credentials).await?;
    let backend = Backend::load(network, config_file)?;

    let balance = backend.balance(wallet.address()).await?;
    println!("Balance: {} ETH", format_ether(balance));
    ensure_minimum_balance(wallet.address(), balance)?;

    Ok(())
}
