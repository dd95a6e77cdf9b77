// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::EthProvider;
use alloy::{
    primitives::{utils::format_ether, Address, U256},
    providers::Provider,
};
use anyhow::{bail, Result};
use tracing::info;

/// Balance an account needs before it is worth sending transactions: 10 gwei
pub const MIN_BALANCE: U256 = U256::from_limbs([10_000_000_000, 0, 0, 0]);

pub async fn get_balance<P: Provider + Clone>(
    provider: &EthProvider<P>,
    address: Address,
) -> Result<U256> {
    info!("Getting balance for {address}");
    Ok(provider.provider().get_balance(address).await?)
}

pub fn ensure_minimum_balance(address: Address, balance: U256) -> Result<()> {
    if balance < MIN_BALANCE {
        bail!(
            "Insufficient balance: {} holds {} ETH, at least {} ETH is required",
            address,
            format_ether(balance),
            format_ether(MIN_BALANCE)
        );
    }
    Ok(())
}

/// Fetch the balance of `address` and fail if it is below [`MIN_BALANCE`]
pub async fn check_minimum_balance<P: Provider + Clone>(
    provider: &EthProvider<P>,
    address: Address,
) -> Result<U256> {
    let balance = get_balance(provider, address).await?;
    ensure_minimum_balance(address, balance)?;
    Ok(balance)
}
