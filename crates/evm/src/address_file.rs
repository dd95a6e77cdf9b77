// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Deployed contract addresses are kept as a bare hex string in a flat file.

use alloy::primitives::Address;
use anyhow::{Context, Result};
use ctk_config::validation::parse_address;
use std::{fs, path::Path};
use tracing::info;

pub fn write_address(path: impl AsRef<Path>, address: Address) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, address.to_checksum(None))
        .with_context(|| format!("Could not write contract address to {}", path.display()))?;
    info!("Contract address written to {}", path.display());
    Ok(())
}

pub fn read_address(path: impl AsRef<Path>) -> Result<Address> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Could not read contract address from {}", path.display()))?;
    parse_address(&contents)
        .with_context(|| format!("{} does not hold a contract address", path.display()))
}
