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
use std::path::PathBuf;
use tracing::{info, instrument};

/// A value to encrypt, typed the way the receiving contract expects it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plaintext {
    Uint8(u8),
    Uint32(u32),
}

#[derive(Debug)]
pub struct EncryptTask {
    pub network: Network,
    pub config_file: PathBuf,
    pub key_file: PathBuf,
    pub address_file: PathBuf,
    pub input_file: PathBuf,
}

impl EncryptTask {
    /// Encrypt `plaintext` for the contract in the address file and the wallet owner, then
    /// write the handle and input proof to the input file.
    #[instrument(skip_all, fields(plaintext = ?plaintext))]
    pub async fn execute(self, plaintext: Plaintext, credentials: &CredentialChain) -> Result<()> {
        info!("Loading wallet");
        let wallet = load_wallet(&self.key_file, credentials).await?;
        info!("Loading contract address");
        let contract_address = read_address(&self.address_file)?;
        let backend = Backend::load(self.network, &self.config_file)?;
        let fhevm = backend.fhevm().await?;

        info!("Encrypting...");
        let mut builder = fhevm.create_encrypted_input(contract_address, wallet.address());
        match plaintext {
            Plaintext::Uint8(value) => builder.add8(value.into())?,
            Plaintext::Uint32(value) => builder.add32(value.into())?,
        };
        let encrypted = fhevm.encrypt(&builder).await?;
        info!("Input encrypted");

        encrypted.write_to_file(&self.input_file)?;
        println!(
            "Encrypted input and ZK proof written to: {}",
            self.input_file.display()
        );

        Ok(())
    }
}
