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
use ctk_fhevm::EncryptedInput;
use std::path::PathBuf;
use tracing::{info, instrument};

/// Contract functions that take one encrypted input and its proof
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    StoreEncryptedSimpleValue,
    Increment,
    Decrement,
}

#[derive(Debug)]
pub struct SubmitTask {
    pub network: Network,
    pub config_file: PathBuf,
    pub key_file: PathBuf,
    pub address_file: PathBuf,
    pub input_file: PathBuf,
}

impl SubmitTask {
    #[instrument(skip_all, fields(call = ?call))]
    pub async fn execute(self, call: Call, credentials: &CredentialChain) -> Result<()> {
        info!("Loading wallet");
        let wallet = load_wallet(&self.key_file, credentials).await?;
        info!("Loading contract address");
        let contract_address = read_address(&self.address_file)?;
        let backend = Backend::load(self.network, &self.config_file)?;
        info!("Loading encrypted input and zkproof");
        let input = EncryptedInput::read_from_file(&self.input_file)?;
        let handle = input.handle(0)?;

        let outcome = match call {
            Call::StoreEncryptedSimpleValue => {
                let store = backend.store(contract_address, Some(&wallet)).await?;
                info!("Calling storeEncryptedSimpleValue on contract");
                store
                    .store_encrypted_simple_value(handle, input.input_proof)
                    .await?
            }
            Call::Increment => {
                let counter = backend.counter(contract_address, &wallet).await?;
                info!("Calling increment on contract");
                counter.increment(handle, input.input_proof).await?
            }
            Call::Decrement => {
                let counter = backend.counter(contract_address, &wallet).await?;
                info!("Calling decrement on contract");
                counter.decrement(handle, input.input_proof).await?
            }
        };

        println!("Transaction hash: {}", outcome.transaction_hash);
        println!(
            "Transaction receipt received. Block number: {}",
            outcome.block_number.unwrap_or_default()
        );

        Ok(())
    }
}
