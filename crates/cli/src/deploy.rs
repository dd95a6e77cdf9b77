// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::backend::Backend;
use alloy::{
    primitives::{Address, Bytes},
    signers::local::PrivateKeySigner,
};
use anyhow::{bail, Context, Result};
use ctk_config::Network;
use ctk_crypto::{load_wallet, CredentialChain};
use ctk_evm::{
    address_file::write_address, deploy_contract, ConfidentialCounter, ConfidentialStore,
    ConfidentialVoting, ContractArtifact, FheConstructorArgs, TxOutcome,
};
use ctk_mock::MockNetwork;
use std::path::PathBuf;
use tracing::{info, instrument};

/// Contracts the toolkit knows how to deploy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Test,
    FheCounter,
    EncryptedVoting { question: String },
}

impl Target {
    /// Where hardhat writes the artifact when compiling the contracts folder
    pub fn default_artifact(&self) -> PathBuf {
        let (source, name) = match self {
            Target::Test => ("Simple.sol", "Test"),
            Target::FheCounter => ("FHECounter.sol", "FHECounter"),
            Target::EncryptedVoting { .. } => ("EncryptedVoting.sol", "EncryptedVoting"),
        };
        PathBuf::from("artifacts/contracts")
            .join(source)
            .join(format!("{name}.json"))
    }

    fn constructor_args(&self, args: &FheConstructorArgs) -> (usize, Bytes) {
        match self {
            Target::EncryptedVoting { question } => (5, args.abi_encode_with_question(question)),
            _ => (4, args.abi_encode()),
        }
    }
}

#[derive(Debug)]
pub struct DeployTask {
    pub network: Network,
    pub config_file: PathBuf,
    pub key_file: PathBuf,
    pub address_file: PathBuf,
    pub artifact: Option<PathBuf>,
}

impl DeployTask {
    #[instrument(skip_all, fields(target = ?target))]
    pub async fn execute(self, target: Target, credentials: &CredentialChain) -> Result<()> {
        info!("Loading wallet");
        let wallet = load_wallet(&self.key_file, credentials).await?;
        let backend = Backend::load(self.network, &self.config_file)?;

        info!("Deploying contract");
        let (address, outcome) = match &backend {
            Backend::Live(config) => {
                let artifact_path = self
                    .artifact
                    .clone()
                    .unwrap_or_else(|| target.default_artifact());
                let artifact = ContractArtifact::load(&artifact_path).with_context(|| {
                    format!("Compile the contracts or pass --artifact for {target:?}")
                })?;
                let (arity, args) = target.constructor_args(&FheConstructorArgs::from(config));
                if artifact.constructor_arity() != arity {
                    bail!(
                        "{} takes {} constructor argument(s), expected {arity}",
                        artifact_path.display(),
                        artifact.constructor_arity()
                    );
                }
                let provider = backend
                    .signer_provider(&wallet)
                    .await?
                    .context("Live backend without a provider")?;
                deploy_contract(&provider, &artifact, args).await?
            }
            Backend::Mock(network) => deploy_mock(network, &target, &wallet),
        };

        println!(
            "Contract deployed at block: {}",
            outcome.block_number.unwrap_or_default()
        );
        println!("Contract address: {address}");
        write_address(&self.address_file, address)?;

        Ok(())
    }
}

fn deploy_mock(
    network: &MockNetwork,
    target: &Target,
    wallet: &PrivateKeySigner,
) -> (Address, TxOutcome) {
    let deployer = wallet.address();
    match target {
        Target::Test => {
            let (store, outcome) = network.deploy_simple_store(deployer);
            (store.address(), outcome)
        }
        Target::FheCounter => {
            let (counter, outcome) = network.deploy_counter(deployer);
            (counter.address(), outcome)
        }
        Target::EncryptedVoting { question } => {
            let (voting, outcome) = network.deploy_voting(deployer, question);
            (voting.address(), outcome)
        }
    }
}
