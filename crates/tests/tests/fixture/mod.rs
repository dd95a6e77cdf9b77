// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Deploys the contract under test on whatever network NETWORK selects. Scenarios only talk
//! to the capability traits so the same code runs against the mock and the testnet.

#![allow(dead_code)]

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use anyhow::Result;
use ctk_config::{load_testnet_config, Network, TestnetConfig};
use ctk_crypto::{load_wallet, CredentialChain};
use ctk_evm::{
    deploy_contract, ConfidentialCounter, ConfidentialStore, ConfidentialVoting,
    ContractArtifact, EthProvider, FheConstructorArgs, LiveContract, ProviderConfig,
};
use ctk_fhevm::{
    CleartextEngine, EncryptedInput, FhevmInstance, InstanceConfig, RelayerInstance,
};
use ctk_mock::MockNetwork;
use std::path::{Path, PathBuf};
use tracing::info;

pub const VOTING_QUESTION: &str = "Is writing FHE contracts easy?";

enum Backend {
    Mock(MockNetwork),
    Live {
        config: TestnetConfig,
        provider: EthProvider,
    },
}

pub struct Fixture {
    pub wallet: PrivateKeySigner,
    pub fhevm: Box<dyn FhevmInstance>,
    backend: Backend,
}

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
        .with_test_writer()
        .try_init();
}

impl Fixture {
    pub async fn setup() -> Result<Self> {
        init_tracing();
        let network = Network::from_env();
        info!("Network name: {network}");

        match network {
            Network::Hardhat => {
                info!("Running on hardhat, using mocked network");
                let mock = MockNetwork::new();
                Ok(Self {
                    wallet: PrivateKeySigner::random(),
                    fhevm: Box::new(mock.fhevm().clone()),
                    backend: Backend::Mock(mock),
                })
            }
            Network::Optalysys => {
                let root = workspace_root();
                info!("Loading wallet");
                let wallet =
                    load_wallet(root.join("key.json"), &CredentialChain::wallet_password())
                        .await?;
                info!("Loading testnet config");
                let config = load_testnet_config(root.join(network.default_config_file()))?;
                info!("Connecting wallet");
                let provider = ProviderConfig::new(config.json_rpc_url().clone())
                    .create_signer_provider(&wallet)
                    .await?;
                info!("Creating fhevm instance");
                let fhevm =
                    RelayerInstance::new(InstanceConfig::from(&config), CleartextEngine).await?;
                Ok(Self {
                    wallet,
                    fhevm: Box::new(fhevm),
                    backend: Backend::Live { config, provider },
                })
            }
        }
    }

    pub fn is_mock(&self) -> bool {
        self.fhevm.is_mock()
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    /// The mocked network, when running on it
    pub fn mock(&self) -> Option<&MockNetwork> {
        match &self.backend {
            Backend::Mock(network) => Some(network),
            Backend::Live { .. } => None,
        }
    }

    async fn deploy_live(
        config: &TestnetConfig,
        provider: &EthProvider,
        artifact: &str,
        question: Option<&str>,
    ) -> Result<LiveContract> {
        let artifact = ContractArtifact::load(workspace_root().join(artifact))?;
        let args = FheConstructorArgs::from(config);
        let args = match question {
            Some(question) => args.abi_encode_with_question(question),
            None => args.abi_encode(),
        };
        let (address, outcome) = deploy_contract(provider, &artifact, args).await?;
        info!(
            "Contract deployed at block: {}",
            outcome.block_number.unwrap_or_default()
        );
        Ok(LiveContract::new(address, provider.provider().clone()))
    }

    pub async fn deploy_counter(&self) -> Result<Box<dyn ConfidentialCounter>> {
        info!("Deploying contract");
        Ok(match &self.backend {
            Backend::Mock(network) => Box::new(network.deploy_counter(self.address()).0),
            Backend::Live { config, provider } => Box::new(
                Self::deploy_live(
                    config,
                    provider,
                    "artifacts/contracts/FHECounter.sol/FHECounter.json",
                    None,
                )
                .await?,
            ),
        })
    }

    pub async fn deploy_store(&self) -> Result<Box<dyn ConfidentialStore>> {
        info!("Deploying contract");
        Ok(match &self.backend {
            Backend::Mock(network) => Box::new(network.deploy_simple_store(self.address()).0),
            Backend::Live { config, provider } => Box::new(
                Self::deploy_live(
                    config,
                    provider,
                    "artifacts/contracts/Simple.sol/Test.json",
                    None,
                )
                .await?,
            ),
        })
    }

    pub async fn deploy_voting(&self) -> Result<Box<dyn ConfidentialVoting>> {
        info!("Deploying contract");
        Ok(match &self.backend {
            Backend::Mock(network) => {
                Box::new(network.deploy_voting(self.address(), VOTING_QUESTION).0)
            }
            Backend::Live { config, provider } => Box::new(
                Self::deploy_live(
                    config,
                    provider,
                    "artifacts/contracts/EncryptedVoting.sol/EncryptedVoting.json",
                    Some(VOTING_QUESTION),
                )
                .await?,
            ),
        })
    }

    pub async fn encrypt8(&self, contract: Address, values: &[u8]) -> Result<EncryptedInput> {
        let mut builder = self.fhevm.create_encrypted_input(contract, self.address());
        for value in values {
            builder.add8((*value).into())?;
        }
        Ok(self.fhevm.encrypt(&builder).await?)
    }

    pub async fn encrypt32(&self, contract: Address, value: u32) -> Result<EncryptedInput> {
        let mut builder = self.fhevm.create_encrypted_input(contract, self.address());
        builder.add32(value.into())?;
        Ok(self.fhevm.encrypt(&builder).await?)
    }
}
