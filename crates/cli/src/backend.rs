// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::{
    primitives::{Address, U256},
    signers::local::PrivateKeySigner,
};
use anyhow::Result;
use ctk_config::{load_testnet_config, Network, TestnetConfig};
use ctk_evm::{
    get_balance, ConfidentialCounter, ConfidentialStore, EthProvider, LiveContract,
    ProviderConfig,
};
use ctk_fhevm::{CleartextEngine, FhevmInstance, InstanceConfig, RelayerInstance};
use ctk_mock::MockNetwork;
use std::path::Path;
use tracing::{info, warn};

/// Where a task sends its calls: the node and relayer of a testnet config, or a mocked
/// network living only as long as the process.
pub enum Backend {
    Live(TestnetConfig),
    Mock(MockNetwork),
}

impl Backend {
    pub fn load(network: Network, config_file: &Path) -> Result<Self> {
        if network.is_mock() && !config_file.exists() {
            warn!(
                "{} not found, mocking with default chain settings",
                config_file.display()
            );
            return Ok(Backend::Mock(MockNetwork::new()));
        }

        info!("Loading testnet config");
        let config = load_testnet_config(config_file)?;
        Ok(match network {
            Network::Hardhat => Backend::Mock(MockNetwork::from_config(&config)),
            Network::Optalysys => Backend::Live(config),
        })
    }

    pub async fn fhevm(&self) -> Result<Box<dyn FhevmInstance>> {
        info!("Instantiating fhevm instance");
        Ok(match self {
            Backend::Live(config) => {
                let instance_config = InstanceConfig::from(config);
                info!(?instance_config, "Relayer instance config");
                Box::new(RelayerInstance::new(instance_config, CleartextEngine).await?)
            }
            Backend::Mock(network) => Box::new(network.fhevm().clone()),
        })
    }

    /// Provider signing with `signer`, only exists on the live network
    pub async fn signer_provider(&self, signer: &PrivateKeySigner) -> Result<Option<EthProvider>> {
        Ok(match self {
            Backend::Live(config) => {
                info!("Connecting wallet");
                let provider = ProviderConfig::new(config.json_rpc_url().clone())
                    .create_signer_provider(signer)
                    .await?;
                Some(provider)
            }
            Backend::Mock(_) => None,
        })
    }

    pub async fn balance(&self, address: Address) -> Result<U256> {
        match self {
            Backend::Live(config) => {
                info!("Connecting provider");
                let provider = ProviderConfig::new(config.json_rpc_url().clone())
                    .create_readonly_provider()
                    .await?;
                get_balance(&provider, address).await
            }
            Backend::Mock(network) => Ok(network.balance(address)),
        }
    }

    pub async fn counter(
        &self,
        address: Address,
        signer: &PrivateKeySigner,
    ) -> Result<Box<dyn ConfidentialCounter>> {
        info!("Connecting to contract");
        Ok(match self {
            Backend::Live(_) => Box::new(self.live_contract(address, signer).await?),
            Backend::Mock(network) => Box::new(network.counter_at(address, signer.address())?),
        })
    }

    /// The store contract. Without a signer only its view functions can be used.
    pub async fn store(
        &self,
        address: Address,
        signer: Option<&PrivateKeySigner>,
    ) -> Result<Box<dyn ConfidentialStore>> {
        info!("Connecting to contract");
        Ok(match (self, signer) {
            (Backend::Live(_), Some(signer)) => Box::new(self.live_contract(address, signer).await?),
            (Backend::Live(config), None) => {
                let provider = ProviderConfig::new(config.json_rpc_url().clone())
                    .create_readonly_provider()
                    .await?;
                Box::new(LiveContract::new(address, provider.provider().clone()))
            }
            (Backend::Mock(network), signer) => {
                let sender = signer.map(|s| s.address()).unwrap_or_default();
                Box::new(network.store_at(address, sender)?)
            }
        })
    }

    async fn live_contract(
        &self,
        address: Address,
        signer: &PrivateKeySigner,
    ) -> Result<LiveContract> {
        let provider = self
            .signer_provider(signer)
            .await?
            .ok_or_else(|| anyhow::anyhow!("The mocked network has no RPC provider"))?;
        Ok(LiveContract::new(address, provider.provider().clone()))
    }
}
