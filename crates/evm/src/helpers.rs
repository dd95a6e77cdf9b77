// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::{
    network::EthereumWallet,
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::ws::{WebSocketConfig, WsConnect},
};
use anyhow::{Context, Result};
use ctk_config::RPC;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct EthProvider<P = DynProvider> {
    provider: Arc<P>,
    chain_id: u64,
}

impl<P: Provider + Clone> EthProvider<P> {
    pub async fn new(provider: P) -> Result<Self> {
        let chain_id = provider
            .get_chain_id()
            .await
            .context("Failed to query the chain id. Check if the node is running and URL is correct.")?;
        Ok(Self {
            provider: Arc::new(provider),
            chain_id,
        })
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }
}

pub struct ProviderConfig {
    rpc: RPC,
}

impl ProviderConfig {
    pub fn new(rpc: RPC) -> Self {
        Self { rpc }
    }

    pub async fn create_readonly_provider(&self) -> Result<EthProvider> {
        let provider = if self.rpc.is_websocket() {
            ProviderBuilder::new()
                .connect_ws(self.create_ws_connect()?)
                .await
                .context("Failed to connect to WebSocket RPC. Check if the node is running and URL is correct.")?
                .erased()
        } else {
            ProviderBuilder::new()
                .connect_http(self.rpc.as_http_url()?.parse()?)
                .erased()
        };

        debug!("Connected read only provider to {}", self.rpc.url());
        EthProvider::new(provider).await
    }

    /// Provider that fills nonce, gas and chain id and signs with `signer`
    pub async fn create_signer_provider(&self, signer: &PrivateKeySigner) -> Result<EthProvider> {
        let wallet = EthereumWallet::from(signer.clone());

        let provider = if self.rpc.is_websocket() {
            ProviderBuilder::new()
                .wallet(wallet)
                .connect_ws(self.create_ws_connect()?)
                .await
                .context("Failed to connect to WebSocket RPC. Check if the node is running and URL is correct.")?
                .erased()
        } else {
            ProviderBuilder::new()
                .wallet(wallet)
                .connect_http(self.rpc.as_http_url()?.parse()?)
                .erased()
        };

        debug!(
            "Connected provider for {} to {}",
            signer.address(),
            self.rpc.url()
        );
        EthProvider::new(provider).await
    }

    fn create_ws_connect(&self) -> Result<WsConnect> {
        let config = WebSocketConfig::default()
            .max_frame_size(Some(32 * 1024 * 1024))
            .max_message_size(Some(32 * 1024 * 1024));

        Ok(WsConnect::new(self.rpc.as_ws_url()?).with_config(config))
    }
}
