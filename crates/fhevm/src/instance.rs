// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    eip712::UserDecryptEip712,
    error::FhevmError,
    input::{EncryptedInput, EncryptedInputBuilder},
    types::{ClearValue, Handle, HandleContractPair, Keypair},
};
use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;
use ctk_config::{validation::ValidUrl, TestnetConfig, RPC};
use std::collections::HashMap;

/// Addresses and endpoints an FHE client is created from.
#[derive(Debug, Clone)]
pub struct InstanceConfig {
    pub verifying_contract_address_decryption: Address,
    pub verifying_contract_address_input_verification: Address,
    pub input_verifier_contract_address: Address,
    pub kms_contract_address: Address,
    pub acl_contract_address: Address,
    pub gateway_chain_id: u64,
    /// Host chain id. Queried from `network` when not pinned.
    pub chain_id: Option<u64>,
    pub relayer_url: ValidUrl,
    pub network: RPC,
}

impl From<&TestnetConfig> for InstanceConfig {
    fn from(config: &TestnetConfig) -> Self {
        Self {
            verifying_contract_address_decryption: config.decryption_contract_address(),
            verifying_contract_address_input_verification: config
                .input_verification_contract_address(),
            input_verifier_contract_address: config.input_verifier_contract_address(),
            kms_contract_address: config.kms_verifier_contract_address(),
            acl_contract_address: config.acl_contract_address(),
            gateway_chain_id: config.gateway_chain_id(),
            chain_id: config.chain_id(),
            relayer_url: config.relayer_url().clone(),
            network: config.json_rpc_url().clone(),
        }
    }
}

/// A signed request to decrypt handles for one user.
#[derive(Debug, Clone)]
pub struct UserDecryptRequest {
    pub handle_contract_pairs: Vec<HandleContractPair>,
    pub keypair: Keypair,
    /// Hex encoded EIP-712 signature without the `0x` prefix
    pub signature: String,
    pub contract_addresses: Vec<Address>,
    pub user_address: Address,
    pub start_timestamp: u64,
    pub duration_days: u64,
}

impl UserDecryptRequest {
    pub fn handles(&self) -> Vec<Handle> {
        self.handle_contract_pairs.iter().map(|p| p.handle).collect()
    }
}

/// The operations tasks and tests need from an FHE client, whether it talks to a relayer or
/// to an in-process mock.
#[async_trait]
pub trait FhevmInstance: Send + Sync {
    fn is_mock(&self) -> bool;

    fn create_encrypted_input(
        &self,
        contract_address: Address,
        user_address: Address,
    ) -> EncryptedInputBuilder {
        EncryptedInputBuilder::new(contract_address, user_address)
    }

    async fn encrypt(&self, input: &EncryptedInputBuilder) -> Result<EncryptedInput, FhevmError>;

    fn generate_keypair(&self) -> Result<Keypair, FhevmError>;

    fn create_eip712(
        &self,
        public_key: &Bytes,
        contract_addresses: &[Address],
        start_timestamp: u64,
        duration_days: u64,
    ) -> Result<UserDecryptEip712, FhevmError>;

    async fn user_decrypt(
        &self,
        request: UserDecryptRequest,
    ) -> Result<HashMap<Handle, ClearValue>, FhevmError>;

    async fn public_decrypt(
        &self,
        handles: &[Handle],
    ) -> Result<HashMap<Handle, ClearValue>, FhevmError>;
}
