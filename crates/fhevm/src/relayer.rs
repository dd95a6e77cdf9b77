// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! FHE client backed by a relayer's HTTP API.

use crate::{
    decrypt::decode_clear_words,
    eip712::{UserDecryptEip712, DEFAULT_EXTRA_DATA},
    engine::{EncryptionContext, FheEngine},
    error::FhevmError,
    input::{EncryptedInput, EncryptedInputBuilder, InputProof},
    instance::{FhevmInstance, InstanceConfig, UserDecryptRequest},
    types::{ClearValue, Handle, HandleContractPair, Keypair},
};
use alloy::{
    hex,
    primitives::{Address, Bytes},
    providers::{Provider, ProviderBuilder},
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

pub const INPUT_PROOF_PATH: &str = "v1/input-proof";
pub const PUBLIC_DECRYPT_PATH: &str = "v1/public-decrypt";
pub const USER_DECRYPT_PATH: &str = "v1/user-decrypt";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InputProofRequest {
    contract_address: Address,
    user_address: Address,
    ciphertext_with_input_verification: String,
    contract_chain_id: String,
    extra_data: String,
}

#[derive(Deserialize)]
struct InputProofResponse {
    handles: Vec<String>,
    signatures: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PublicDecryptRequest {
    ciphertext_handles: Vec<Handle>,
    extra_data: String,
}

#[derive(Deserialize)]
struct PublicDecryptResult {
    decrypted_value: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestValidity {
    start_timestamp: String,
    duration_days: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserDecryptBody {
    handle_contract_pairs: Vec<HandleContractPair>,
    request_validity: RequestValidity,
    contracts_chain_id: String,
    contract_addresses: Vec<Address>,
    user_address: Address,
    signature: String,
    public_key: String,
    extra_data: String,
}

#[derive(Deserialize)]
struct Envelope<T> {
    response: T,
}

/// Live FHE client. Ciphertext handling is delegated to the engine, everything else goes
/// through the relayer.
pub struct RelayerInstance<E> {
    config: InstanceConfig,
    engine: E,
    chain_id: u64,
    client: reqwest::Client,
}

impl<E: FheEngine> RelayerInstance<E> {
    /// Create the client, querying the host chain id from the RPC node unless the config
    /// pins it.
    pub async fn new(config: InstanceConfig, engine: E) -> Result<Self, FhevmError> {
        let chain_id = match config.chain_id {
            Some(id) => id,
            None => query_chain_id(&config).await?,
        };
        Ok(Self::with_chain_id(config, engine, chain_id))
    }

    pub fn with_chain_id(config: InstanceConfig, engine: E, chain_id: u64) -> Self {
        info!(
            "FHE instance using relayer {} with the {} engine on chain {}",
            config.relayer_url,
            engine.name(),
            chain_id
        );
        Self {
            config,
            engine,
            chain_id,
            client: reqwest::Client::new(),
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn config(&self) -> &InstanceConfig {
        &self.config
    }

    async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, FhevmError> {
        let url = self
            .config
            .relayer_url
            .join_path(path)
            .map_err(|e| FhevmError::InvalidRequest(e.to_string()))?;
        debug!("POST {url}");
        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FhevmError::Relayer {
                status: status.as_u16(),
                body,
            });
        }
        let envelope: Envelope<R> = response.json().await?;
        Ok(envelope.response)
    }
}

async fn query_chain_id(config: &InstanceConfig) -> Result<u64, FhevmError> {
    let url = config
        .network
        .as_http_url()
        .map_err(|e| FhevmError::Rpc(e.to_string()))?;
    let url = url
        .parse::<reqwest::Url>()
        .map_err(|e| FhevmError::Rpc(e.to_string()))?;
    let provider = ProviderBuilder::new().connect_http(url);
    provider
        .get_chain_id()
        .await
        .map_err(|e| FhevmError::Rpc(e.to_string()))
}

fn extra_data_hex() -> String {
    hex::encode_prefixed(DEFAULT_EXTRA_DATA)
}

fn decode_hex(field: &str, value: &str) -> Result<Vec<u8>, FhevmError> {
    hex::decode(value).map_err(|e| FhevmError::InvalidRequest(format!("{field}: {e}")))
}

#[async_trait]
impl<E: FheEngine> FhevmInstance for RelayerInstance<E> {
    fn is_mock(&self) -> bool {
        false
    }

    async fn encrypt(&self, input: &EncryptedInputBuilder) -> Result<EncryptedInput, FhevmError> {
        if input.values().is_empty() {
            return Err(FhevmError::EmptyInput);
        }
        if !self.engine.produces_ciphertext() {
            return Err(FhevmError::Engine(format!(
                "the {} engine does not encrypt, refusing to send its output to the relayer",
                self.engine.name()
            )));
        }
        let context = EncryptionContext {
            contract_address: input.contract_address(),
            user_address: input.user_address(),
            acl_contract_address: self.config.acl_contract_address,
            chain_id: self.chain_id,
        };
        let ciphertext = self.engine.encrypt_inputs(input.values(), &context)?;

        info!("Requesting input proof for {} value(s)", input.values().len());
        let response: InputProofResponse = self
            .post(
                INPUT_PROOF_PATH,
                &InputProofRequest {
                    contract_address: context.contract_address,
                    user_address: context.user_address,
                    ciphertext_with_input_verification: hex::encode(&ciphertext),
                    contract_chain_id: format!("{:#x}", self.chain_id),
                    extra_data: extra_data_hex(),
                },
            )
            .await?;

        if response.handles.len() != input.values().len() {
            return Err(FhevmError::InvalidInputProof(format!(
                "relayer returned {} handles for {} values",
                response.handles.len(),
                input.values().len()
            )));
        }
        let handles = response
            .handles
            .iter()
            .map(|h| h.parse::<Handle>())
            .collect::<Result<Vec<_>, _>>()?;
        for (handle, value) in handles.iter().zip(input.values()) {
            if handle.fhe_type()? != value.ty {
                return Err(FhevmError::InvalidInputProof(format!(
                    "handle {handle} is not an {}",
                    value.ty
                )));
            }
        }
        let signatures = response
            .signatures
            .iter()
            .map(|s| decode_hex("signatures", s).map(Bytes::from))
            .collect::<Result<Vec<_>, _>>()?;

        let input_proof = InputProof {
            handles: handles.clone(),
            signatures,
            extra_data: Bytes::from_static(&DEFAULT_EXTRA_DATA),
        }
        .encode()?;
        Ok(EncryptedInput {
            handles,
            input_proof,
        })
    }

    fn generate_keypair(&self) -> Result<Keypair, FhevmError> {
        self.engine.generate_keypair()
    }

    fn create_eip712(
        &self,
        public_key: &Bytes,
        contract_addresses: &[Address],
        start_timestamp: u64,
        duration_days: u64,
    ) -> Result<UserDecryptEip712, FhevmError> {
        UserDecryptEip712::new(
            self.config.gateway_chain_id,
            self.config.verifying_contract_address_decryption,
            public_key,
            contract_addresses,
            start_timestamp,
            duration_days,
        )
    }

    async fn user_decrypt(
        &self,
        request: UserDecryptRequest,
    ) -> Result<HashMap<Handle, ClearValue>, FhevmError> {
        let handles = request.handles();
        let body = UserDecryptBody {
            handle_contract_pairs: request.handle_contract_pairs.clone(),
            request_validity: RequestValidity {
                start_timestamp: request.start_timestamp.to_string(),
                duration_days: request.duration_days.to_string(),
            },
            contracts_chain_id: self.chain_id.to_string(),
            contract_addresses: request.contract_addresses.clone(),
            user_address: request.user_address,
            signature: request.signature.clone(),
            public_key: hex::encode(&request.keypair.public_key),
            extra_data: extra_data_hex(),
        };
        let shares: Value = self.post(USER_DECRYPT_PATH, &body).await?;
        let values = self
            .engine
            .reconstruct_user_decrypt(&request.keypair, &handles, &shares)?;
        if values.len() != handles.len() {
            return Err(FhevmError::Engine(format!(
                "{} values reconstructed for {} handles",
                values.len(),
                handles.len()
            )));
        }
        Ok(handles.into_iter().zip(values).collect())
    }

    async fn public_decrypt(
        &self,
        handles: &[Handle],
    ) -> Result<HashMap<Handle, ClearValue>, FhevmError> {
        let results: Vec<PublicDecryptResult> = self
            .post(
                PUBLIC_DECRYPT_PATH,
                &PublicDecryptRequest {
                    ciphertext_handles: handles.to_vec(),
                    extra_data: extra_data_hex(),
                },
            )
            .await?;
        let result = results
            .first()
            .ok_or_else(|| FhevmError::InvalidRequest("relayer returned no result".into()))?;
        let words = decode_hex("decrypted_value", &result.decrypted_value)?;
        let values = decode_clear_words(handles, &words)?;
        Ok(handles.iter().copied().zip(values).collect())
    }
}
