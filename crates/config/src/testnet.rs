// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    error::{ConfigError, FieldError},
    rpc::RPC,
    validation::{parse_address, ValidUrl},
};
use alloy::primitives::Address;
use figment::{
    providers::{Format, Json},
    Figment,
};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

/// The testnet config exactly as it appears on disk. Every field is optional here so that
/// validation can report all problems at once instead of failing on the first one.
#[derive(Debug, Default, Deserialize)]
struct RawTestnetConfig {
    json_rpc_url: Option<String>,
    relayer_url: Option<String>,
    gateway_chain_id: Option<u64>,
    chain_id: Option<u64>,
    acl_contract_address: Option<String>,
    fhevm_executor_contract_address: Option<String>,
    kms_verifier_contract_address: Option<String>,
    decryption_oracle_contract_address: Option<String>,
    input_verifier_contract_address: Option<String>,
    input_verification_contract_address: Option<String>,
    decryption_contract_address: Option<String>,
}

/// Network endpoints and contract addresses for an FHE enabled chain.
#[derive(Debug, Clone)]
pub struct TestnetConfig {
    json_rpc_url: RPC,
    relayer_url: ValidUrl,
    gateway_chain_id: u64,
    chain_id: Option<u64>,
    acl_contract_address: Address,
    fhevm_executor_contract_address: Address,
    kms_verifier_contract_address: Address,
    decryption_oracle_contract_address: Address,
    input_verifier_contract_address: Address,
    input_verification_contract_address: Address,
    decryption_contract_address: Address,
}

/// Load and validate the testnet config json file
pub fn load_testnet_config(path: impl AsRef<Path>) -> Result<TestnetConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = TestnetConfig::from_json(&contents, path)?;
    debug!(?config, "Testnet config loaded");
    Ok(config)
}

impl TestnetConfig {
    /// Parse a testnet config from a json string. `origin` is only used for error reporting.
    pub fn from_json(json: &str, origin: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let origin = origin.into();
        let raw: RawTestnetConfig =
            Figment::from(Json::string(json))
                .extract()
                .map_err(|e| ConfigError::Parse {
                    path: origin.clone(),
                    source: Box::new(e),
                })?;

        raw.validate().map_err(|errors| ConfigError::Invalid {
            path: origin,
            errors,
        })
    }

    pub fn json_rpc_url(&self) -> &RPC {
        &self.json_rpc_url
    }

    pub fn relayer_url(&self) -> &ValidUrl {
        &self.relayer_url
    }

    pub fn gateway_chain_id(&self) -> u64 {
        self.gateway_chain_id
    }

    /// Chain id of the host chain if the config pins it
    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    pub fn acl_contract_address(&self) -> Address {
        self.acl_contract_address
    }

    pub fn fhevm_executor_contract_address(&self) -> Address {
        self.fhevm_executor_contract_address
    }

    pub fn kms_verifier_contract_address(&self) -> Address {
        self.kms_verifier_contract_address
    }

    pub fn decryption_oracle_contract_address(&self) -> Address {
        self.decryption_oracle_contract_address
    }

    pub fn input_verifier_contract_address(&self) -> Address {
        self.input_verifier_contract_address
    }

    pub fn input_verification_contract_address(&self) -> Address {
        self.input_verification_contract_address
    }

    pub fn decryption_contract_address(&self) -> Address {
        self.decryption_contract_address
    }
}

impl RawTestnetConfig {
    fn validate(self) -> Result<TestnetConfig, Vec<FieldError>> {
        let mut errors = Vec::new();

        let json_rpc_url = required(&mut errors, "json_rpc_url", self.json_rpc_url, |s| {
            RPC::from_url(s).map_err(|e| format!("{e:#}"))
        });
        let relayer_url = required(&mut errors, "relayer_url", self.relayer_url, |s| {
            ValidUrl::from_str(s).map_err(|e| e.to_string())
        });
        let gateway_chain_id = match self.gateway_chain_id {
            Some(id) => Some(id),
            None => {
                errors.push(FieldError::missing("gateway_chain_id"));
                None
            }
        };

        let mut address = |field: &'static str, value: Option<String>| {
            required(&mut errors, field, value, |s| {
                parse_address(s).map_err(|e| e.to_string())
            })
        };
        let acl = address("acl_contract_address", self.acl_contract_address);
        let executor = address(
            "fhevm_executor_contract_address",
            self.fhevm_executor_contract_address,
        );
        let kms_verifier = address(
            "kms_verifier_contract_address",
            self.kms_verifier_contract_address,
        );
        let decryption_oracle = address(
            "decryption_oracle_contract_address",
            self.decryption_oracle_contract_address,
        );
        let input_verifier = address(
            "input_verifier_contract_address",
            self.input_verifier_contract_address,
        );
        let input_verification = address(
            "input_verification_contract_address",
            self.input_verification_contract_address,
        );
        let decryption = address(
            "decryption_contract_address",
            self.decryption_contract_address,
        );

        match (
            json_rpc_url,
            relayer_url,
            gateway_chain_id,
            acl,
            executor,
            kms_verifier,
            decryption_oracle,
            input_verifier,
            input_verification,
            decryption,
        ) {
            (
                Some(json_rpc_url),
                Some(relayer_url),
                Some(gateway_chain_id),
                Some(acl_contract_address),
                Some(fhevm_executor_contract_address),
                Some(kms_verifier_contract_address),
                Some(decryption_oracle_contract_address),
                Some(input_verifier_contract_address),
                Some(input_verification_contract_address),
                Some(decryption_contract_address),
            ) if errors.is_empty() => Ok(TestnetConfig {
                json_rpc_url,
                relayer_url,
                gateway_chain_id,
                chain_id: self.chain_id,
                acl_contract_address,
                fhevm_executor_contract_address,
                kms_verifier_contract_address,
                decryption_oracle_contract_address,
                input_verifier_contract_address,
                input_verification_contract_address,
                decryption_contract_address,
            }),
            _ => Err(errors),
        }
    }
}

fn required<T>(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: Option<String>,
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> Option<T> {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        errors.push(FieldError::missing(field));
        return None;
    };
    match parse(value.trim()) {
        Ok(parsed) => Some(parsed),
        Err(problem) => {
            errors.push(FieldError::invalid(field, problem));
            None
        }
    }
}
