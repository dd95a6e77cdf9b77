// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Typed data the user signs to authorize a decryption of their handles.

use crate::error::FhevmError;
use alloy::{
    hex,
    primitives::{Address, Bytes, Signature, B256, U256},
    sol,
    sol_types::{Eip712Domain, SolStruct},
};
use serde_json::{json, Value};
use std::borrow::Cow;

pub const DECRYPTION_DOMAIN_NAME: &str = "Decryption";
pub const DECRYPTION_DOMAIN_VERSION: &str = "1";
pub const MAX_DURATION_DAYS: u64 = 365;
pub const MAX_CONTRACT_ADDRESSES: usize = 10;
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Extra data attached to decryption requests. A single zero byte selects the default context.
pub const DEFAULT_EXTRA_DATA: [u8; 1] = [0x00];

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct UserDecryptRequestVerification {
        bytes publicKey;
        address[] contractAddresses;
        uint256 startTimestamp;
        uint256 durationDays;
        bytes extraData;
    }
}

#[derive(Debug, Clone)]
pub struct UserDecryptEip712 {
    pub domain: Eip712Domain,
    pub message: UserDecryptRequestVerification,
}

impl UserDecryptEip712 {
    pub fn new(
        gateway_chain_id: u64,
        verifying_contract: Address,
        public_key: &Bytes,
        contract_addresses: &[Address],
        start_timestamp: u64,
        duration_days: u64,
    ) -> Result<Self, FhevmError> {
        validate_request(contract_addresses, duration_days)?;
        if public_key.is_empty() {
            return Err(FhevmError::InvalidRequest("public key is empty".into()));
        }

        let domain = Eip712Domain::new(
            Some(Cow::Borrowed(DECRYPTION_DOMAIN_NAME)),
            Some(Cow::Borrowed(DECRYPTION_DOMAIN_VERSION)),
            Some(U256::from(gateway_chain_id)),
            Some(verifying_contract),
            None,
        );
        let message = UserDecryptRequestVerification {
            publicKey: public_key.clone(),
            contractAddresses: contract_addresses.to_vec(),
            startTimestamp: U256::from(start_timestamp),
            durationDays: U256::from(duration_days),
            extraData: Bytes::from_static(&DEFAULT_EXTRA_DATA),
        };
        Ok(Self { domain, message })
    }

    pub fn signing_hash(&self) -> B256 {
        self.message.eip712_signing_hash(&self.domain)
    }

    /// Address that produced `signature` over this document. Accepts hex with or without `0x`.
    pub fn recover_signer(&self, signature: &str) -> Result<Address, FhevmError> {
        let bytes =
            hex::decode(signature).map_err(|e| FhevmError::InvalidSignature(e.to_string()))?;
        let signature = Signature::from_raw(&bytes)
            .map_err(|e| FhevmError::InvalidSignature(e.to_string()))?;
        signature
            .recover_address_from_prehash(&self.signing_hash())
            .map_err(|e| FhevmError::InvalidSignature(e.to_string()))
    }

    pub fn start_timestamp(&self) -> u64 {
        self.message.startTimestamp.saturating_to()
    }

    pub fn duration_days(&self) -> u64 {
        self.message.durationDays.saturating_to()
    }

    /// The request is valid for `now` in `[start, start + days * 86400)`
    pub fn is_valid_at(&self, now: u64) -> bool {
        let start = self.start_timestamp();
        let end = start.saturating_add(self.duration_days().saturating_mul(SECONDS_PER_DAY));
        now >= start && now < end
    }

    /// The document in the `eth_signTypedData_v4` JSON shape
    pub fn to_typed_data_json(&self) -> Value {
        json!({
            "types": {
                "EIP712Domain": [
                    {"name": "name", "type": "string"},
                    {"name": "version", "type": "string"},
                    {"name": "chainId", "type": "uint256"},
                    {"name": "verifyingContract", "type": "address"},
                ],
                "UserDecryptRequestVerification": [
                    {"name": "publicKey", "type": "bytes"},
                    {"name": "contractAddresses", "type": "address[]"},
                    {"name": "startTimestamp", "type": "uint256"},
                    {"name": "durationDays", "type": "uint256"},
                    {"name": "extraData", "type": "bytes"},
                ],
            },
            "primaryType": "UserDecryptRequestVerification",
            "domain": {
                "name": self.domain.name,
                "version": self.domain.version,
                "chainId": self.domain.chain_id.map(|id| id.to_string()),
                "verifyingContract": self.domain.verifying_contract,
            },
            "message": {
                "publicKey": self.message.publicKey,
                "contractAddresses": self.message.contractAddresses,
                "startTimestamp": self.message.startTimestamp.to_string(),
                "durationDays": self.message.durationDays.to_string(),
                "extraData": self.message.extraData,
            },
        })
    }
}

pub fn validate_request(contract_addresses: &[Address], duration_days: u64) -> Result<(), FhevmError> {
    if contract_addresses.is_empty() {
        return Err(FhevmError::InvalidRequest(
            "at least one contract address is required".into(),
        ));
    }
    if contract_addresses.len() > MAX_CONTRACT_ADDRESSES {
        return Err(FhevmError::InvalidRequest(format!(
            "at most {MAX_CONTRACT_ADDRESSES} contract addresses are allowed, got {}",
            contract_addresses.len()
        )));
    }
    if duration_days == 0 || duration_days > MAX_DURATION_DAYS {
        return Err(FhevmError::InvalidRequest(format!(
            "duration must be between 1 and {MAX_DURATION_DAYS} days, got {duration_days}"
        )));
    }
    Ok(())
}
