// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{helpers::EthProvider, receipt::TxOutcome};
use alloy::{
    json_abi::JsonAbi,
    network::TransactionBuilder,
    primitives::{Address, Bytes},
    providers::Provider,
    rpc::types::TransactionRequest,
    sol_types::SolValue,
};
use anyhow::{anyhow, bail, Context, Result};
use ctk_config::TestnetConfig;
use serde::Deserialize;
use std::{fs, path::Path};
use tracing::info;

/// The parts of a Hardhat build artifact needed to deploy a contract.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    #[serde(default)]
    pub contract_name: Option<String>,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

impl ContractArtifact {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Could not read contract artifact {}", path.display()))?;
        let artifact: Self = serde_json::from_str(&json)
            .with_context(|| format!("{} is not a contract artifact", path.display()))?;
        if artifact.bytecode.is_empty() {
            bail!(
                "Artifact {} has no bytecode, is the contract abstract?",
                path.display()
            );
        }
        Ok(artifact)
    }

    pub fn name(&self) -> &str {
        self.contract_name.as_deref().unwrap_or("contract")
    }

    pub fn constructor_arity(&self) -> usize {
        self.abi
            .constructor()
            .map(|c| c.inputs.len())
            .unwrap_or_default()
    }
}

/// Coprocessor addresses every confidential contract is constructed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FheConstructorArgs {
    pub acl: Address,
    pub executor: Address,
    pub kms_verifier: Address,
    pub decryption_oracle: Address,
}

impl FheConstructorArgs {
    pub fn abi_encode(&self) -> Bytes {
        (
            self.acl,
            self.executor,
            self.kms_verifier,
            self.decryption_oracle,
        )
            .abi_encode_params()
            .into()
    }

    /// The voting contract additionally takes the question being voted on
    pub fn abi_encode_with_question(&self, question: &str) -> Bytes {
        (
            self.acl,
            self.executor,
            self.kms_verifier,
            self.decryption_oracle,
            question.to_string(),
        )
            .abi_encode_params()
            .into()
    }
}

impl From<&TestnetConfig> for FheConstructorArgs {
    fn from(config: &TestnetConfig) -> Self {
        Self {
            acl: config.acl_contract_address(),
            executor: config.fhevm_executor_contract_address(),
            kms_verifier: config.kms_verifier_contract_address(),
            decryption_oracle: config.decryption_oracle_contract_address(),
        }
    }
}

/// Deploy `artifact` with ABI encoded constructor arguments appended to its bytecode.
pub async fn deploy_contract<P: Provider + Clone>(
    provider: &EthProvider<P>,
    artifact: &ContractArtifact,
    constructor_args: Bytes,
) -> Result<(Address, TxOutcome)> {
    let mut code = artifact.bytecode.to_vec();
    code.extend_from_slice(&constructor_args);

    info!("Deploying {}", artifact.name());
    let tx = TransactionRequest::default().with_deploy_code(code);
    let pending = provider.provider().send_transaction(tx).await?;
    info!("Waiting for deployment transaction {}", pending.tx_hash());
    let receipt = pending.get_receipt().await?;
    let outcome = TxOutcome::from_receipt(&receipt)?;
    let address = outcome
        .contract_address
        .ok_or_else(|| anyhow!("Deployment receipt has no contract address"))?;

    info!(
        "{} deployed at {} in block {}",
        artifact.name(),
        address,
        outcome.block_number.unwrap_or_default()
    );
    Ok((address, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const ARTIFACT: &str = r#"{
        "_format": "hh-sol-artifact-1",
        "contractName": "FHECounter",
        "sourceName": "contracts/FHECounter.sol",
        "abi": [
            {
                "type": "constructor",
                "stateMutability": "nonpayable",
                "inputs": [
                    {"name": "acl", "type": "address", "internalType": "address"},
                    {"name": "executor", "type": "address", "internalType": "address"},
                    {"name": "kmsVerifier", "type": "address", "internalType": "address"},
                    {"name": "decryptionOracle", "type": "address", "internalType": "address"}
                ]
            }
        ],
        "bytecode": "0x60016000f3",
        "deployedBytecode": "0x00"
    }"#;

    fn args() -> FheConstructorArgs {
        FheConstructorArgs {
            acl: Address::repeat_byte(1),
            executor: Address::repeat_byte(2),
            kms_verifier: Address::repeat_byte(3),
            decryption_oracle: Address::repeat_byte(4),
        }
    }

    #[test]
    fn test_load_artifact() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("FHECounter.json");
        fs::write(&path, ARTIFACT)?;

        let artifact = ContractArtifact::load(&path)?;
        assert_eq!(artifact.name(), "FHECounter");
        assert_eq!(artifact.bytecode.as_ref(), &[0x60, 0x01, 0x60, 0x00, 0xf3]);
        assert_eq!(artifact.constructor_arity(), 4);
        Ok(())
    }

    #[test]
    fn test_load_rejects_missing_bytecode() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("Abstract.json");
        fs::write(&path, r#"{"abi": [], "bytecode": "0x"}"#)?;
        assert!(ContractArtifact::load(&path).is_err());
        assert!(ContractArtifact::load(dir.path().join("missing.json")).is_err());
        Ok(())
    }

    #[test]
    fn test_constructor_encoding() {
        let encoded = args().abi_encode();
        assert_eq!(encoded.len(), 4 * 32);
        assert_eq!(&encoded[12..32], Address::repeat_byte(1).as_slice());
        assert_eq!(&encoded[108..128], Address::repeat_byte(4).as_slice());

        let with_question = args().abi_encode_with_question("Is writing FHE contracts easy?");
        // four addresses, the string offset, its length and one word of data
        assert_eq!(with_question.len(), 7 * 32);
        assert_eq!(&with_question[..128], encoded.as_ref());
    }
}
