// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::{
    node_bindings::{Anvil, AnvilInstance},
    primitives::{Address, U256},
    providers::Provider,
    signers::local::PrivateKeySigner,
};
use anyhow::Result;
use ctk_config::RPC;
use ctk_evm::{
    check_minimum_balance, deploy_contract, ContractArtifact, FheConstructorArgs, ProviderConfig,
    MIN_BALANCE,
};
use std::fs;
use tempfile::tempdir;

// Init code returning a single STOP byte as runtime code
const RAW_ARTIFACT: &str = r#"{"contractName": "Stop", "abi": [], "bytecode": "0x60016000f3"}"#;

fn spawn_anvil() -> Option<AnvilInstance> {
    // NOTE: Anvil must be available on $PATH
    match Anvil::new().try_spawn() {
        Ok(anvil) => Some(anvil),
        Err(e) => {
            eprintln!("skipping, anvil is not available: {e}");
            None
        }
    }
}

#[tokio::test]
async fn test_balance_check_against_node() -> Result<()> {
    let Some(anvil) = spawn_anvil() else {
        return Ok(());
    };
    let config = ProviderConfig::new(RPC::from_url(&anvil.endpoint())?);
    let provider = config.create_readonly_provider().await?;
    assert_eq!(provider.chain_id(), anvil.chain_id());

    let funded = anvil.addresses()[0];
    let balance = check_minimum_balance(&provider, funded).await?;
    assert!(balance >= MIN_BALANCE);

    let empty = PrivateKeySigner::random().address();
    let err = check_minimum_balance(&provider, empty).await.unwrap_err();
    assert!(err.to_string().starts_with("Insufficient balance"));
    Ok(())
}

#[tokio::test]
async fn test_deploy_from_artifact() -> Result<()> {
    let Some(anvil) = spawn_anvil() else {
        return Ok(());
    };
    // anvil's first dev account
    let signer: PrivateKeySigner =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".parse()?;
    let config = ProviderConfig::new(RPC::from_url(&anvil.endpoint())?);
    let provider = config.create_signer_provider(&signer).await?;

    let dir = tempdir()?;
    let path = dir.path().join("Stop.json");
    fs::write(&path, RAW_ARTIFACT)?;
    let artifact = ContractArtifact::load(&path)?;

    let args = FheConstructorArgs {
        acl: Address::repeat_byte(1),
        executor: Address::repeat_byte(2),
        kms_verifier: Address::repeat_byte(3),
        decryption_oracle: Address::repeat_byte(4),
    };
    let (address, outcome) = deploy_contract(&provider, &artifact, args.abi_encode()).await?;

    assert_eq!(outcome.contract_address, Some(address));
    assert!(outcome.block_number.is_some());
    let code = provider.provider().get_code_at(address).await?;
    assert_eq!(code.as_ref(), &[0x00]);

    let balance = provider.provider().get_balance(signer.address()).await?;
    assert!(balance > U256::ZERO);
    Ok(())
}
