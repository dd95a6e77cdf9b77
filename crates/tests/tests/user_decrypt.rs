// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Rules the KMS enforces on user decryption, checked against the mocked network only.

use alloy::{
    hex,
    primitives::Address,
    signers::{local::PrivateKeySigner, SignerSync},
};
use anyhow::Result;
use ctk_evm::ConfidentialCounter;
use ctk_fhevm::{
    setup_user_decrypt, ClearValue, FhevmError, FhevmInstance, Handle, HandleContractPair,
    UserDecryptRequest,
};
use ctk_mock::{MockFheCounter, MockNetwork};

const DAY: u64 = 24 * 60 * 60;

async fn counter_holding(
    network: &MockNetwork,
    owner: &PrivateKeySigner,
    value: u64,
) -> Result<(MockFheCounter, Handle)> {
    let (counter, _) = network.deploy_counter(owner.address());
    let fhevm = network.fhevm();
    let mut builder = fhevm.create_encrypted_input(counter.address(), owner.address());
    builder.add32(value)?;
    let input = fhevm.encrypt(&builder).await?;
    counter.increment(input.handles[0], input.input_proof).await?;
    let handle = counter.get_count().await?;
    Ok((counter, handle))
}

/// A request signed by `signer` on behalf of `user`, valid from `start` for `days`
fn signed_request(
    fhevm: &dyn FhevmInstance,
    signer: &PrivateKeySigner,
    user: Address,
    handle: Handle,
    contract: Address,
    start: u64,
    days: u64,
) -> Result<UserDecryptRequest> {
    let keypair = fhevm.generate_keypair()?;
    let eip712 = fhevm.create_eip712(&keypair.public_key, &[contract], start, days)?;
    let signature = signer.sign_hash_sync(&eip712.signing_hash())?;
    Ok(UserDecryptRequest {
        handle_contract_pairs: vec![HandleContractPair {
            handle,
            contract_address: contract,
        }],
        keypair,
        signature: hex::encode(signature.as_bytes()),
        contract_addresses: vec![contract],
        user_address: user,
        start_timestamp: start,
        duration_days: days,
    })
}

fn now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_handshake_returns_the_value() -> Result<()> {
    let network = MockNetwork::new();
    let alice = PrivateKeySigner::random();
    let (counter, handle) = counter_holding(&network, &alice, 42).await?;

    let clear = setup_user_decrypt(network.fhevm(), &alice, handle, counter.address()).await?;
    assert_eq!(clear, ClearValue::from(42u64));
    Ok(())
}

#[tokio::test]
async fn test_proof_is_bound_to_the_user() -> Result<()> {
    let network = MockNetwork::new();
    let alice = PrivateKeySigner::random();
    let bob = PrivateKeySigner::random();
    let (counter, _) = network.deploy_counter(alice.address());

    let fhevm = network.fhevm();
    let mut builder = fhevm.create_encrypted_input(counter.address(), alice.address());
    builder.add32(1)?;
    let input = fhevm.encrypt(&builder).await?;

    // bob replays alice's input
    let as_bob = counter.connect(bob.address());
    assert!(as_bob
        .increment(input.handles[0], input.input_proof.clone())
        .await
        .is_err());
    assert!(counter.get_count().await?.is_zero());

    counter.increment(input.handles[0], input.input_proof).await?;
    assert!(!counter.get_count().await?.is_zero());
    Ok(())
}

#[tokio::test]
async fn test_only_allowed_users_can_decrypt() -> Result<()> {
    let network = MockNetwork::new();
    let alice = PrivateKeySigner::random();
    let bob = PrivateKeySigner::random();
    let (counter, handle) = counter_holding(&network, &alice, 7).await?;

    let err = setup_user_decrypt(network.fhevm(), &bob, handle, counter.address())
        .await
        .unwrap_err();
    assert!(matches!(err, FhevmError::Denied(_)), "{err}");
    Ok(())
}

#[tokio::test]
async fn test_request_must_be_signed_by_the_user() -> Result<()> {
    let network = MockNetwork::new();
    let alice = PrivateKeySigner::random();
    let mallory = PrivateKeySigner::random();
    let (counter, handle) = counter_holding(&network, &alice, 7).await?;

    let fhevm = network.fhevm();
    let request = signed_request(
        fhevm,
        &mallory,
        alice.address(),
        handle,
        counter.address(),
        now(),
        10,
    )?;
    let err = fhevm.user_decrypt(request).await.unwrap_err();
    assert!(matches!(err, FhevmError::InvalidSignature(_)), "{err}");
    Ok(())
}

#[tokio::test]
async fn test_expired_request_is_denied() -> Result<()> {
    let network = MockNetwork::new();
    let alice = PrivateKeySigner::random();
    let (counter, handle) = counter_holding(&network, &alice, 7).await?;

    let fhevm = network.fhevm();
    let expired = signed_request(
        fhevm,
        &alice,
        alice.address(),
        handle,
        counter.address(),
        now() - 11 * DAY,
        10,
    )?;
    assert!(fhevm.user_decrypt(expired).await.is_err());

    let current = signed_request(
        fhevm,
        &alice,
        alice.address(),
        handle,
        counter.address(),
        now() - 9 * DAY,
        10,
    )?;
    let clear = fhevm.user_decrypt(current).await?;
    assert_eq!(clear[&handle], ClearValue::from(7u64));
    Ok(())
}
