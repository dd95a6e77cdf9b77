// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod fixture;

use anyhow::Result;
use ctk_fhevm::{public_decrypt, ClearValue, EncryptedInput};
use fixture::Fixture;

#[tokio::test]
async fn test_store_value_4() -> Result<()> {
    let fixture = Fixture::setup().await?;
    let store = fixture.deploy_store().await?;
    assert!(store.encrypted_simple_value().await?.is_zero());

    let four = fixture.encrypt8(store.address(), &[4]).await?;
    store
        .store_encrypted_simple_value(four.handles[0], four.input_proof)
        .await?;

    let handle = store.encrypted_simple_value().await?;
    let clear = public_decrypt(fixture.fhevm.as_ref(), &[handle]).await?;
    assert_eq!(clear[&handle], ClearValue::from(4u64));
    Ok(())
}

#[tokio::test]
async fn test_store_sum() -> Result<()> {
    let fixture = Fixture::setup().await?;
    let store = fixture.deploy_store().await?;
    assert!(store.encrypted_sum().await?.is_zero());

    let inputs = fixture.encrypt8(store.address(), &[4, 13]).await?;
    store
        .store_encrypted_sum(inputs.handles[0], inputs.handles[1], inputs.input_proof)
        .await?;

    let handle = store.encrypted_sum().await?;
    let clear = public_decrypt(fixture.fhevm.as_ref(), &[handle]).await?;
    assert_eq!(clear[&handle], ClearValue::from(17u64));
    Ok(())
}

/// An input written by one task and read back by another must submit the same bytes
#[tokio::test]
async fn test_input_file_round_trip() -> Result<()> {
    let fixture = Fixture::setup().await?;
    let store = fixture.deploy_store().await?;
    let input = fixture.encrypt8(store.address(), &[4, 13]).await?;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("input.json");
    input.write_to_file(&path)?;
    let json = std::fs::read_to_string(&path)?;
    assert!(json.contains(r#""type":"Buffer""#));

    let read = EncryptedInput::read_from_file(&path)?;
    assert_eq!(read, input);
    assert_eq!(read.input_proof.as_ref(), input.input_proof.as_ref());
    for (read, written) in read.handles.iter().zip(&input.handles) {
        assert_eq!(read.as_slice(), written.as_slice());
    }

    // the re-read input is still accepted by the contract
    store
        .store_encrypted_sum(read.handles[0], read.handles[1], read.input_proof)
        .await?;
    let handle = store.encrypted_sum().await?;
    let clear = public_decrypt(fixture.fhevm.as_ref(), &[handle]).await?;
    assert_eq!(clear[&handle], ClearValue::from(17u64));
    Ok(())
}
