// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod fixture;

use anyhow::Result;
use ctk_fhevm::{setup_user_decrypt, ClearValue};
use fixture::Fixture;

#[tokio::test]
async fn test_increment_from_zero() -> Result<()> {
    let fixture = Fixture::setup().await?;
    let counter = fixture.deploy_counter().await?;
    assert!(counter.get_count().await?.is_zero());

    let one = fixture.encrypt32(counter.address(), 1).await?;
    counter.increment(one.handles[0], one.input_proof).await?;

    let count = counter.get_count().await?;
    if fixture.is_mock() {
        let clear =
            setup_user_decrypt(fixture.fhevm.as_ref(), &fixture.wallet, count, counter.address())
                .await?;
        assert_eq!(clear, ClearValue::from(1u64));
    }
    Ok(())
}

#[tokio::test]
async fn test_increment_then_decrement() -> Result<()> {
    let fixture = Fixture::setup().await?;
    let counter = fixture.deploy_counter().await?;

    let one = fixture.encrypt32(counter.address(), 1).await?;
    counter.increment(one.handles[0], one.input_proof).await?;

    let one = fixture.encrypt32(counter.address(), 1).await?;
    counter.decrement(one.handles[0], one.input_proof).await?;

    let count = counter.get_count().await?;
    if fixture.is_mock() {
        let clear =
            setup_user_decrypt(fixture.fhevm.as_ref(), &fixture.wallet, count, counter.address())
                .await?;
        assert_eq!(clear, ClearValue::from(0u64));
    }
    Ok(())
}
