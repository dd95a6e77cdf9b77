// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod fixture;

use anyhow::Result;
use ctk_evm::ConfidentialVoting;
use ctk_fhevm::{public_decrypt, setup_user_decrypt, ClearValue, EncryptedInput};
use fixture::Fixture;

/// Submit `vote` to `isValidVote` and decrypt the verdict. None when not on the mock.
async fn check_vote(
    fixture: &Fixture,
    voting: &dyn ConfidentialVoting,
    vote: u8,
) -> Result<(Option<bool>, EncryptedInput)> {
    let input = fixture.encrypt8(voting.address(), &[vote]).await?;
    voting
        .is_valid_vote(input.handles[0], input.input_proof.clone())
        .await?;
    if !fixture.is_mock() {
        return Ok((None, input));
    }

    let verdict = voting.vote_is_valid().await?;
    let clear =
        setup_user_decrypt(fixture.fhevm.as_ref(), &fixture.wallet, verdict, voting.address())
            .await?;
    Ok((clear.as_bool(), input))
}

#[tokio::test]
async fn test_validate_vote() -> Result<()> {
    let fixture = Fixture::setup().await?;
    let voting = fixture.deploy_voting().await?;

    for (vote, expected) in [(1, true), (0, true), (100, false), (2, false), (10, false)] {
        let (valid, _) = check_vote(&fixture, voting.as_ref(), vote).await?;
        if let Some(valid) = valid {
            assert_eq!(valid, expected, "vote {vote}");
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_voting_flow() -> Result<()> {
    let fixture = Fixture::setup().await?;
    let voting = fixture.deploy_voting().await?;
    let votes = [
        (1, true),
        (1, true),
        (0, true),
        (100, false),
        (2, false),
        (10, false),
        (1, true),
        (0, true),
    ];

    for (vote, expected) in votes {
        let (valid, input) = check_vote(&fixture, voting.as_ref(), vote).await?;
        let Some(valid) = valid else { continue };
        assert_eq!(valid, expected, "vote {vote}");
        if valid {
            voting.cast_vote(input.handles[0], input.input_proof).await?;
        }
    }

    if !fixture.is_mock() {
        return Ok(());
    }
    assert_eq!(voting.total_votes().await?, 5);

    voting.finalize().await?;
    let (option, tally) = voting.winning().await?;
    let clear = public_decrypt(fixture.fhevm.as_ref(), &[option, tally]).await?;
    assert_eq!(clear[&option], ClearValue::from(1u64));
    assert_eq!(clear[&tally], ClearValue::from(3u64));
    Ok(())
}

#[tokio::test]
async fn test_finalized_voting_rejects_votes() -> Result<()> {
    let fixture = Fixture::setup().await?;
    if !fixture.is_mock() {
        return Ok(());
    }
    let voting = fixture.deploy_voting().await?;
    voting.finalize().await?;

    let input = fixture.encrypt8(voting.address(), &[1]).await?;
    assert!(voting
        .cast_vote(input.handles[0], input.input_proof)
        .await
        .is_err());
    assert!(voting.finalize().await.is_err());
    Ok(())
}
