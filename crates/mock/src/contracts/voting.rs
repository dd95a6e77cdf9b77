// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use super::{lock, MockContext};
use crate::{coprocessor::MockCoprocessor, error::MockError};
use alloy::primitives::{Address, Bytes, U256};
use anyhow::Result;
use async_trait::async_trait;
use ctk_evm::{ConfidentialVoting, TxOutcome};
use ctk_fhevm::{FheType, Handle};
use std::sync::{Arc, Mutex};

pub(crate) struct VotingState {
    question: String,
    vote_is_valid: Handle,
    tallies: [Handle; 2],
    total_votes: u64,
    winning: Option<(Handle, Handle)>,
}

/// Mock of the `EncryptedVoting` contract: a yes/no ballot where votes are encrypted `euint8`
/// values, tallies are `euint16` and only the outcome is ever made public.
#[derive(Clone)]
pub struct MockEncryptedVoting {
    context: MockContext,
    state: Arc<Mutex<VotingState>>,
}

impl MockEncryptedVoting {
    pub(crate) fn new(
        address: Address,
        coprocessor: MockCoprocessor,
        sender: Address,
        question: &str,
    ) -> Self {
        let zero = coprocessor.trivial(FheType::Uint16, U256::ZERO);
        Self {
            context: MockContext {
                address,
                coprocessor,
                sender,
            },
            state: Arc::new(Mutex::new(VotingState {
                question: question.to_string(),
                vote_is_valid: Handle::ZERO,
                tallies: [zero, zero],
                total_votes: 0,
                winning: None,
            })),
        }
    }

    pub fn connect(&self, sender: Address) -> Self {
        Self {
            context: MockContext {
                sender,
                ..self.context.clone()
            },
            state: self.state.clone(),
        }
    }

    pub fn question(&self) -> String {
        lock(&self.state).question.clone()
    }

    /// Encrypted `vote == option` for each option
    fn matches_options(&self, vote: Handle) -> Result<[Handle; 2], MockError> {
        let coprocessor = &self.context.coprocessor;
        let mut matches = [Handle::ZERO; 2];
        for (option, slot) in matches.iter_mut().enumerate() {
            let option = coprocessor.trivial(FheType::Uint8, U256::from(option));
            *slot = coprocessor.eq(vote, option)?;
        }
        Ok(matches)
    }

    fn check_vote(&self, vote: Handle, input_proof: &[u8]) -> Result<TxOutcome, MockError> {
        let MockContext {
            address,
            coprocessor,
            sender,
        } = &self.context;
        let vote = coprocessor.from_external(vote, input_proof, *sender, *address)?;
        let [is_zero, is_one] = self.matches_options(vote)?;
        let valid = coprocessor.or(is_zero, is_one)?;
        coprocessor.allow(valid, *address)?;
        coprocessor.allow(valid, *sender)?;
        lock(&self.state).vote_is_valid = valid;
        Ok(coprocessor.record_tx(*address, None))
    }

    fn cast(&self, vote: Handle, input_proof: &[u8]) -> Result<TxOutcome, MockError> {
        let MockContext {
            address,
            coprocessor,
            sender,
        } = &self.context;
        if lock(&self.state).winning.is_some() {
            return Err(MockError::Reverted("Voting is finalized".into()));
        }
        let vote = coprocessor.from_external(vote, input_proof, *sender, *address)?;
        let matches = self.matches_options(vote)?;

        let one = coprocessor.trivial(FheType::Uint16, U256::from(1u8));
        let zero = coprocessor.trivial(FheType::Uint16, U256::ZERO);
        let mut state = lock(&self.state);
        for (tally, matched) in state.tallies.iter_mut().zip(matches) {
            let increment = coprocessor.select(matched, one, zero)?;
            *tally = coprocessor.add(*tally, increment)?;
            coprocessor.allow(*tally, *address)?;
        }
        state.total_votes += 1;
        Ok(coprocessor.record_tx(*address, None))
    }

    fn tally_up(&self) -> Result<TxOutcome, MockError> {
        let MockContext {
            address,
            coprocessor,
            ..
        } = &self.context;
        let mut state = lock(&self.state);
        if state.winning.is_some() {
            return Err(MockError::Reverted("Voting is already finalized".into()));
        }
        let [tally_zero, tally_one] = state.tallies;

        // ties go to option 0
        let one_wins = coprocessor.gt(tally_one, tally_zero)?;
        let option = coprocessor.select(
            one_wins,
            coprocessor.trivial(FheType::Uint8, U256::from(1u8)),
            coprocessor.trivial(FheType::Uint8, U256::ZERO),
        )?;
        let tally = coprocessor.select(one_wins, tally_one, tally_zero)?;
        for handle in [option, tally] {
            coprocessor.allow(handle, *address)?;
            coprocessor.make_publicly_decryptable(handle)?;
        }
        state.winning = Some((option, tally));
        Ok(coprocessor.record_tx(*address, None))
    }
}

#[async_trait]
impl ConfidentialVoting for MockEncryptedVoting {
    fn address(&self) -> Address {
        self.context.address
    }

    async fn is_valid_vote(&self, vote: Handle, input_proof: Bytes) -> Result<TxOutcome> {
        Ok(self.check_vote(vote, &input_proof)?)
    }

    async fn vote_is_valid(&self) -> Result<Handle> {
        Ok(lock(&self.state).vote_is_valid)
    }

    async fn cast_vote(&self, vote: Handle, input_proof: Bytes) -> Result<TxOutcome> {
        Ok(self.cast(vote, &input_proof)?)
    }

    async fn total_votes(&self) -> Result<u64> {
        Ok(lock(&self.state).total_votes)
    }

    async fn finalize(&self) -> Result<TxOutcome> {
        Ok(self.tally_up()?)
    }

    async fn winning(&self) -> Result<(Handle, Handle)> {
        Ok(lock(&self.state)
            .winning
            .unwrap_or((Handle::ZERO, Handle::ZERO)))
    }
}
