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
use ctk_evm::{ConfidentialCounter, TxOutcome};
use ctk_fhevm::{FheType, Handle};
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub(crate) struct CounterState {
    count: Handle,
}

/// Mock of the `FHECounter` contract: an `euint32` that callers add to or subtract from.
#[derive(Clone)]
pub struct MockFheCounter {
    context: MockContext,
    state: Arc<Mutex<CounterState>>,
}

impl MockFheCounter {
    pub(crate) fn new(address: Address, coprocessor: MockCoprocessor, sender: Address) -> Self {
        Self {
            context: MockContext {
                address,
                coprocessor,
                sender,
            },
            state: Arc::new(Mutex::new(CounterState::default())),
        }
    }

    /// The same deployment called by `sender`
    pub fn connect(&self, sender: Address) -> Self {
        Self {
            context: MockContext {
                sender,
                ..self.context.clone()
            },
            state: self.state.clone(),
        }
    }

    fn apply(
        &self,
        value: Handle,
        input_proof: &[u8],
        op: fn(&MockCoprocessor, Handle, Handle) -> Result<Handle, MockError>,
    ) -> Result<TxOutcome, MockError> {
        let MockContext {
            address,
            coprocessor,
            sender,
        } = &self.context;
        let value = coprocessor.from_external(value, input_proof, *sender, *address)?;

        let mut state = lock(&self.state);
        let current = if state.count.is_zero() {
            coprocessor.trivial(FheType::Uint32, U256::ZERO)
        } else {
            state.count
        };
        let count = op(coprocessor, current, value)?;
        coprocessor.allow(count, *address)?;
        coprocessor.allow(count, *sender)?;
        state.count = count;
        Ok(coprocessor.record_tx(*address, None))
    }
}

#[async_trait]
impl ConfidentialCounter for MockFheCounter {
    fn address(&self) -> Address {
        self.context.address
    }

    async fn get_count(&self) -> Result<Handle> {
        Ok(lock(&self.state).count)
    }

    async fn increment(&self, value: Handle, input_proof: Bytes) -> Result<TxOutcome> {
        Ok(self.apply(value, &input_proof, MockCoprocessor::add)?)
    }

    async fn decrement(&self, value: Handle, input_proof: Bytes) -> Result<TxOutcome> {
        Ok(self.apply(value, &input_proof, MockCoprocessor::sub)?)
    }
}
