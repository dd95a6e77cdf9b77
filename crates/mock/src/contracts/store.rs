// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use super::{lock, MockContext};
use crate::{coprocessor::MockCoprocessor, error::MockError};
use alloy::primitives::{Address, Bytes};
use anyhow::Result;
use async_trait::async_trait;
use ctk_evm::{ConfidentialStore, TxOutcome};
use ctk_fhevm::Handle;
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub(crate) struct StoreState {
    simple_value: Handle,
    sum: Handle,
}

/// Mock of the `Test` contract. Everything it stores is publicly decryptable.
#[derive(Clone)]
pub struct MockSimpleStore {
    context: MockContext,
    state: Arc<Mutex<StoreState>>,
}

impl MockSimpleStore {
    pub(crate) fn new(address: Address, coprocessor: MockCoprocessor, sender: Address) -> Self {
        Self {
            context: MockContext {
                address,
                coprocessor,
                sender,
            },
            state: Arc::new(Mutex::new(StoreState::default())),
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

    fn publish(&self, handle: Handle) -> Result<(), MockError> {
        let coprocessor = &self.context.coprocessor;
        coprocessor.allow(handle, self.context.address)?;
        coprocessor.make_publicly_decryptable(handle)
    }

    fn store_simple_value(&self, value: Handle, input_proof: &[u8]) -> Result<TxOutcome, MockError> {
        let MockContext {
            address,
            coprocessor,
            sender,
        } = &self.context;
        let value = coprocessor.from_external(value, input_proof, *sender, *address)?;
        self.publish(value)?;
        lock(&self.state).simple_value = value;
        Ok(coprocessor.record_tx(*address, None))
    }

    fn store_sum(&self, a: Handle, b: Handle, input_proof: &[u8]) -> Result<TxOutcome, MockError> {
        let MockContext {
            address,
            coprocessor,
            sender,
        } = &self.context;
        let a = coprocessor.from_external(a, input_proof, *sender, *address)?;
        let b = coprocessor.from_external(b, input_proof, *sender, *address)?;
        let sum = coprocessor.add(a, b)?;
        self.publish(sum)?;
        lock(&self.state).sum = sum;
        Ok(coprocessor.record_tx(*address, None))
    }
}

#[async_trait]
impl ConfidentialStore for MockSimpleStore {
    fn address(&self) -> Address {
        self.context.address
    }

    async fn encrypted_simple_value(&self) -> Result<Handle> {
        Ok(lock(&self.state).simple_value)
    }

    async fn store_encrypted_simple_value(
        &self,
        value: Handle,
        input_proof: Bytes,
    ) -> Result<TxOutcome> {
        Ok(self.store_simple_value(value, &input_proof)?)
    }

    async fn encrypted_sum(&self) -> Result<Handle> {
        Ok(lock(&self.state).sum)
    }

    async fn store_encrypted_sum(
        &self,
        a: Handle,
        b: Handle,
        input_proof: Bytes,
    ) -> Result<TxOutcome> {
        Ok(self.store_sum(a, b, &input_proof)?)
    }
}
