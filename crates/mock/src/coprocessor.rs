// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::error::MockError;
use alloy::{
    primitives::{keccak256, Address, Bytes, Signature, B256, U256},
    signers::{local::PrivateKeySigner, SignerSync},
    sol_types::SolValue,
};
use ctk_evm::TxOutcome;
use ctk_fhevm::{
    derive_input_handles, CleartextEngine, ClearValue, EncryptedInput, FheType, Handle,
    InputProof, COMPUTED_HANDLE_INDEX, DEFAULT_EXTRA_DATA,
};
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::{debug, trace};

/// Chain id of the local hardhat network
pub const MOCK_CHAIN_ID: u64 = 31337;

#[derive(Default)]
struct State {
    values: HashMap<Handle, U256>,
    acl: HashMap<Handle, HashSet<Address>>,
    public: HashSet<Handle>,
    computed: u64,
    block: u64,
}

/// Plaintext simulation of the FHE coprocessor: a handle store, the ACL, the FHE operations
/// contracts call and the signer that attests input proofs.
///
/// Clones share state.
#[derive(Clone)]
pub struct MockCoprocessor {
    state: Arc<Mutex<State>>,
    signer: PrivateKeySigner,
    chain_id: u64,
    acl_contract_address: Address,
}

impl MockCoprocessor {
    pub fn new(chain_id: u64, acl_contract_address: Address) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            signer: PrivateKeySigner::random(),
            chain_id,
            acl_contract_address,
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn signer_address(&self) -> Address {
        self.signer.address()
    }

    fn input_digest(handles: &[Handle], user: Address, contract: Address, chain_id: u64) -> B256 {
        let handles: Vec<B256> = handles.iter().map(|h| h.as_b256()).collect();
        keccak256((handles, user, contract, U256::from(chain_id)).abi_encode())
    }

    /// Register the values packed in `ciphertext` and attest them for `(contract, user)`
    pub fn process_input(
        &self,
        ciphertext: &[u8],
        contract: Address,
        user: Address,
    ) -> Result<EncryptedInput, MockError> {
        let values = CleartextEngine::unpack(ciphertext)?;
        let types: Vec<FheType> = values.iter().map(|v| v.ty).collect();
        let handles =
            derive_input_handles(ciphertext, &types, self.acl_contract_address, self.chain_id);

        {
            let mut state = self.state();
            for (handle, value) in handles.iter().zip(&values) {
                state.values.insert(*handle, value.value);
            }
        }

        let digest = Self::input_digest(&handles, user, contract, self.chain_id);
        let signature = self
            .signer
            .sign_hash_sync(&digest)
            .map_err(ctk_fhevm::FhevmError::from)?;
        let input_proof = InputProof {
            handles: handles.clone(),
            signatures: vec![Bytes::copy_from_slice(&signature.as_bytes())],
            extra_data: Bytes::from_static(&DEFAULT_EXTRA_DATA),
        }
        .encode()?;

        debug!("Coprocessor attested {} input handle(s)", handles.len());
        Ok(EncryptedInput {
            handles,
            input_proof,
        })
    }

    /// Verify that `handle` was attested for `(contract, user)` and hand it to `contract`
    pub fn from_external(
        &self,
        handle: Handle,
        input_proof: &[u8],
        user: Address,
        contract: Address,
    ) -> Result<Handle, MockError> {
        let proof = InputProof::parse(input_proof)?;
        if !proof.handles.contains(&handle) {
            return Err(MockError::InvalidProof(format!(
                "handle {handle} is not part of the proof"
            )));
        }
        let digest = Self::input_digest(&proof.handles, user, contract, self.chain_id);
        let attested = proof.signatures.iter().any(|sig| {
            Signature::from_raw(sig)
                .and_then(|sig| sig.recover_address_from_prehash(&digest))
                .map(|signer| signer == self.signer.address())
                .unwrap_or(false)
        });
        if !attested {
            return Err(MockError::InvalidProof(format!(
                "proof was not issued for user {user} and contract {contract}"
            )));
        }

        let mut state = self.state();
        if !state.values.contains_key(&handle) {
            return Err(MockError::UnknownHandle(handle));
        }
        state.acl.entry(handle).or_default().insert(contract);
        Ok(handle)
    }

    fn store_computed(&self, op: &str, operands: &[Handle], ty: FheType, value: U256) -> Handle {
        let mut state = self.state();
        state.computed += 1;
        let mut preimage = op.as_bytes().to_vec();
        for operand in operands {
            preimage.extend_from_slice(operand.as_slice());
        }
        preimage.extend_from_slice(&state.computed.to_be_bytes());
        let handle = Handle::compose(
            keccak256(&preimage),
            COMPUTED_HANDLE_INDEX,
            self.chain_id,
            ty,
        );
        state.values.insert(handle, ty.truncate(value));
        trace!("{op} -> {handle}");
        handle
    }

    fn operand(&self, handle: Handle) -> Result<(FheType, U256), MockError> {
        let ty = handle.fhe_type()?;
        let value = self
            .state()
            .values
            .get(&handle)
            .copied()
            .ok_or(MockError::UnknownHandle(handle))?;
        Ok((ty, value))
    }

    fn operands(&self, a: Handle, b: Handle) -> Result<(FheType, U256, U256), MockError> {
        let (left, a_value) = self.operand(a)?;
        let (right, b_value) = self.operand(b)?;
        if left != right {
            return Err(MockError::TypeMismatch { left, right });
        }
        Ok((left, a_value, b_value))
    }

    pub fn trivial(&self, ty: FheType, value: U256) -> Handle {
        self.store_computed("trivialEncrypt", &[], ty, value)
    }

    pub fn add(&self, a: Handle, b: Handle) -> Result<Handle, MockError> {
        let (ty, x, y) = self.operands(a, b)?;
        Ok(self.store_computed("add", &[a, b], ty, x.wrapping_add(y)))
    }

    pub fn sub(&self, a: Handle, b: Handle) -> Result<Handle, MockError> {
        let (ty, x, y) = self.operands(a, b)?;
        Ok(self.store_computed("sub", &[a, b], ty, x.wrapping_sub(y)))
    }

    pub fn eq(&self, a: Handle, b: Handle) -> Result<Handle, MockError> {
        let (_, x, y) = self.operands(a, b)?;
        Ok(self.store_computed("eq", &[a, b], FheType::Bool, U256::from(u8::from(x == y))))
    }

    pub fn gt(&self, a: Handle, b: Handle) -> Result<Handle, MockError> {
        let (_, x, y) = self.operands(a, b)?;
        Ok(self.store_computed("gt", &[a, b], FheType::Bool, U256::from(u8::from(x > y))))
    }

    pub fn or(&self, a: Handle, b: Handle) -> Result<Handle, MockError> {
        let (ty, x, y) = self.operands(a, b)?;
        Ok(self.store_computed("or", &[a, b], ty, x | y))
    }

    pub fn select(
        &self,
        condition: Handle,
        if_true: Handle,
        if_false: Handle,
    ) -> Result<Handle, MockError> {
        let (cond_ty, cond) = self.operand(condition)?;
        if cond_ty != FheType::Bool {
            return Err(MockError::UnexpectedType {
                expected: FheType::Bool,
                found: cond_ty,
            });
        }
        let (ty, x, y) = self.operands(if_true, if_false)?;
        let value = if cond.is_zero() { y } else { x };
        Ok(self.store_computed("select", &[condition, if_true, if_false], ty, value))
    }

    pub fn as_type(&self, handle: Handle, ty: FheType) -> Result<Handle, MockError> {
        let (_, value) = self.operand(handle)?;
        Ok(self.store_computed("cast", &[handle], ty, value))
    }

    pub fn allow(&self, handle: Handle, account: Address) -> Result<(), MockError> {
        let mut state = self.state();
        if !state.values.contains_key(&handle) {
            return Err(MockError::UnknownHandle(handle));
        }
        state.acl.entry(handle).or_default().insert(account);
        Ok(())
    }

    pub fn is_allowed(&self, handle: Handle, account: Address) -> bool {
        self.state()
            .acl
            .get(&handle)
            .is_some_and(|accounts| accounts.contains(&account))
    }

    pub fn make_publicly_decryptable(&self, handle: Handle) -> Result<(), MockError> {
        let mut state = self.state();
        if !state.values.contains_key(&handle) {
            return Err(MockError::UnknownHandle(handle));
        }
        state.public.insert(handle);
        Ok(())
    }

    pub fn is_publicly_decryptable(&self, handle: Handle) -> bool {
        self.state().public.contains(&handle)
    }

    /// Plaintext behind a handle, typed by the handle
    pub fn clear_value(&self, handle: Handle) -> Result<ClearValue, MockError> {
        let (ty, value) = self.operand(handle)?;
        Ok(ClearValue::from_word(ty, value))
    }

    /// Mine a mock transaction
    pub fn record_tx(&self, to: Address, contract_address: Option<Address>) -> TxOutcome {
        let mut state = self.state();
        state.block += 1;
        let block = state.block;
        TxOutcome {
            transaction_hash: keccak256((to, U256::from(block)).abi_encode()),
            block_number: Some(block),
            contract_address,
        }
    }
}
