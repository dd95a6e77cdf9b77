// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{coprocessor::MockCoprocessor, error::MockError};
use alloy::{
    hex,
    primitives::{Address, Bytes},
};
use async_trait::async_trait;
use ctk_fhevm::{
    CleartextEngine, ClearValue, EncryptedInput, EncryptedInputBuilder, FheEngine, FhevmError,
    FhevmInstance, Handle, Keypair, UserDecryptEip712, UserDecryptRequest,
};
use serde_json::json;
use std::collections::HashMap;
use tracing::debug;

/// FHE client answering from the in-process coprocessor. It enforces the same rules the
/// relayer and KMS would: signed and unexpired requests, matching keypairs and ACL grants.
#[derive(Clone)]
pub struct MockFhevm {
    coprocessor: MockCoprocessor,
    engine: CleartextEngine,
    gateway_chain_id: u64,
    decryption_contract_address: Address,
}

impl MockFhevm {
    pub fn new(
        coprocessor: MockCoprocessor,
        gateway_chain_id: u64,
        decryption_contract_address: Address,
    ) -> Self {
        Self {
            coprocessor,
            engine: CleartextEngine,
            gateway_chain_id,
            decryption_contract_address,
        }
    }

    pub fn coprocessor(&self) -> &MockCoprocessor {
        &self.coprocessor
    }

    fn check_user_decrypt(&self, request: &UserDecryptRequest) -> Result<(), FhevmError> {
        let eip712 = self.create_eip712(
            &request.keypair.public_key,
            &request.contract_addresses,
            request.start_timestamp,
            request.duration_days,
        )?;
        let signer = eip712.recover_signer(&request.signature)?;
        if signer != request.user_address {
            return Err(FhevmError::InvalidSignature(format!(
                "request signed by {signer}, expected {}",
                request.user_address
            )));
        }

        let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default();
        if !eip712.is_valid_at(now) {
            return Err(FhevmError::Denied(format!(
                "request is valid for {} day(s) from {}, now is {now}",
                request.duration_days, request.start_timestamp
            )));
        }

        if !CleartextEngine::keypair_matches(&request.keypair) {
            return Err(FhevmError::Denied(
                "public key does not belong to the keypair".into(),
            ));
        }

        for pair in &request.handle_contract_pairs {
            if !request.contract_addresses.contains(&pair.contract_address) {
                return Err(FhevmError::Denied(format!(
                    "contract {} is not covered by the signed request",
                    pair.contract_address
                )));
            }
            if pair.contract_address == request.user_address {
                return Err(FhevmError::Denied(
                    "user address must differ from the contract address".into(),
                ));
            }
            for account in [request.user_address, pair.contract_address] {
                if !self.coprocessor.is_allowed(pair.handle, account) {
                    return Err(MockError::NotAllowed {
                        handle: pair.handle,
                        account,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl FhevmInstance for MockFhevm {
    fn is_mock(&self) -> bool {
        true
    }

    async fn encrypt(&self, input: &EncryptedInputBuilder) -> Result<EncryptedInput, FhevmError> {
        if input.values().is_empty() {
            return Err(FhevmError::EmptyInput);
        }
        let ciphertext = CleartextEngine::pack(input.values())?;
        Ok(self.coprocessor.process_input(
            &ciphertext,
            input.contract_address(),
            input.user_address(),
        )?)
    }

    fn generate_keypair(&self) -> Result<Keypair, FhevmError> {
        self.engine.generate_keypair()
    }

    fn create_eip712(
        &self,
        public_key: &Bytes,
        contract_addresses: &[Address],
        start_timestamp: u64,
        duration_days: u64,
    ) -> Result<UserDecryptEip712, FhevmError> {
        UserDecryptEip712::new(
            self.gateway_chain_id,
            self.decryption_contract_address,
            public_key,
            contract_addresses,
            start_timestamp,
            duration_days,
        )
    }

    async fn user_decrypt(
        &self,
        request: UserDecryptRequest,
    ) -> Result<HashMap<Handle, ClearValue>, FhevmError> {
        self.check_user_decrypt(&request)?;

        let handles = request.handles();
        let mut words = Vec::with_capacity(handles.len() * 32);
        for handle in &handles {
            let value = self.coprocessor.clear_value(*handle)?;
            words.extend_from_slice(&value.to_word().to_be_bytes::<32>());
        }
        debug!("Mock KMS releasing {} value(s)", handles.len());

        let shares = json!([{ "payload": hex::encode(&words), "signature": "" }]);
        let values = self
            .engine
            .reconstruct_user_decrypt(&request.keypair, &handles, &shares)?;
        Ok(handles.into_iter().zip(values).collect())
    }

    async fn public_decrypt(
        &self,
        handles: &[Handle],
    ) -> Result<HashMap<Handle, ClearValue>, FhevmError> {
        handles
            .iter()
            .map(|handle| -> Result<(Handle, ClearValue), FhevmError> {
                if !self.coprocessor.is_publicly_decryptable(*handle) {
                    return Err(MockError::NotPublic(*handle).into());
                }
                Ok((*handle, self.coprocessor.clear_value(*handle)?))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coprocessor::MOCK_CHAIN_ID;

    fn fhevm() -> MockFhevm {
        MockFhevm::new(
            MockCoprocessor::new(MOCK_CHAIN_ID, Address::repeat_byte(0xac)),
            55815,
            Address::repeat_byte(0xde),
        )
    }

    async fn encrypt32(
        fhevm: &MockFhevm,
        contract: Address,
        user: Address,
        value: u64,
    ) -> Result<Handle, FhevmError> {
        let mut builder = fhevm.create_encrypted_input(contract, user);
        builder.add32(value)?;
        Ok(fhevm.encrypt(&builder).await?.handles[0])
    }

    #[tokio::test]
    async fn test_equal_inputs_get_distinct_handles() -> Result<(), FhevmError> {
        let fhevm = fhevm();
        let counter = Address::repeat_byte(1);
        let (alice, bob) = (Address::repeat_byte(2), Address::repeat_byte(3));

        let from_alice = encrypt32(&fhevm, counter, alice, 7).await?;
        let from_bob = encrypt32(&fhevm, counter, bob, 7).await?;
        let alice_again = encrypt32(&fhevm, counter, alice, 7).await?;

        assert_ne!(from_alice, from_bob);
        assert_ne!(from_alice, alice_again);
        for handle in [from_alice, from_bob, alice_again] {
            assert_eq!(
                fhevm.coprocessor().clear_value(handle)?,
                ClearValue::from(7u64)
            );
        }
        Ok(())
    }
}
