// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::receipt::TxOutcome;
use alloy::{
    primitives::{Address, Bytes},
    providers::DynProvider,
    sol,
};
use anyhow::Result;
use async_trait::async_trait;
use ctk_fhevm::Handle;
use tracing::info;

// Encrypted arguments (`externalEuintX`) and encrypted state (`euintX`, `ebool`) are
// user defined value types over bytes32 and appear as such in the ABI.
sol! {
    #[sol(rpc)]
    contract FHECounter {
        function getCount() external view returns (bytes32);
        function increment(bytes32 inputEuint32, bytes calldata inputProof) external;
        function decrement(bytes32 inputEuint32, bytes calldata inputProof) external;
    }

    #[sol(rpc)]
    contract Test {
        function encryptedSimpleValue() external view returns (bytes32);
        function encryptedSum() external view returns (bytes32);
        function storeEncryptedSimpleValue(bytes32 inputEuint8, bytes calldata inputProof) external;
        function storeEncryptedSum(bytes32 inputA, bytes32 inputB, bytes calldata inputProof) external;
    }

    #[sol(rpc)]
    contract EncryptedVoting {
        function isValidVote(bytes32 inputEuint8, bytes calldata inputProof) external;
        function voteIsValid() external view returns (bytes32);
        function castVote(bytes32 inputEuint8, bytes calldata inputProof) external;
        function totalVotes() external view returns (uint256);
        function finalize() external;
        function winning() external view returns (bytes32 winningOption, bytes32 winningTally);
    }
}

/// Counter holding an encrypted `euint32`.
#[async_trait]
pub trait ConfidentialCounter: Send + Sync {
    fn address(&self) -> Address;

    /// Handle of the current count. The zero handle means the counter was never written.
    async fn get_count(&self) -> Result<Handle>;

    async fn increment(&self, value: Handle, input_proof: Bytes) -> Result<TxOutcome>;

    async fn decrement(&self, value: Handle, input_proof: Bytes) -> Result<TxOutcome>;
}

/// Contract storing an encrypted `euint8` and the sum of two, both publicly decryptable.
#[async_trait]
pub trait ConfidentialStore: Send + Sync {
    fn address(&self) -> Address;

    async fn encrypted_simple_value(&self) -> Result<Handle>;

    async fn store_encrypted_simple_value(&self, value: Handle, input_proof: Bytes)
        -> Result<TxOutcome>;

    async fn encrypted_sum(&self) -> Result<Handle>;

    async fn store_encrypted_sum(
        &self,
        a: Handle,
        b: Handle,
        input_proof: Bytes,
    ) -> Result<TxOutcome>;
}

/// Two option ballot over encrypted votes.
#[async_trait]
pub trait ConfidentialVoting: Send + Sync {
    fn address(&self) -> Address;

    /// Stores an encrypted flag telling whether the vote is 0 or 1
    async fn is_valid_vote(&self, vote: Handle, input_proof: Bytes) -> Result<TxOutcome>;

    async fn vote_is_valid(&self) -> Result<Handle>;

    async fn cast_vote(&self, vote: Handle, input_proof: Bytes) -> Result<TxOutcome>;

    async fn total_votes(&self) -> Result<u64>;

    async fn finalize(&self) -> Result<TxOutcome>;

    /// Handles of the winning option and its tally
    async fn winning(&self) -> Result<(Handle, Handle)>;
}

/// A deployed contract reached through an RPC provider.
#[derive(Clone)]
pub struct LiveContract {
    address: Address,
    provider: DynProvider,
}

impl LiveContract {
    pub fn new(address: Address, provider: DynProvider) -> Self {
        Self { address, provider }
    }
}

macro_rules! send_and_wait {
    ($call:expr) => {{
        let pending = $call.send().await?;
        info!("Waiting for transaction {}", pending.tx_hash());
        let receipt = pending.get_receipt().await?;
        TxOutcome::from_receipt(&receipt)
    }};
}

#[async_trait]
impl ConfidentialCounter for LiveContract {
    fn address(&self) -> Address {
        self.address
    }

    async fn get_count(&self) -> Result<Handle> {
        let contract = FHECounter::new(self.address, &self.provider);
        Ok(contract.getCount().call().await?.into())
    }

    async fn increment(&self, value: Handle, input_proof: Bytes) -> Result<TxOutcome> {
        let contract = FHECounter::new(self.address, &self.provider);
        send_and_wait!(contract.increment(value.into(), input_proof))
    }

    async fn decrement(&self, value: Handle, input_proof: Bytes) -> Result<TxOutcome> {
        let contract = FHECounter::new(self.address, &self.provider);
        send_and_wait!(contract.decrement(value.into(), input_proof))
    }
}

#[async_trait]
impl ConfidentialStore for LiveContract {
    fn address(&self) -> Address {
        self.address
    }

    async fn encrypted_simple_value(&self) -> Result<Handle> {
        let contract = Test::new(self.address, &self.provider);
        Ok(contract.encryptedSimpleValue().call().await?.into())
    }

    async fn store_encrypted_simple_value(
        &self,
        value: Handle,
        input_proof: Bytes,
    ) -> Result<TxOutcome> {
        let contract = Test::new(self.address, &self.provider);
        send_and_wait!(contract.storeEncryptedSimpleValue(value.into(), input_proof))
    }

    async fn encrypted_sum(&self) -> Result<Handle> {
        let contract = Test::new(self.address, &self.provider);
        Ok(contract.encryptedSum().call().await?.into())
    }

    async fn store_encrypted_sum(
        &self,
        a: Handle,
        b: Handle,
        input_proof: Bytes,
    ) -> Result<TxOutcome> {
        let contract = Test::new(self.address, &self.provider);
        send_and_wait!(contract.storeEncryptedSum(a.into(), b.into(), input_proof))
    }
}

#[async_trait]
impl ConfidentialVoting for LiveContract {
    fn address(&self) -> Address {
        self.address
    }

    async fn is_valid_vote(&self, vote: Handle, input_proof: Bytes) -> Result<TxOutcome> {
        let contract = EncryptedVoting::new(self.address, &self.provider);
        send_and_wait!(contract.isValidVote(vote.into(), input_proof))
    }

    async fn vote_is_valid(&self) -> Result<Handle> {
        let contract = EncryptedVoting::new(self.address, &self.provider);
        Ok(contract.voteIsValid().call().await?.into())
    }

    async fn cast_vote(&self, vote: Handle, input_proof: Bytes) -> Result<TxOutcome> {
        let contract = EncryptedVoting::new(self.address, &self.provider);
        send_and_wait!(contract.castVote(vote.into(), input_proof))
    }

    async fn total_votes(&self) -> Result<u64> {
        let contract = EncryptedVoting::new(self.address, &self.provider);
        let total = contract.totalVotes().call().await?;
        Ok(u64::try_from(total)?)
    }

    async fn finalize(&self) -> Result<TxOutcome> {
        let contract = EncryptedVoting::new(self.address, &self.provider);
        send_and_wait!(contract.finalize())
    }

    async fn winning(&self) -> Result<(Handle, Handle)> {
        let contract = EncryptedVoting::new(self.address, &self.provider);
        let winning = contract.winning().call().await?;
        Ok((winning.winningOption.into(), winning.winningTally.into()))
    }
}
