// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    contracts::{MockEncryptedVoting, MockFheCounter, MockSimpleStore},
    coprocessor::{MockCoprocessor, MOCK_CHAIN_ID},
    error::MockError,
    fhevm::MockFhevm,
};
use alloy::primitives::{Address, U256};
use ctk_config::TestnetConfig;
use ctk_evm::TxOutcome;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::info;

/// Gateway chain id of the hardhat fhevm setup
pub const MOCK_GATEWAY_CHAIN_ID: u64 = 55815;

/// Balance every account holds on the mocked network, in ether
/// 10000 ether in wei, the balance of every mocked account
pub const MOCK_ACCOUNT_BALANCE: U256 = U256::from_limbs([1_864_712_049_423_024_128, 542, 0, 0]);

#[derive(Clone)]
enum Deployed {
    Counter(MockFheCounter),
    Store(MockSimpleStore),
    Voting(MockEncryptedVoting),
}

impl Deployed {
    fn kind(&self) -> &'static str {
        match self {
            Deployed::Counter(_) => "FHECounter",
            Deployed::Store(_) => "Test",
            Deployed::Voting(_) => "EncryptedVoting",
        }
    }
}

impl From<MockFheCounter> for Deployed {
    fn from(value: MockFheCounter) -> Self {
        Deployed::Counter(value)
    }
}

impl From<MockSimpleStore> for Deployed {
    fn from(value: MockSimpleStore) -> Self {
        Deployed::Store(value)
    }
}

impl From<MockEncryptedVoting> for Deployed {
    fn from(value: MockEncryptedVoting) -> Self {
        Deployed::Voting(value)
    }
}

#[derive(Default)]
struct Registry {
    contracts: HashMap<Address, Deployed>,
    nonces: HashMap<Address, u64>,
}

/// An ephemeral FHE network living inside the process: one coprocessor, the FHE client
/// that talks to it and every mock contract deployed so far.
#[derive(Clone)]
pub struct MockNetwork {
    coprocessor: MockCoprocessor,
    fhevm: MockFhevm,
    registry: Arc<Mutex<Registry>>,
}

impl Default for MockNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::with_addresses(
            MOCK_CHAIN_ID,
            MOCK_GATEWAY_CHAIN_ID,
            Address::repeat_byte(0xac),
            Address::repeat_byte(0xde),
        )
    }

    /// Mock network using the chain ids and system contract addresses of a config file
    pub fn from_config(config: &TestnetConfig) -> Self {
        Self::with_addresses(
            config.chain_id().unwrap_or(MOCK_CHAIN_ID),
            config.gateway_chain_id(),
            config.acl_contract_address(),
            config.decryption_contract_address(),
        )
    }

    fn with_addresses(
        chain_id: u64,
        gateway_chain_id: u64,
        acl_contract_address: Address,
        decryption_contract_address: Address,
    ) -> Self {
        let coprocessor = MockCoprocessor::new(chain_id, acl_contract_address);
        let fhevm = MockFhevm::new(
            coprocessor.clone(),
            gateway_chain_id,
            decryption_contract_address,
        );
        Self {
            coprocessor,
            fhevm,
            registry: Arc::new(Mutex::new(Registry::default())),
        }
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn fhevm(&self) -> &MockFhevm {
        &self.fhevm
    }

    pub fn coprocessor(&self) -> &MockCoprocessor {
        &self.coprocessor
    }

    pub fn chain_id(&self) -> u64 {
        self.coprocessor.chain_id()
    }

    /// Every account is prefunded
    pub fn balance(&self, _address: Address) -> U256 {
        MOCK_ACCOUNT_BALANCE
    }

    fn deploy<C>(&self, deployer: Address, build: impl FnOnce(Address) -> C) -> (C, TxOutcome)
    where
        C: Clone + Into<Deployed>,
    {
        let mut registry = self.registry();
        let nonce = registry.nonces.entry(deployer).or_default();
        let address = deployer.create(*nonce);
        *nonce += 1;

        let contract = build(address);
        let deployed: Deployed = contract.clone().into();
        info!("Deployed mock {} at {address}", deployed.kind());
        registry.contracts.insert(address, deployed);
        drop(registry);

        let outcome = self.coprocessor.record_tx(Address::ZERO, Some(address));
        (contract, outcome)
    }

    pub fn deploy_counter(&self, deployer: Address) -> (MockFheCounter, TxOutcome) {
        let coprocessor = self.coprocessor.clone();
        self.deploy(deployer, |address| {
            MockFheCounter::new(address, coprocessor, deployer)
        })
    }

    pub fn deploy_simple_store(&self, deployer: Address) -> (MockSimpleStore, TxOutcome) {
        let coprocessor = self.coprocessor.clone();
        self.deploy(deployer, |address| {
            MockSimpleStore::new(address, coprocessor, deployer)
        })
    }

    pub fn deploy_voting(
        &self,
        deployer: Address,
        question: &str,
    ) -> (MockEncryptedVoting, TxOutcome) {
        let coprocessor = self.coprocessor.clone();
        self.deploy(deployer, |address| {
            MockEncryptedVoting::new(address, coprocessor, deployer, question)
        })
    }

    fn lookup(&self, address: Address) -> Result<Deployed, MockError> {
        self.registry()
            .contracts
            .get(&address)
            .cloned()
            .ok_or(MockError::NoContract(address))
    }

    pub fn counter_at(&self, address: Address, sender: Address) -> Result<MockFheCounter, MockError> {
        match self.lookup(address)? {
            Deployed::Counter(counter) => Ok(counter.connect(sender)),
            _ => Err(MockError::NoContract(address)),
        }
    }

    pub fn store_at(&self, address: Address, sender: Address) -> Result<MockSimpleStore, MockError> {
        match self.lookup(address)? {
            Deployed::Store(store) => Ok(store.connect(sender)),
            _ => Err(MockError::NoContract(address)),
        }
    }

    pub fn voting_at(
        &self,
        address: Address,
        sender: Address,
    ) -> Result<MockEncryptedVoting, MockError> {
        match self.lookup(address)? {
            Deployed::Voting(voting) => Ok(voting.connect(sender)),
            _ => Err(MockError::NoContract(address)),
        }
    }
}
