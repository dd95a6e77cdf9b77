// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::{
    network::ReceiptResponse as _,
    primitives::{Address, TxHash},
    rpc::types::TransactionReceipt,
};
use anyhow::{bail, Result};
use std::fmt;

/// What a task reports about a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxOutcome {
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
    pub contract_address: Option<Address>,
}

impl TxOutcome {
    /// Fails when the transaction reverted
    pub fn from_receipt(receipt: &TransactionReceipt) -> Result<Self> {
        if !receipt.status() {
            bail!("Transaction {} reverted", receipt.transaction_hash);
        }
        Ok(Self {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            contract_address: receipt.contract_address,
        })
    }
}

impl fmt::Display for TxOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transaction {}", self.transaction_hash)?;
        if let Some(block) = self.block_number {
            write!(f, " mined in block {block}")?;
        }
        Ok(())
    }
}
