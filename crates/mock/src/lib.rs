// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! In-process stand-ins for the FHE coprocessor, the FHE client and the confidential
//! contracts, so that every task can run without a chain or a relayer.

mod contracts;
mod coprocessor;
mod error;
mod fhevm;
mod network;

pub use contracts::*;
pub use coprocessor::*;
pub use error::*;
pub use fhevm::*;
pub use network::*;
