// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod error;
pub mod load_config;
pub mod network;
pub mod rpc;
mod testnet;
pub mod validation;

pub use error::*;
pub use network::Network;
pub use rpc::*;
pub use testnet::*;
