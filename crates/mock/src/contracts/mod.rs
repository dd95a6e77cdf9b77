// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod counter;
mod store;
mod voting;

pub use counter::*;
pub use store::*;
pub use voting::*;

use crate::coprocessor::MockCoprocessor;
use alloy::primitives::Address;
use std::sync::{Arc, Mutex, MutexGuard};

/// What every mock contract carries: its address, the coprocessor it computes with and the
/// account calling it.
#[derive(Clone)]
pub(crate) struct MockContext {
    pub(crate) address: Address,
    pub(crate) coprocessor: MockCoprocessor,
    pub(crate) sender: Address,
}

pub(crate) fn lock<T>(state: &Arc<Mutex<T>>) -> MutexGuard<'_, T> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}
