// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

pub mod address_file;
mod balance;
mod contracts;
mod deploy;
pub mod helpers;
mod receipt;

pub use balance::*;
pub use contracts::*;
pub use deploy::*;
pub use helpers::*;
pub use receipt::*;
