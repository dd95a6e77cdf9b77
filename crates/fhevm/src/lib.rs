// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod buffer;
mod decrypt;
mod eip712;
mod engine;
mod error;
mod input;
mod instance;
mod relayer;
mod types;

pub use buffer::Buffer;
pub use decrypt::*;
pub use eip712::*;
pub use engine::*;
pub use error::*;
pub use input::*;
pub use instance::*;
pub use relayer::*;
pub use types::*;
