// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use clap::Parser;
use cli::Cli;

mod account_create;
mod account_import;
mod account_print;
mod backend;
mod cli;
mod decrypt;
mod deploy;
mod encrypt;
mod get_balance;
pub mod helpers;
mod submit;

#[tokio::main]
pub async fn main() {
    // Execute the cli
    if let Err(err) = Cli::parse().execute().await {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}
