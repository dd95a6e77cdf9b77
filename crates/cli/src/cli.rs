// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::telemetry::setup_tracing;
use crate::{
    account_create, account_import, account_print, decrypt, deploy, encrypt, get_balance, submit,
};
use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use ctk_config::{
    load_config::{find_in_parent, resolve_config_path},
    network::DEFAULT_KEY_FILE,
    validation::ValidUrl,
    Network,
};
use ctk_crypto::CredentialChain;
use std::path::PathBuf;
use tracing::{info, instrument, Level};

#[derive(Parser, Debug)]
#[command(name = "ctk")]
#[command(
    about = "Deploy and exercise confidential contracts on FHE enabled EVM networks",
    long_about = "Deploy and exercise confidential contracts on FHE enabled EVM networks.\n\n\
        The NETWORK env var selects the target: `hardhat` (default) runs every task against an \
        in-process mocked network, `optalysys` talks to the node and relayer of the testnet config.",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_SHA"), ")")
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Indicate error levels by adding additional `-v` arguments. Eg. `ctk -vvv` will give you
    /// trace level output
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true
    )]
    pub verbose: u8,

    /// Silence all output. This argument cannot be used alongside `-v`
    #[arg(
        short,
        long,
        action = ArgAction::SetTrue,
        conflicts_with = "verbose",
        global = true
    )]
    quiet: bool,

    /// Set the Open Telemetry collector grpc endpoint. Eg. http://localhost:4317
    #[arg(long = "otel", global = true)]
    pub otel: Option<ValidUrl>,
}

#[derive(Args, Debug, Clone)]
pub struct KeyFileArg {
    /// File the encrypted key is stored in
    #[arg(long = "key-file", default_value = DEFAULT_KEY_FILE)]
    pub key_file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigFileArg {
    /// JSON file to read the testnet config from. Defaults to `mocked_config.json` or
    /// `testnet_config.json` depending on NETWORK, searched for from the current directory up
    #[arg(long = "config-file")]
    pub config_file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct AddressFileArg {
    /// File holding the address of the deployed contract
    #[arg(long = "address-file")]
    pub address_file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct InputFileArg {
    /// File holding the encrypted input and its proof
    #[arg(long = "input-file")]
    pub input_file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ArtifactArg {
    /// Hardhat artifact to deploy instead of the one under `artifacts/contracts`
    #[arg(long)]
    pub artifact: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a new wallet and store it encrypted
    AccountCreate {
        #[command(flatten)]
        key: KeyFileArg,
    },

    /// Store the key in the PRIVATE_KEY env var as an encrypted wallet
    AccountImport {
        #[command(flatten)]
        key: KeyFileArg,
    },

    /// Print the address of the wallet
    AccountPrintAddress {
        #[command(flatten)]
        key: KeyFileArg,
    },

    /// Print the private key of the wallet
    AccountPrintPrivateKey {
        #[command(flatten)]
        key: KeyFileArg,
    },

    /// Print the balance of the wallet. Fails when it is too low to send transactions.
    GetBalance {
        #[command(flatten)]
        key: KeyFileArg,
        #[command(flatten)]
        config: ConfigFileArg,
    },

    /// Deploy the `Test` contract storing encrypted uint8 values
    DeployTest {
        #[command(flatten)]
        key: KeyFileArg,
        #[command(flatten)]
        config: ConfigFileArg,
        #[command(flatten)]
        address: AddressFileArg,
        #[command(flatten)]
        artifact: ArtifactArg,
    },

    /// Deploy the `FHECounter` contract
    DeployFheCounter {
        #[command(flatten)]
        key: KeyFileArg,
        #[command(flatten)]
        config: ConfigFileArg,
        #[command(flatten)]
        address: AddressFileArg,
        #[command(flatten)]
        artifact: ArtifactArg,
    },

    /// Deploy the `EncryptedVoting` contract
    DeployEncryptedVoting {
        /// The question being voted on
        #[arg(long)]
        question: String,
        #[command(flatten)]
        key: KeyFileArg,
        #[command(flatten)]
        config: ConfigFileArg,
        #[command(flatten)]
        address: AddressFileArg,
        #[command(flatten)]
        artifact: ArtifactArg,
    },

    /// Encrypt a uint8 for the `Test` contract and write it with its proof to a file
    EncryptUint8 {
        /// Value to encrypt
        #[arg(long)]
        input: u8,
        #[command(flatten)]
        input_file: InputFileArg,
        #[command(flatten)]
        key: KeyFileArg,
        #[command(flatten)]
        config: ConfigFileArg,
        #[command(flatten)]
        address: AddressFileArg,
    },

    /// Encrypt a uint32 amount for the `FHECounter` contract and write it with its proof to a
    /// file
    IncrementFheCounter {
        /// Amount to increment
        #[arg(long)]
        input: u32,
        #[command(flatten)]
        input_file: InputFileArg,
        #[command(flatten)]
        key: KeyFileArg,
        #[command(flatten)]
        config: ConfigFileArg,
        #[command(flatten)]
        address: AddressFileArg,
    },

    /// Send an encrypted uint8 from a file to `storeEncryptedSimpleValue`
    StoreEncryptedUint8 {
        #[command(flatten)]
        input_file: InputFileArg,
        #[command(flatten)]
        key: KeyFileArg,
        #[command(flatten)]
        config: ConfigFileArg,
        #[command(flatten)]
        address: AddressFileArg,
    },

    /// Send an encrypted amount from a file to `increment` on the counter
    CallIncrementFheCounter {
        #[command(flatten)]
        input_file: InputFileArg,
        #[command(flatten)]
        key: KeyFileArg,
        #[command(flatten)]
        config: ConfigFileArg,
        #[command(flatten)]
        address: AddressFileArg,
    },

    /// Send an encrypted amount from a file to `decrement` on the counter
    CallDecrementFheCounter {
        #[command(flatten)]
        input_file: InputFileArg,
        #[command(flatten)]
        key: KeyFileArg,
        #[command(flatten)]
        config: ConfigFileArg,
        #[command(flatten)]
        address: AddressFileArg,
    },

    /// Decrypt the counter for the wallet owner
    DecryptFheCounter {
        #[command(flatten)]
        key: KeyFileArg,
        #[command(flatten)]
        config: ConfigFileArg,
        #[command(flatten)]
        address: AddressFileArg,
    },

    /// Publicly decrypt the value stored in the `Test` contract
    PublicDecryptionOfSimpleUint8 {
        #[command(flatten)]
        config: ConfigFileArg,
        #[command(flatten)]
        address: AddressFileArg,
    },
}

impl Cli {
    pub fn log_level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => Level::WARN,  //
                1 => Level::INFO,  // -v
                2 => Level::DEBUG, // -vv
                _ => Level::TRACE, // -vvv
            }
        }
    }

    #[instrument(skip_all)]
    pub async fn execute(self) -> Result<()> {
        setup_tracing(self.otel.as_ref(), self.log_level())?;

        let network = Network::from_env();
        info!("Using the {network} network");
        let password = CredentialChain::wallet_password;

        match self.command {
            Commands::AccountCreate { key } => {
                account_create::execute(&key.key_file, &CredentialChain::new_wallet_password())
                    .await?
            }
            Commands::AccountImport { key } => {
                account_import::execute(&key.key_file, &CredentialChain::new_wallet_password())
                    .await?
            }
            Commands::AccountPrintAddress { key } => {
                account_print::address(&key.key_file, &password()).await?
            }
            Commands::AccountPrintPrivateKey { key } => {
                account_print::private_key(&key.key_file, &password()).await?
            }
            Commands::GetBalance { key, config } => {
                let config_file = config_path(network, config)?;
                get_balance::execute(network, &config_file, &key.key_file, &password()).await?
            }
            Commands::DeployTest {
                key,
                config,
                address,
                artifact,
            } => {
                let task = deploy::DeployTask {
                    network,
                    config_file: config_path(network, config)?,
                    key_file: key.key_file,
                    address_file: address.address_file,
                    artifact: artifact.artifact,
                };
                task.execute(deploy::Target::Test, &password()).await?
            }
            Commands::DeployFheCounter {
                key,
                config,
                address,
                artifact,
            } => {
                let task = deploy::DeployTask {
                    network,
                    config_file: config_path(network, config)?,
                    key_file: key.key_file,
                    address_file: address.address_file,
                    artifact: artifact.artifact,
                };
                task.execute(deploy::Target::FheCounter, &password()).await?
            }
            Commands::DeployEncryptedVoting {
                question,
                key,
                config,
                address,
                artifact,
            } => {
                let task = deploy::DeployTask {
                    network,
                    config_file: config_path(network, config)?,
                    key_file: key.key_file,
                    address_file: address.address_file,
                    artifact: artifact.artifact,
                };
                task.execute(deploy::Target::EncryptedVoting { question }, &password())
                    .await?
            }
            Commands::EncryptUint8 {
                input,
                input_file,
                key,
                config,
                address,
            } => {
                let task = encrypt::EncryptTask {
                    network,
                    config_file: config_path(network, config)?,
                    key_file: key.key_file,
                    address_file: address.address_file,
                    input_file: input_file.input_file,
                };
                task.execute(encrypt::Plaintext::Uint8(input), &password())
                    .await?
            }
            Commands::IncrementFheCounter {
                input,
                input_file,
                key,
                config,
                address,
            } => {
                let task = encrypt::EncryptTask {
                    network,
                    config_file: config_path(network, config)?,
                    key_file: key.key_file,
                    address_file: address.address_file,
                    input_file: input_file.input_file,
                };
                task.execute(encrypt::Plaintext::Uint32(input), &password())
                    .await?
            }
            Commands::StoreEncryptedUint8 {
                input_file,
                key,
                config,
                address,
            } => {
                submit_task(network, input_file, key, config, address)?
                    .execute(submit::Call::StoreEncryptedSimpleValue, &password())
                    .await?
            }
            Commands::CallIncrementFheCounter {
                input_file,
                key,
                config,
                address,
            } => {
                submit_task(network, input_file, key, config, address)?
                    .execute(submit::Call::Increment, &password())
                    .await?
            }
            Commands::CallDecrementFheCounter {
                input_file,
                key,
                config,
                address,
            } => {
                submit_task(network, input_file, key, config, address)?
                    .execute(submit::Call::Decrement, &password())
                    .await?
            }
            Commands::DecryptFheCounter {
                key,
                config,
                address,
            } => {
                let config_file = config_path(network, config)?;
                decrypt::user_decrypt_counter(
                    network,
                    &config_file,
                    &key.key_file,
                    &address.address_file,
                    &password(),
                )
                .await?
            }
            Commands::PublicDecryptionOfSimpleUint8 { config, address } => {
                let config_file = config_path(network, config)?;
                decrypt::public_decrypt_simple_value(network, &config_file, &address.address_file)
                    .await?
            }
        }

        Ok(())
    }
}

fn config_path(network: Network, arg: ConfigFileArg) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Could not read the current directory")?;
    Ok(resolve_config_path(
        find_in_parent,
        cwd,
        network.default_config_file(),
        arg.config_file,
    ))
}

fn submit_task(
    network: Network,
    input_file: InputFileArg,
    key: KeyFileArg,
    config: ConfigFileArg,
    address: AddressFileArg,
) -> Result<submit::SubmitTask> {
    Ok(submit::SubmitTask {
        network,
        config_file: config_path(network, config)?,
        key_file: key.key_file,
        address_file: address.address_file,
        input_file: input_file.input_file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kebab_case_tasks() -> Result<()> {
        let cli = Cli::try_parse_from([
            "ctk",
            "-vv",
            "encrypt-uint8",
            "--input",
            "4",
            "--input-file",
            "input.json",
            "--address-file",
            "test.address",
        ])?;
        assert_eq!(cli.log_level(), Level::DEBUG);
        match cli.command {
            Commands::EncryptUint8 {
                input,
                input_file,
                key,
                config,
                address,
            } => {
                assert_eq!(input, 4);
                assert_eq!(input_file.input_file, PathBuf::from("input.json"));
                assert_eq!(key.key_file, PathBuf::from(DEFAULT_KEY_FILE));
                assert_eq!(config.config_file, None);
                assert_eq!(address.address_file, PathBuf::from("test.address"));
            }
            other => panic!("unexpected command {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_default_log_level() -> Result<()> {
        let cli = Cli::try_parse_from(["ctk", "account-print-address"])?;
        assert_eq!(cli.log_level(), Level::WARN);
        let cli = Cli::try_parse_from(["ctk", "-q", "account-print-address"])?;
        assert_eq!(cli.log_level(), Level::ERROR);
        Ok(())
    }

    #[test]
    fn test_input_is_range_checked() {
        let parse = |input: &str| {
            Cli::try_parse_from([
                "ctk",
                "encrypt-uint8",
                "--input",
                input,
                "--input-file",
                "input.json",
                "--address-file",
                "test.address",
            ])
        };
        assert!(parse("255").is_ok());
        assert!(parse("256").is_err());
        assert!(parse("-1").is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() -> Result<()> {
        let cli = Cli::try_parse_from(["ctk", "-q", "account-print-address"])?;
        assert_eq!(cli.log_level(), Level::ERROR);
        assert!(Cli::try_parse_from(["ctk", "-q", "-v", "account-print-address"]).is_err());
        Ok(())
    }

    #[test]
    fn test_public_decryption_needs_no_wallet() -> Result<()> {
        let cli = Cli::try_parse_from([
            "ctk",
            "public-decryption-of-simple-uint8",
            "--config-file",
            "testnet_config.json",
            "--address-file",
            "test.address",
        ])?;
        assert!(matches!(
            cli.command,
            Commands::PublicDecryptionOfSimpleUint8 { .. }
        ));
        assert!(Cli::try_parse_from([
            "ctk",
            "public-decryption-of-simple-uint8",
            "--address-file",
            "test.address",
            "--key-file",
            "key.json",
        ])
        .is_err());
        Ok(())
    }
}
