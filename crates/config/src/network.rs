// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::{env, fmt};
use tracing::warn;

pub const NETWORK_ENV: &str = "NETWORK";
pub const DEFAULT_KEY_FILE: &str = "key.json";

/// Which network a test run or task targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    /// In-process simulation with a mocked FHE coprocessor
    #[default]
    Hardhat,
    /// The live FHE enabled testnet reached through the relayer
    Optalysys,
}

impl Network {
    /// Read the network from the `NETWORK` env var. Unknown names fall back to the mock network.
    pub fn from_env() -> Self {
        Self::from_name(env::var(NETWORK_ENV).ok().as_deref())
    }

    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            None | Some("") | Some("hardhat") => Network::Hardhat,
            Some("optalysys") => Network::Optalysys,
            Some(other) => {
                warn!("Unknown network '{other}', using the mocked network");
                Network::Hardhat
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Network::Hardhat => "hardhat",
            Network::Optalysys => "optalysys",
        }
    }

    pub fn is_mock(&self) -> bool {
        matches!(self, Network::Hardhat)
    }

    pub fn default_config_file(&self) -> &'static str {
        match self {
            Network::Hardhat => "mocked_config.json",
            Network::Optalysys => "testnet_config.json",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_network_from_env() {
        Jail::expect_with(|jail| {
            jail.set_env(NETWORK_ENV, "optalysys");
            assert_eq!(Network::from_env(), Network::Optalysys);
            jail.set_env(NETWORK_ENV, "hardhat");
            assert_eq!(Network::from_env(), Network::Hardhat);
            Ok(())
        });
    }

    #[test]
    fn test_network_from_name() {
        assert_eq!(Network::from_name(None), Network::Hardhat);
        assert_eq!(Network::from_name(Some("")), Network::Hardhat);
        assert_eq!(Network::from_name(Some("optalysys")), Network::Optalysys);
        assert_eq!(Network::from_name(Some("sepolia")), Network::Hardhat);
    }

    #[test]
    fn test_default_config_file() {
        assert_eq!(Network::Hardhat.default_config_file(), "mocked_config.json");
        assert_eq!(Network::Optalysys.default_config_file(), "testnet_config.json");
        assert!(Network::Hardhat.is_mock());
        assert!(!Network::Optalysys.is_mock());
    }
}
