// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::Address;
use anyhow::{anyhow, Result};
use std::{fmt, str::FromStr};
use url::Url;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidUrl(Url);

impl ValidUrl {
    pub fn url(&self) -> &Url {
        &self.0
    }

    /// Join a relative api path onto the url, keeping any path prefix the url already has
    pub fn join_path(&self, path: &str) -> Result<Url> {
        let mut base = self.0.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Ok(base.join(path.trim_start_matches('/'))?)
    }
}

impl FromStr for ValidUrl {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ValidUrl(Url::parse(s)?))
    }
}

impl From<ValidUrl> for String {
    fn from(value: ValidUrl) -> Self {
        value.0.to_string()
    }
}

impl fmt::Display for ValidUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse an address the way wallets do: a mixed case address must carry a valid EIP-55
/// checksum, all lower or all upper case addresses are accepted as is.
pub fn parse_address(s: &str) -> Result<Address> {
    let s = s.trim();
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(s, None).map_err(|e| anyhow!("bad address checksum: {e}"))
    } else {
        Address::from_str(s).map_err(|e| anyhow!("invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path_keeps_prefix() -> Result<()> {
        let url: ValidUrl = "https://relayer.example.com/api".parse()?;
        assert_eq!(
            url.join_path("/v1/public-decrypt")?.as_str(),
            "https://relayer.example.com/api/v1/public-decrypt"
        );

        let url: ValidUrl = "https://relayer.example.com".parse()?;
        assert_eq!(
            url.join_path("v1/keyurl")?.as_str(),
            "https://relayer.example.com/v1/keyurl"
        );
        Ok(())
    }

    #[test]
    fn test_parse_address() -> Result<()> {
        let lower = "0x36772142b74871f255cbd7a3e89b401d3e45825f";
        let addr = parse_address(lower)?;
        assert_eq!(parse_address(&addr.to_checksum(None))?, addr);
        assert_eq!(parse_address(&lower.to_uppercase().replace("0X", "0x"))?, addr);
        assert!(parse_address("0x36772142").is_err());
        assert!(parse_address("not an address").is_err());
        Ok(())
    }
}
