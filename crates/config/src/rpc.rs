// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{anyhow, bail, Context, Result};
use std::fmt;
use url::Url;

/// The node endpoint of a testnet config. Relayer and provider code want an http url while
/// subscriptions want a websocket, so either form is accepted and converted on demand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RPC {
    url: Url,
    websocket: bool,
    secure: bool,
}

impl RPC {
    pub fn from_url(url: &str) -> Result<Self> {
        let url = Url::parse(url).context("Invalid URL format")?;
        let (websocket, secure) = match url.scheme() {
            "http" => (false, false),
            "https" => (false, true),
            "ws" => (true, false),
            "wss" => (true, true),
            _ => bail!("Invalid protocol. Expected: http://, https://, ws://, wss://"),
        };
        if url.host_str().is_none() {
            bail!("URL must contain a host");
        }

        Ok(RPC {
            url,
            websocket,
            secure,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn is_websocket(&self) -> bool {
        self.websocket
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Loopback endpoints are assumed to be a local development node
    pub fn is_local(&self) -> bool {
        match self.url.host_str() {
            Some("localhost" | "127.0.0.1" | "[::1]") => true,
            Some(host) => host.starts_with("127."),
            None => false,
        }
    }

    pub fn as_http_url(&self) -> Result<String> {
        self.with_scheme(false)
    }

    pub fn as_ws_url(&self) -> Result<String> {
        self.with_scheme(true)
    }

    fn with_scheme(&self, websocket: bool) -> Result<String> {
        if self.websocket == websocket {
            return Ok(self.url.to_string());
        }
        let scheme = match (websocket, self.secure) {
            (false, false) => "http",
            (false, true) => "https",
            (true, false) => "ws",
            (true, true) => "wss",
        };
        let mut url = self.url.clone();
        url.set_scheme(scheme)
            .map_err(|_| anyhow!("Cannot switch {} to {scheme}", self.url))?;
        Ok(url.to_string())
    }
}

impl fmt::Display for RPC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_conversions() -> Result<()> {
        let http = RPC::from_url("http://localhost:8545/")?;
        assert_eq!(http.as_http_url()?, "http://localhost:8545/");
        assert_eq!(http.as_ws_url()?, "ws://localhost:8545/");
        assert!(!http.is_secure());
        assert!(!http.is_websocket());
        assert!(http.is_local());

        let wss = RPC::from_url("wss://devnet.example.com/rpc")?;
        assert_eq!(wss.as_http_url()?, "https://devnet.example.com/rpc");
        assert_eq!(wss.as_ws_url()?, "wss://devnet.example.com/rpc");
        assert!(wss.is_secure());
        assert!(wss.is_websocket());
        assert!(!wss.is_local());

        Ok(())
    }

    #[test]
    fn test_rpc_rejects_other_schemes() {
        assert!(RPC::from_url("ftp://localhost:8545").is_err());
        assert!(RPC::from_url("localhost:8545").is_err());
    }
}
