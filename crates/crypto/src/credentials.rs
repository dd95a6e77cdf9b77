// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Secret acquisition from an ordered list of sources.

use anyhow::{bail, Result};
use dialoguer::{theme::ColorfulTheme, Password};
use std::env;
use tracing::debug;
use zeroize::Zeroizing;

pub const WALLET_PASSWORD_ENV: &str = "WALLET_PASSWORD";
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

/// A source a secret can be read from.
pub trait CredentialProvider: Send + Sync {
    /// Human readable name of the source, used in logs and errors.
    fn name(&self) -> String;

    /// Returns `Ok(None)` when this source has nothing to offer so that the next one can be
    /// tried. Errors are reserved for sources that exist but could not be read.
    fn get_secret(&self) -> Result<Option<Zeroizing<String>>>;
}

/// Reads a secret from an environment variable. Unset and empty variables both count as absent.
pub struct EnvCredentialProvider {
    var: String,
}

impl EnvCredentialProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn name(&self) -> String {
        format!("env var {}", self.var)
    }

    fn get_secret(&self) -> Result<Option<Zeroizing<String>>> {
        match env::var(&self.var) {
            Ok(value) => Ok(non_empty(Zeroizing::new(value))),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(e) => bail!("Could not read {}: {}", self.var, e),
        }
    }
}

/// Holds a secret in process memory.
pub struct InMemCredentialProvider(Option<Zeroizing<String>>);

impl InMemCredentialProvider {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Some(Zeroizing::new(value.into())))
    }

    pub fn empty() -> Self {
        Self(None)
    }
}

impl CredentialProvider for InMemCredentialProvider {
    fn name(&self) -> String {
        "memory".to_string()
    }

    fn get_secret(&self) -> Result<Option<Zeroizing<String>>> {
        Ok(self.0.clone().and_then(non_empty))
    }
}

/// Asks the operator on the terminal with masked input.
pub struct PromptCredentialProvider {
    prompt: String,
    hint: Option<String>,
    confirmation: Option<String>,
}

impl PromptCredentialProvider {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            hint: None,
            confirmation: None,
        }
    }

    /// Print a line before prompting, e.g. how to skip the prompt next time
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Ask twice and require both entries to match
    pub fn with_confirmation(mut self, prompt: impl Into<String>) -> Self {
        self.confirmation = Some(prompt.into());
        self
    }
}

impl CredentialProvider for PromptCredentialProvider {
    fn name(&self) -> String {
        "interactive prompt".to_string()
    }

    fn get_secret(&self) -> Result<Option<Zeroizing<String>>> {
        if let Some(hint) = &self.hint {
            println!("{hint}");
        }
        let theme = ColorfulTheme::default();
        let mut password = Password::with_theme(&theme);
        password = password.with_prompt(&self.prompt);
        if let Some(confirmation) = &self.confirmation {
            password = password.with_confirmation(confirmation, "Passwords do not match");
        }
        let secret = Zeroizing::new(password.allow_empty_password(true).interact()?);
        Ok(non_empty(secret))
    }
}

/// An ordered list of providers. The first provider that yields a non-empty secret wins.
pub struct CredentialChain {
    label: String,
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl CredentialChain {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            providers: Vec::new(),
        }
    }

    pub fn with(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// `WALLET_PASSWORD` first, then a masked prompt
    pub fn wallet_password() -> Self {
        Self::new("wallet password")
            .with(EnvCredentialProvider::new(WALLET_PASSWORD_ENV))
            .with(
                PromptCredentialProvider::new("Enter password for wallet")
                    .with_hint("Set WALLET_PASSWORD env var to skip this prompt"),
            )
    }

    /// Same as [`CredentialChain::wallet_password`] but the prompt asks for confirmation
    pub fn new_wallet_password() -> Self {
        Self::new("wallet password")
            .with(EnvCredentialProvider::new(WALLET_PASSWORD_ENV))
            .with(
                PromptCredentialProvider::new("Enter password for wallet")
                    .with_hint("Set WALLET_PASSWORD env var to skip this prompt")
                    .with_confirmation("Confirm password for wallet"),
            )
    }

    /// A chain that only holds the given secret. Handy for tests and non interactive callers.
    pub fn from_secret(secret: impl Into<String>) -> Self {
        Self::new("secret").with(InMemCredentialProvider::new(secret))
    }

    pub fn resolve(&self) -> Result<Zeroizing<String>> {
        for provider in &self.providers {
            if let Some(secret) = provider.get_secret()? {
                debug!("Using {} from {}", self.label, provider.name());
                return Ok(secret);
            }
        }
        let tried = self
            .providers
            .iter()
            .map(|p| p.name())
            .collect::<Vec<_>>()
            .join(", ");
        bail!("No {} available (tried: {})", self.label, tried)
    }
}

fn non_empty(secret: Zeroizing<String>) -> Option<Zeroizing<String>> {
    if secret.is_empty() {
        None
    } else {
        Some(secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_first_non_empty_wins() -> Result<()> {
        let chain = CredentialChain::new("test")
            .with(InMemCredentialProvider::empty())
            .with(InMemCredentialProvider::new(""))
            .with(InMemCredentialProvider::new("second"))
            .with(InMemCredentialProvider::new("third"));
        assert_eq!(chain.resolve()?.as_str(), "second");
        Ok(())
    }

    #[test]
    fn test_whitespace_secret_is_kept() -> Result<()> {
        let chain = CredentialChain::new("test")
            .with(InMemCredentialProvider::new("   "))
            .with(InMemCredentialProvider::new("fallback"));
        assert_eq!(chain.resolve()?.as_str(), "   ");
        Ok(())
    }

    #[test]
    fn test_no_secret_is_an_error() {
        let chain = CredentialChain::new("wallet password").with(InMemCredentialProvider::empty());
        let err = chain.resolve().unwrap_err();
        assert_eq!(
            err.to_string(),
            "No wallet password available (tried: memory)"
        );
    }

    #[test]
    #[serial]
    fn test_env_provider() -> Result<()> {
        let var = "CTK_TEST_CREDENTIAL";
        env::remove_var(var);
        let provider = EnvCredentialProvider::new(var);
        assert!(provider.get_secret()?.is_none());

        env::set_var(var, "");
        assert!(provider.get_secret()?.is_none());

        env::set_var(var, " ");
        assert_eq!(provider.get_secret()?.unwrap().as_str(), " ");

        env::set_var(var, "hunter2");
        assert_eq!(provider.get_secret()?.unwrap().as_str(), "hunter2");

        let chain = CredentialChain::new("test")
            .with(EnvCredentialProvider::new(var))
            .with(InMemCredentialProvider::new("fallback"));
        assert_eq!(chain.resolve()?.as_str(), "hunter2");

        env::remove_var(var);
        assert_eq!(chain.resolve()?.as_str(), "fallback");
        Ok(())
    }
}
