// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Password encrypted JSON keystore wallets (Web3 Secret Storage).

use crate::credentials::{CredentialChain, PRIVATE_KEY_ENV};
use alloy::signers::local::{LocalSignerError, PrivateKeySigner};
use std::{
    env,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::info;
use zeroize::Zeroizing;

#[derive(Debug, Error)]
pub enum KeystoreError {
    #[error("Key file {0:?} does not exist")]
    NotFound(PathBuf),

    #[error("Key file {0:?} is not a file path")]
    InvalidPath(PathBuf),

    #[error("Could not decrypt key file {path:?}, check the wallet password: {source}")]
    Decrypt {
        path: PathBuf,
        #[source]
        source: LocalSignerError,
    },

    #[error("Could not write key file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: LocalSignerError,
    },

    #[error(
        "Set PRIVATE_KEY env var to the private key to be imported. It will be stored in \
         {0:?} encrypted with the password stored in the env var WALLET_PASSWORD (if that env \
         var is not set you will be prompted to supply a password)"
    )]
    MissingPrivateKey(PathBuf),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error(transparent)]
    Credential(#[from] anyhow::Error),

    #[error("Keystore task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Decrypt the wallet stored in `key_file`. The password is taken from the first credential
/// provider that has one.
pub async fn load_wallet(
    key_file: impl AsRef<Path>,
    credentials: &CredentialChain,
) -> Result<PrivateKeySigner, KeystoreError> {
    let path = key_file.as_ref().to_path_buf();
    if !path.is_file() {
        return Err(KeystoreError::NotFound(path));
    }
    let password = credentials.resolve()?;

    // scrypt is deliberately slow so keep it off the async workers
    tokio::task::spawn_blocking(move || {
        PrivateKeySigner::decrypt_keystore(&path, password.as_bytes())
            .map_err(|source| KeystoreError::Decrypt { path, source })
    })
    .await?
}

/// Generate a fresh random wallet and store it encrypted in `key_file`
pub async fn create_wallet(
    key_file: impl AsRef<Path>,
    credentials: &CredentialChain,
) -> Result<PrivateKeySigner, KeystoreError> {
    let signer = PrivateKeySigner::random();
    info!("Account generated: {}", signer.address());
    let password = credentials.resolve()?;
    save_wallet(key_file, &signer, password).await?;
    Ok(signer)
}

/// Store an existing private key encrypted in `key_file`
pub async fn import_wallet(
    key_file: impl AsRef<Path>,
    private_key: Zeroizing<String>,
    credentials: &CredentialChain,
) -> Result<PrivateKeySigner, KeystoreError> {
    let signer = parse_private_key(&private_key)?;
    let password = credentials.resolve()?;
    save_wallet(key_file, &signer, password).await?;
    Ok(signer)
}

/// Read the private key to import from `PRIVATE_KEY`
pub fn private_key_from_env(key_file: impl AsRef<Path>) -> Result<Zeroizing<String>, KeystoreError> {
    match env::var(PRIVATE_KEY_ENV) {
        Ok(key) if !key.is_empty() => Ok(Zeroizing::new(key.trim().to_string())),
        _ => Err(KeystoreError::MissingPrivateKey(
            key_file.as_ref().to_path_buf(),
        )),
    }
}

pub fn parse_private_key(input: &str) -> Result<PrivateKeySigner, KeystoreError> {
    input
        .trim()
        .parse::<PrivateKeySigner>()
        .map_err(|e| KeystoreError::InvalidPrivateKey(e.to_string()))
}

/// Encrypt `signer` with `password` and write it to `key_file`, replacing any existing file.
pub async fn save_wallet(
    key_file: impl AsRef<Path>,
    signer: &PrivateKeySigner,
    password: Zeroizing<String>,
) -> Result<(), KeystoreError> {
    let path = key_file.as_ref().to_path_buf();
    let (dir, name) = split_key_path(&path)?;
    let key = Zeroizing::new(signer.to_bytes().0);

    tokio::task::spawn_blocking(move || {
        let mut rng = rand::thread_rng();
        PrivateKeySigner::encrypt_keystore(
            &dir,
            &mut rng,
            key.as_slice(),
            password.as_bytes(),
            Some(&name),
        )
        .map(|_| ())
        .map_err(|source| KeystoreError::Write { path, source })
    })
    .await??;

    info!("Account saved to file: {}", key_file.as_ref().display());
    Ok(())
}

fn split_key_path(path: &Path) -> Result<(PathBuf, String), KeystoreError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| KeystoreError::InvalidPath(path.to_path_buf()))?
        .to_string();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;
    use anyhow::Result;
    use serial_test::serial;
    use tempfile::tempdir;

    // anvil's first dev account
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[tokio::test]
    async fn test_create_then_load() -> Result<()> {
        let dir = tempdir()?;
        let key_file = dir.path().join("key.json");
        let password = CredentialChain::from_secret("correct horse");

        let created = create_wallet(&key_file, &password).await?;
        assert!(key_file.is_file());

        let loaded = load_wallet(&key_file, &password).await?;
        assert_eq!(loaded.address(), created.address());
        Ok(())
    }

    #[tokio::test]
    async fn test_wrong_password() -> Result<()> {
        let dir = tempdir()?;
        let key_file = dir.path().join("key.json");
        create_wallet(&key_file, &CredentialChain::from_secret("right")).await?;

        let err = load_wallet(&key_file, &CredentialChain::from_secret("wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, KeystoreError::Decrypt { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_key_file() {
        let err = load_wallet("/no/such/key.json", &CredentialChain::from_secret("pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, KeystoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_import_known_key() -> Result<()> {
        let dir = tempdir()?;
        let key_file = dir.path().join("imported.json");
        let password = CredentialChain::from_secret("pw");

        let imported =
            import_wallet(&key_file, Zeroizing::new(DEV_KEY.to_string()), &password).await?;
        assert_eq!(imported.address(), DEV_ADDRESS.parse::<Address>()?);

        let loaded = load_wallet(&key_file, &password).await?;
        assert_eq!(loaded.address(), DEV_ADDRESS.parse::<Address>()?);
        assert_eq!(loaded.to_bytes(), imported.to_bytes());
        Ok(())
    }

    #[test]
    fn test_invalid_private_key() {
        let err = parse_private_key("0x1234").unwrap_err();
        assert!(matches!(err, KeystoreError::InvalidPrivateKey(_)));
    }

    #[test]
    #[serial]
    fn test_private_key_from_env() -> Result<()> {
        env::remove_var(PRIVATE_KEY_ENV);
        let err = private_key_from_env("key.json").unwrap_err();
        assert!(err.to_string().starts_with("Set PRIVATE_KEY env var"));
        assert!(err.to_string().contains("\"key.json\""));

        env::set_var(PRIVATE_KEY_ENV, format!(" {DEV_KEY}\n"));
        assert_eq!(private_key_from_env("key.json")?.as_str(), DEV_KEY);

        env::set_var(PRIVATE_KEY_ENV, "  ");
        let key = private_key_from_env("key.json")?;
        assert!(matches!(
            parse_private_key(&key),
            Err(KeystoreError::InvalidPrivateKey(_))
        ));
        env::remove_var(PRIVATE_KEY_ENV);
        Ok(())
    }

    #[test]
    fn test_split_key_path() -> Result<()> {
        assert_eq!(
            split_key_path(Path::new("key.json"))?,
            (PathBuf::from("."), "key.json".to_string())
        );
        assert_eq!(
            split_key_path(Path::new("/tmp/wallets/key.json"))?,
            (PathBuf::from("/tmp/wallets"), "key.json".to_string())
        );
        assert!(split_key_path(Path::new("/")).is_err());
        Ok(())
    }
}
