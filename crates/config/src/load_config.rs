// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::path::{Path, PathBuf};

use path_clean::clean;

pub type FindInParent = fn(&Path, &str) -> Option<PathBuf>;

pub fn find_in_parent(path: &Path, filename: &str) -> Option<PathBuf> {
    let mut current = PathBuf::from(path);

    loop {
        let file_path = current.join(filename);
        if file_path.exists() {
            return Some(file_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Work out which file a task should read. An explicit cli path always wins, otherwise the
/// default filename is searched for from the cwd upwards and finally assumed to be in the cwd.
pub fn resolve_config_path<P: Into<PathBuf>>(
    find_in_parent: FindInParent,
    cwd: P,
    default_filename: &str,
    cli_file: Option<P>,
) -> PathBuf {
    let cli_file: Option<PathBuf> = cli_file.map(Into::into);
    let cwd = cwd.into();

    if let Some(cli_file) = cli_file {
        // config is passed in and is absolute
        if cli_file.is_absolute() {
            return cli_file;
        }

        // config is passed in and is relative
        return clean(cwd.join(cli_file));
    }

    // search from cwd
    if let Some(found) = find_in_parent(&cwd, default_filename) {
        return found;
    }

    clean(cwd.join(default_filename))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn not_found(_: &Path, _: &str) -> Option<PathBuf> {
        None
    }

    fn found(_: &Path, _: &str) -> Option<PathBuf> {
        Some(PathBuf::from("/foo/mocked_config.json"))
    }

    #[test]
    fn test_resolve_cli() -> Result<()> {
        let path = resolve_config_path(
            not_found,
            PathBuf::from("/foo/bar"),
            "mocked_config.json",
            None,
        );
        assert_eq!(path, PathBuf::from("/foo/bar/mocked_config.json"));

        let path = resolve_config_path(
            found, // should be overridden by the cli path
            PathBuf::from("/foo/bar"),
            "mocked_config.json",
            Some(PathBuf::from("/my/absolute/testnet_config.json")),
        );
        assert_eq!(path, PathBuf::from("/my/absolute/testnet_config.json"));

        let path = resolve_config_path(
            found,
            PathBuf::from("/foo/bar"),
            "mocked_config.json",
            Some(PathBuf::from("../configs/./testnet_config.json")),
        );
        assert_eq!(path, PathBuf::from("/foo/configs/testnet_config.json"));

        let path = resolve_config_path(
            found,
            PathBuf::from("/foo/bar"),
            "mocked_config.json",
            None,
        );
        assert_eq!(path, PathBuf::from("/foo/mocked_config.json"));
        Ok(())
    }

    #[test]
    fn test_find_in_parent() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested)?;
        std::fs::write(dir.path().join("testnet_config.json"), "{}")?;

        assert_eq!(
            find_in_parent(&nested, "testnet_config.json"),
            Some(dir.path().join("testnet_config.json"))
        );
        assert_eq!(find_in_parent(&nested, "nothing_here_1b7c.json"), None);
        Ok(())
    }
}
