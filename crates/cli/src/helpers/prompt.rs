// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Password};

/// Block until the operator presses Enter. Ctrl+C aborts the process.
pub fn wait_for_enter(prompt: impl Into<String>) -> Result<()> {
    // hidden input so nothing typed by accident ends up on screen
    Password::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()?;

    Ok(())
}
