// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recipient encryption for env bundles.
//!
//! The private key stays in the config dir; backups only ever see the
//! derived public recipient. Decryption is an operator action outside
//! the agent.

use ob_proc::{Cmd, ProcError};
use std::path::{Path, PathBuf};

const AGE_BIN: &str = "age";
const KEYGEN_BIN: &str = "age-keygen";

#[derive(Debug, Clone)]
pub struct AgeTool {
    key_file: PathBuf,
}

impl AgeTool {
    pub fn new(key_file: impl Into<PathBuf>) -> Self {
        Self {
            key_file: key_file.into(),
        }
    }

    /// Derive the public recipient from the private key
    /// (`age-keygen -y <key>`).
    pub fn recipient(&self) -> Result<String, ProcError> {
        let out = Cmd::new([
            KEYGEN_BIN.to_string(),
            "-y".to_string(),
            self.key_file.to_string_lossy().into_owned(),
        ])
        .run()?;
        Ok(out.stdout.trim().to_string())
    }

    pub(crate) fn encrypt_args(recipient: &str, input: &Path, output: &Path) -> Vec<String> {
        vec![
            AGE_BIN.to_string(),
            "-r".to_string(),
            recipient.to_string(),
            "-o".to_string(),
            output.to_string_lossy().into_owned(),
            input.to_string_lossy().into_owned(),
        ]
    }

    /// Encrypt `input` to the recipient, writing `output`.
    pub fn encrypt(
        &self,
        recipient: &str,
        input: &Path,
        output: &Path,
        log: &Path,
    ) -> Result<(), ProcError> {
        Cmd::new(Self::encrypt_args(recipient, input, output))
            .log(log)
            .run()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "agekey_tests.rs"]
mod tests;
