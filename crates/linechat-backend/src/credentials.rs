//! Credential acquisition, in priority order: previously saved session
//! token, then a credential file, then an interactive prompt.
//!
//! The interactive path uses `dialoguer`'s password input so the secret is
//! never echoed.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use linechat_core::types::{Credentials, Secret};

use crate::token_store::SessionTokenStore;

/// On-disk credential file format.
#[derive(Deserialize)]
struct CredentialFile {
    identifier: String,
    secret: String,
}

/// Resolves credentials for login.
pub struct CredentialSource {
    store: SessionTokenStore,
    credential_file: Option<PathBuf>,
}

impl CredentialSource {
    /// Create a source backed by the given token store and an optional
    /// credential file path.
    pub fn new(store: SessionTokenStore, credential_file: Option<PathBuf>) -> Self {
        CredentialSource {
            store,
            credential_file,
        }
    }

    /// Resolve credentials: saved token first, then the credential file,
    /// then an interactive prompt.
    pub fn resolve(&self) -> Result<Credentials> {
        if let Some(token) = self.store.load() {
            debug!("using saved session token");
            return Ok(Credentials::SavedToken(token));
        }

        if let Some(path) = &self.credential_file {
            debug!("reading credentials from {}", path.display());
            return read_credential_file(path);
        }

        prompt_credentials()
    }
}

/// Parse a JSON credential file (`{"identifier": ..., "secret": ...}`).
fn read_credential_file(path: &Path) -> Result<Credentials> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read credential file {}", path.display()))?;
    let parsed: CredentialFile = serde_json::from_str(&contents)
        .with_context(|| format!("malformed credential file {}", path.display()))?;
    Ok(Credentials::Login {
        identifier: parsed.identifier,
        secret: Secret::new(parsed.secret),
    })
}

/// Prompt for an identifier and a non-echoed secret.
fn prompt_credentials() -> Result<Credentials> {
    let identifier: String = dialoguer::Input::new()
        .with_prompt("Account")
        .interact_text()
        .context("failed to read account identifier")?;
    let secret = dialoguer::Password::new()
        .with_prompt("Password")
        .interact()
        .context("failed to read password")?;
    Ok(Credentials::Login {
        identifier,
        secret: Secret::new(secret),
    })
}
