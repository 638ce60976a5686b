//! API key lookup: the environment first, then the OS keyring.

use anyhow::{Context, Result};
use std::fmt;

use crate::exit::CliError;

pub const API_KEY_ENV: &str = "STRAWPOLL_API_KEY";
const SERVICE: &str = "strawpoll-cli";
const USER: &str = "api_key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Environment,
    Keyring,
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Environment => write!(f, "{API_KEY_ENV} environment variable"),
            KeySource::Keyring => f.write_str("system keyring"),
        }
    }
}

fn entry() -> Result<keyring::Entry> {
    keyring::Entry::new(SERVICE, USER).context("open keyring entry")
}

pub fn stored_key() -> Result<Option<String>> {
    match entry()?.get_password() {
        Ok(key) => Ok(Some(key)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(err) => Err(err).context("read API key from keyring"),
    }
}

pub fn store_key(key: &str) -> Result<()> {
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::usage("API key cannot be empty").into());
    }
    entry()?
        .set_password(key)
        .context("store API key in keyring")
}

/// Returns whether a key was actually removed.
pub fn remove_key() -> Result<bool> {
    match entry()?.delete_credential() {
        Ok(()) => Ok(true),
        Err(keyring::Error::NoEntry) => Ok(false),
        Err(err) => Err(err).context("remove API key from keyring"),
    }
}

/// Current key and where it came from, if any.
pub fn resolve() -> Option<(String, KeySource)> {
    pick_key(std::env::var(API_KEY_ENV).ok(), || match stored_key() {
        Ok(key) => key,
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "keyring unavailable");
            None
        }
    })
}

pub fn require_key() -> Result<String, CliError> {
    resolve()
        .map(|(key, _)| key)
        .ok_or(CliError::MissingApiKey)
}

/// A non-blank environment value wins; the keyring is only consulted
/// otherwise.
fn pick_key(
    env: Option<String>,
    stored: impl FnOnce() -> Option<String>,
) -> Option<(String, KeySource)> {
    let clean = |key: String| Some(key.trim().to_string()).filter(|key| !key.is_empty());
    if let Some(key) = env.and_then(clean) {
        return Some((key, KeySource::Environment));
    }
    stored()
        .and_then(clean)
        .map(|key| (key, KeySource::Keyring))
}

/// `abcd…wxyz` for status output.
pub fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
