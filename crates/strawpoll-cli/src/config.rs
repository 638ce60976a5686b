//! User defaults for poll creation, stored as TOML.
//!
//! ```toml
//! dupcheck = "session"
//! results_visibility = "after_vote"
//! is_private = true
//! ```
//!
//! Every key is optional. A missing file behaves like an empty one.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use strawpoll_models::{DuplicationChecking, EditVotePermissions, ResultsVisibility};

use crate::exit::CliError;

pub const CONFIG_ENV: &str = "STRAWPOLL_CONFIG";
const APP_DIR: &str = "strawpoll-cli";
const FILE_NAME: &str = "config.toml";

pub const KEYS: &[&str] = &[
    "dupcheck",
    "results_visibility",
    "is_private",
    "allow_comments",
    "allow_vpn_users",
    "hide_participants",
    "edit_vote_permissions",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dupcheck: Option<DuplicationChecking>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_visibility: Option<ResultsVisibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_comments: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_vpn_users: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_participants: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_vote_permissions: Option<EditVotePermissions>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("read config {}", path.display()))
            }
        };
        let config: Self =
            toml::from_str(&raw).with_context(|| format!("parse config {}", path.display()))?;
        if let Some(key) = config.unknown_setting() {
            anyhow::bail!("invalid value for {key} in config {}", path.display());
        }
        Ok(config)
    }

    /// First enum setting holding a value outside the accepted set.
    fn unknown_setting(&self) -> Option<&'static str> {
        if self.dupcheck.is_some_and(|v| !v.is_known()) {
            return Some("dupcheck");
        }
        if self.results_visibility.is_some_and(|v| !v.is_known()) {
            return Some("results_visibility");
        }
        if self.edit_vote_permissions.is_some_and(|v| !v.is_known()) {
            return Some("edit_vote_permissions");
        }
        None
    }

    /// Load from the default location, logging and ignoring any problem.
    pub fn load_or_default() -> Self {
        let loaded = config_path().and_then(|path| Self::load(&path));
        match loaded {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "ignoring unreadable config");
                Self::default()
            }
        }
    }

    /// Write via a sibling `.tmp` file and rename, so readers never see a
    /// partial file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("create config dir {}", dir.display()))?;
        }
        let body = toml::to_string_pretty(self).context("encode config")?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut file = open_private(&tmp).with_context(|| format!("write config {}", tmp.display()))?;
        file.write_all(body.as_bytes())
            .with_context(|| format!("write config {}", tmp.display()))?;
        file.sync_all().context("flush config")?;
        drop(file);

        fs::rename(&tmp, path).with_context(|| format!("commit config {}", path.display()))
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Set one key from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CliError> {
        match key {
            "dupcheck" => self.dupcheck = Some(parse_enum(key, value)?),
            "results_visibility" => self.results_visibility = Some(parse_enum(key, value)?),
            "edit_vote_permissions" => self.edit_vote_permissions = Some(parse_enum(key, value)?),
            "is_private" => self.is_private = Some(parse_bool_for(key, value)?),
            "allow_comments" => self.allow_comments = Some(parse_bool_for(key, value)?),
            "allow_vpn_users" => self.allow_vpn_users = Some(parse_bool_for(key, value)?),
            "hide_participants" => self.hide_participants = Some(parse_bool_for(key, value)?),
            other => {
                return Err(CliError::usage(format!(
                    "unknown config key: {other}\n\nValid keys: {}",
                    KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }
}

/// `STRAWPOLL_CONFIG`, else `<config dir>/strawpoll-cli/config.toml`.
pub fn config_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    let base = dirs::config_dir().context("no user config directory on this system")?;
    Ok(base.join(APP_DIR).join(FILE_NAME))
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn parse_bool_for(key: &str, value: &str) -> Result<bool, CliError> {
    parse_bool(value).ok_or_else(|| {
        CliError::usage(format!(
            "invalid boolean for {key}: expected true/false, got '{value}'"
        ))
    })
}

fn parse_enum<T>(key: &str, value: &str) -> Result<T, CliError>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|err| CliError::usage(format!("{key}: {err}")))
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::File::create(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigFile::load(&dir.path().join("absent.toml")).unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ConfigFile::default();
        config.set("dupcheck", "session").unwrap();
        config.set("is_private", "yes").unwrap();
        config.set("allow_vpn_users", "0").unwrap();
        config.save(&path).unwrap();

        assert!(!dir.path().join("nested").join("config.toml.tmp").exists());
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("dupcheck = \"session\""));
        assert!(!raw.contains("results_visibility"));

        let loaded = ConfigFile::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.dupcheck, Some(DuplicationChecking::Session));
        assert_eq!(loaded.allow_vpn_users, Some(false));
    }

    #[test]
    fn set_validates_values() {
        let mut config = ConfigFile::default();
        assert!(config.set("results_visibility", "never").is_err());
        assert!(config.set("hide_participants", "maybe").is_err());
        let err = config.set("colour", "blue").unwrap_err();
        assert!(err.to_string().contains("Valid keys: dupcheck"));
        assert!(config.is_empty());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "dupcheck = \"sometimes\"").unwrap();
        let err = ConfigFile::load(&path).unwrap_err();
        assert!(err.to_string().contains("invalid value for dupcheck"));

        fs::write(&path, "allow_comments = \"yes\"").unwrap();
        assert!(ConfigFile::load(&path).is_err());
    }

    #[test]
    fn bool_spellings() {
        for yes in ["true", "TRUE", "1", "yes"] {
            assert_eq!(parse_bool(yes), Some(true));
        }
        for no in ["false", "0", "No"] {
            assert_eq!(parse_bool(no), Some(false));
        }
        assert_eq!(parse_bool("y"), None);
    }
}
