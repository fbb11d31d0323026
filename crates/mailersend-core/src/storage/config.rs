//! Configuration management
//!
//! Multi-profile credential configuration stored as YAML at
//! `<config-dir>/mailersend/config.yaml`, where `<config-dir>` is
//! `$XDG_CONFIG_HOME` when set and `~/.config` otherwise.

use super::Result;
use crate::error::ConfigError;
use crate::utils::file::write_private_atomic;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const PRODUCT: &str = "mailersend";
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Treats an explicit `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A named credential bundle.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_refresh_token: Option<String>,
    /// Absent means the expiry is unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_expires_at: Option<DateTime<Utc>>,
    /// Keys this version does not know about, kept for the next save.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Profile {
    pub fn with_api_token(token: impl Into<String>) -> Self {
        Self {
            api_token: Some(token.into()),
            ..Self::default()
        }
    }

    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn oauth_access_token(&self) -> Option<&str> {
        self.oauth_access_token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn has_credentials(&self) -> bool {
        self.api_token().is_some() || self.oauth_access_token().is_some()
    }

    /// Drop every credential field, leaving unknown keys untouched.
    pub fn clear_credentials(&mut self) {
        self.api_token = None;
        self.oauth_access_token = None;
        self.oauth_refresh_token = None;
        self.oauth_expires_at = None;
    }
}

/// Application configuration
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Empty means no profile was explicitly selected.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub active_profile: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub profiles: BTreeMap<String, Profile>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Config {
    /// Load configuration from file. A missing file yields an empty configuration.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::FileIo {
            path: path.to_string_lossy().to_string(),
            source,
        })?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Config::default());
        }

        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
            detail: e.to_string(),
        })
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Serialize {
            detail: e.to_string(),
        })
    }

    /// Save configuration to file, atomically and owner-only.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_yaml()?;
        write_private_atomic(path, content.as_bytes())
    }

    /// Resolve the profile used when no override is given.
    ///
    /// Without an explicit `active_profile` the lexicographically first
    /// profile is used, which keeps the pick stable across calls.
    pub fn active(&self) -> Result<(&str, &Profile)> {
        if !self.active_profile.is_empty() {
            return self
                .profiles
                .get_key_value(&self.active_profile)
                .map(|(name, profile)| (name.as_str(), profile))
                .ok_or_else(|| ConfigError::ProfileNotFound {
                    name: self.active_profile.clone(),
                });
        }

        self.profiles
            .iter()
            .next()
            .map(|(name, profile)| (name.as_str(), profile))
            .ok_or(ConfigError::NoProfiles)
    }

    pub fn get_profile(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_string(),
            })
    }

    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Make `name` the active profile.
    pub fn switch(&mut self, name: &str) -> Result<()> {
        self.get_profile(name)?;
        self.active_profile = name.to_string();
        Ok(())
    }

    /// Remove a profile, clearing the active selection if it pointed there.
    pub fn remove_profile(&mut self, name: &str) -> Result<Profile> {
        let removed = self
            .profiles
            .remove(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_string(),
            })?;
        if self.active_profile == name {
            self.active_profile.clear();
        }
        Ok(removed)
    }
}

/// Base configuration directory: `$XDG_CONFIG_HOME`, else `~/.config`.
pub fn base_config_dir() -> Result<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(xdg));
    }
    let home_dir = dirs::home_dir().ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(home_dir.join(".config"))
}

/// Full path of the configuration file, honouring an explicit directory.
pub fn config_file_path(config_dir: Option<&Path>) -> Result<PathBuf> {
    match config_dir {
        Some(dir) => Ok(dir.join(CONFIG_FILE_NAME)),
        None => Ok(base_config_dir()?.join(PRODUCT).join(CONFIG_FILE_NAME)),
    }
}
