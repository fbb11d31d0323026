//! Configuration service for profile management commands

use crate::AppError;
use crate::core::services::types::{CredentialKind, ProfileSummary};
use crate::error::ConfigError;
use crate::storage::config::{Config, Profile};
use std::path::{Path, PathBuf};

/// Loads the configuration file, applies profile operations and writes it
/// back.
pub struct ConfigService {
    path: PathBuf,
    config: Config,
}

impl ConfigService {
    /// Load the configuration at `path`. A missing file starts out empty.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let config = Config::load(&path)?;
        Ok(Self { path, config })
    }

    pub fn new(path: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Save configuration to file
    pub fn save_config(&self) -> Result<(), AppError> {
        self.config.save(&self.path).map_err(|e| e.into())
    }

    /// Store an API token under `name` and make that profile active.
    /// Unknown keys already present on the profile are kept.
    pub fn login(&mut self, name: &str, token: &str) -> Result<(), AppError> {
        let mut profile = self.config.profiles.remove(name).unwrap_or_default();
        profile.clear_credentials();
        profile.api_token = Some(token.to_string());
        self.config.set_profile(name.to_string(), profile);
        self.config.active_profile = name.to_string();
        self.save_config()
    }

    /// Drop the credentials of `name`, or of the active profile.
    /// Returns the name of the profile that was logged out.
    pub fn logout(&mut self, name: Option<&str>) -> Result<String, AppError> {
        let name = match name {
            Some(name) => name.to_string(),
            None => self.config.active()?.0.to_string(),
        };

        let profile = self.profile_mut(&name)?;
        profile.clear_credentials();
        self.save_config()?;
        Ok(name)
    }

    pub fn switch(&mut self, name: &str) -> Result<(), AppError> {
        self.config.switch(name)?;
        self.save_config()
    }

    pub fn remove(&mut self, name: &str) -> Result<(), AppError> {
        self.config.remove_profile(name)?;
        self.save_config()
    }

    /// Name of the profile used without `--profile`, if any.
    pub fn active_name(&self) -> Option<&str> {
        self.config.active().ok().map(|(name, _)| name)
    }

    pub fn list_profiles(&self) -> Vec<ProfileSummary> {
        let active = self.active_name();
        self.config
            .profiles
            .iter()
            .map(|(name, profile)| ProfileSummary {
                name: name.clone(),
                active: active == Some(name.as_str()),
                credential: CredentialKind::of(profile),
                oauth_expires_at: profile.oauth_expires_at,
            })
            .collect()
    }

    fn profile_mut(&mut self, name: &str) -> Result<&mut Profile, AppError> {
        self.config.profiles.get_mut(name).ok_or_else(|| {
            ConfigError::ProfileNotFound {
                name: name.to_string(),
            }
            .into()
        })
    }
}
