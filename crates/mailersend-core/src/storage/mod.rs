//! Storage layer
//!
//! Multi-profile YAML configuration and credential resolution. The
//! configuration file is the only state that outlives an invocation.

use crate::error::ConfigError;

pub mod config;
pub mod credentials;

type Result<T> = std::result::Result<T, ConfigError>;
