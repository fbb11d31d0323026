//! # mailersend-core
//!
//! Core library for the MailerSend command line client.
//!
//! This crate holds everything below the command surface: credential
//! storage, the retrying HTTP transport, error enrichment, pagination,
//! the typed API client and table rendering.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mailersend_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> mailersend_core::Result<()> {
//!     let ctx = InvocationContext::default();
//!     let client = ClientFactory::from_env().build(&ctx).await?;
//!
//!     let domains = fetch_all(|page, per_page| client.list_domains(page, per_page), 0).await?;
//!     println!("{}", TableDisplay::new().render_domains(&domains));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture (4-Layer)
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │           API Layer                 │  transport, error bridge, pagination, client
//! ├─────────────────────────────────────┤
//! │          Core Layer                 │  OAuth refresh, domain resolver, client factory
//! ├─────────────────────────────────────┤
//! │        Storage Layer                │  config.yaml, credential resolution
//! ├─────────────────────────────────────┤
//! │         Utils Layer                 │  verbose tracing, text, validation, files
//! └─────────────────────────────────────┘
//! ```

pub use error::AppError;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use mailersend_core::prelude::*;
/// ```
pub mod prelude {
    // Error handling
    pub use crate::Result;
    pub use crate::error::{ApiError, AppError};

    // API client and models
    pub use crate::api::client::MailerSendClient;
    pub use crate::api::models::{
        Activity, ActivityQuery, ApiToken, Domain, EmailAddress, EmailRequest, SendOutcome,
        SmsRequest, Template, Webhook,
    };
    pub use crate::api::pagination::{Page, fetch_all};
    pub use crate::api::transport::{RetryConfig, RetryingTransport, TransportConfig};

    // Services
    pub use crate::core::services::client_factory::{ClientFactory, InvocationContext};
    pub use crate::core::services::config_service::ConfigService;
    pub use crate::core::services::domain_resolver::DomainResolver;

    // Storage
    pub use crate::storage::config::{Config, Profile};
    pub use crate::storage::credentials::{CredentialStore, TokenSource};

    // Display utilities
    pub use crate::display::TableDisplay;
}

/// Business logic layer: OAuth refresh and the services commands build on.
pub mod core;

/// Storage layer - configuration file and credential resolution.
pub mod storage;

/// Utilities layer - shared helpers.
///
/// - [`utils::logging`]: verbose request/response tracing
/// - [`utils::text`]: text formatting and truncation
/// - [`utils::validation`]: argument validation
/// - [`utils::file`]: owner-only atomic file writes
pub mod utils;

/// API layer - HTTP transport, typed client and data models.
pub mod api;

/// Display layer - table rendering.
pub mod display;

/// Error handling - hierarchical error system with troubleshooting hints.
pub mod error;

/// Convenient Result type alias using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
