pub mod client_factory;
pub mod config_service;
pub mod domain_resolver;
pub mod types;
