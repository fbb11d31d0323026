pub mod client;
pub mod error_bridge;
pub mod models;
pub mod pagination;
pub mod transport;
