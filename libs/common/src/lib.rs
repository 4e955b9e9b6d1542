//! Common library for the portfolio admin client
//!
//! This crate provides the pieces shared by every consumer of the portfolio
//! API: the domain models, the HTTP client, configuration loading, and the
//! error taxonomy used across the workspace.
//!
//! ```rust,no_run
//! use common::{AdminConfig, ApiClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AdminConfig::from_env()?;
//!     let client = ApiClient::new(&config)?;
//!     let identity = client.current_user("my-token").await?;
//!     println!("Logged in as {}", identity.username);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod tags;
pub mod validation;

pub use client::ApiClient;
pub use config::AdminConfig;
pub use error::{ApiError, ApiResult};
