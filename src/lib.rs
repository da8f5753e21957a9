//! # RoomieLab API
//!
//! HTTP backend for an AR room-planning app: accounts, profiles, projects,
//! designs, a furniture catalog and favorites, stored as JSON documents.
//!
//! ## Architecture Layers
//!
//! - **Domain**: entities, caller identity, domain errors
//! - **Application**: use cases and ports (document store, identity provider)
//! - **Infrastructure**: in-memory and PostgreSQL document stores, JWT identity provider
//! - **API**: handlers, request sanitization and validation, auth gate, error envelope
//!
//! ## Example Usage
//!
//! ```no_run
//! use roomielab_api::{application::builder::ApplicationBuilder, api::create_router, Config};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let state = ApplicationBuilder::new(Config::default())
//!     .with_document_store()
//!     .await?
//!     .with_identity()?
//!     .build()?;
//! let _app = create_router(state);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use api::errors as api_errors;
pub use api::middleware::input_sanitization::{
    is_safe_url, sanitize_array, sanitize_object, sanitize_string,
};
pub use application::{dto, ports, use_cases};
pub use config::Config;
pub use domain::errors as domain_errors;
pub use domain::entities;
