//! Error response normalization
//!
//! - config.rs: what is logged and what is shown
//! - middleware.rs: tower layer rewriting error responses
//! - sanitizers.rs: message redaction and the envelope builder
//! - utils.rs: logging and database error mapping

pub mod config;
pub mod middleware;
pub mod sanitizers;
pub mod utils;

pub use config::ErrorHandlingConfig;
pub use middleware::{ErrorHandlingLayer, ErrorHandlingService};
pub use sanitizers::ErrorSanitizer;
pub use utils::{DatabaseErrorUtils, ErrorUtils};
