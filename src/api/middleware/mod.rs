pub mod auth;
pub mod cors;
pub mod error_handling;
pub mod input_sanitization;
pub mod validation;

pub use auth::{require_auth, BearerToken};
pub use cors::cors_layer_for;
pub use error_handling::{ErrorHandlingConfig, ErrorHandlingLayer};
pub use validation::{FieldError, RequestValidator, ValidationErrors};
