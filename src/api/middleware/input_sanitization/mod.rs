//! Request sanitization and validation
//!
//! Pure sanitizers for strings, arrays and nested objects, the safe-URL
//! gate, and the declarative rule sets that combine them per request type.

pub mod config;
pub mod rule_sets;
pub mod rules;
pub mod sanitizers;
pub mod validators;


pub use config::{SanitizationConfig, MAX_CANVAS_BYTES, MAX_FIELD_BYTES};
pub use rules::{Check, FieldRule, RuleSet, SizeLimit, Step, Transform};
pub use sanitizers::{Sanitizer, DEPTH_SENTINEL};
pub use validators::Validator;

use serde_json::Value;

/// Sanitize a string with the default limits
pub fn sanitize_string(input: &str) -> String {
    Sanitizer::sanitize_string(input, &SanitizationConfig::default())
}

/// Sanitize an array with the default limits
pub fn sanitize_array(value: &Value) -> Vec<Value> {
    Sanitizer::sanitize_array(value, &SanitizationConfig::default())
}

/// Sanitize a nested object with the default limits
pub fn sanitize_object(value: &Value) -> Value {
    Sanitizer::sanitize_object(value, &SanitizationConfig::default())
}

/// URL gate; `production` enables the internal-host denylist
pub fn is_safe_url(candidate: &str, production: bool) -> bool {
    Validator::is_safe_url(
        candidate,
        &SanitizationConfig::default().with_production(production),
    )
}
