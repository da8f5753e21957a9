use serde::{Deserialize, Serialize};

/// Maximum characters kept by the string sanitizer
pub const MAX_STRING_LENGTH: usize = 1000;
/// Maximum elements kept by the array sanitizer
pub const MAX_ARRAY_LENGTH: usize = 20;
/// Maximum nesting depth walked by the object sanitizer
pub const MAX_DEPTH: usize = 5;
/// Default serialized size cap for free-form fields (10 KB)
pub const MAX_FIELD_BYTES: usize = 10 * 1024;
/// Default serialized size cap for design canvas payloads (500 KB)
pub const MAX_CANVAS_BYTES: usize = 500 * 1024;
/// Longest URL accepted by the safe-URL gate
pub const MAX_URL_LENGTH: usize = 2048;

/// Limits applied by the sanitizers and the rule interpreter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanitizationConfig {
    pub max_string_length: usize,
    pub max_array_length: usize,
    pub max_depth: usize,
    pub max_field_bytes: usize,
    pub max_canvas_bytes: usize,
    pub max_url_length: usize,
    /// Enables the private/internal host denylist for URLs
    pub production: bool,
}

impl Default for SanitizationConfig {
    fn default() -> Self {
        Self {
            max_string_length: MAX_STRING_LENGTH,
            max_array_length: MAX_ARRAY_LENGTH,
            max_depth: MAX_DEPTH,
            max_field_bytes: MAX_FIELD_BYTES,
            max_canvas_bytes: MAX_CANVAS_BYTES,
            max_url_length: MAX_URL_LENGTH,
            production: false,
        }
    }
}

impl SanitizationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Production defaults: same limits, internal hosts denied
    pub fn production() -> Self {
        Self::default().with_production(true)
    }

    pub fn with_production(mut self, enabled: bool) -> Self {
        self.production = enabled;
        self
    }

    pub fn with_max_field_bytes(mut self, bytes: usize) -> Self {
        self.max_field_bytes = bytes;
        self
    }

    pub fn with_max_canvas_bytes(mut self, bytes: usize) -> Self {
        self.max_canvas_bytes = bytes;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}
