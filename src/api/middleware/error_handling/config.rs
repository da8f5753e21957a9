use std::collections::HashSet;

/// Error handling configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorHandlingConfig {
    /// Keep the `detail` field of 500 responses
    pub include_debug_info: bool,
    /// Log 4xx responses at `warn`; 5xx are always logged
    pub log_client_errors: bool,
    /// Details containing any of these are redacted even in development
    pub sensitive_patterns: HashSet<String>,
}

impl Default for ErrorHandlingConfig {
    fn default() -> Self {
        let sensitive_patterns = ["password", "secret", "token", "connection", "postgres://"]
            .into_iter()
            .map(String::from)
            .collect();

        Self {
            include_debug_info: cfg!(debug_assertions),
            log_client_errors: true,
            sensitive_patterns,
        }
    }
}

impl ErrorHandlingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Production hides every internal detail
    pub fn for_environment(production: bool) -> Self {
        Self::default().with_debug_info(!production)
    }

    pub fn with_debug_info(mut self, enabled: bool) -> Self {
        self.include_debug_info = enabled;
        self
    }

    pub fn with_client_error_logging(mut self, enabled: bool) -> Self {
        self.log_client_errors = enabled;
        self
    }

    pub fn with_sensitive_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.sensitive_patterns.insert(pattern.into());
        self
    }
}
