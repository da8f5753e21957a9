use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::input_sanitization::{RuleSet, SanitizationConfig};

/// Field error details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every violation found while evaluating a rule set, in rule order
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Validation failed")]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![FieldError::new(field, message)])
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }
}

/// Runs rule sets against request bodies and deserializes the survivors
#[derive(Debug, Clone)]
pub struct RequestValidator {
    config: Arc<SanitizationConfig>,
}

impl RequestValidator {
    pub fn new(config: SanitizationConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &SanitizationConfig {
        &self.config
    }

    /// Evaluate `rules` and return the sanitized, allow-listed body
    pub fn validate_value(&self, rules: &RuleSet, body: &Value) -> Result<Value, ValidationErrors> {
        rules.evaluate(body, &self.config).inspect_err(|err| {
            tracing::debug!(
                rule_set = rules.name(),
                errors = err.errors().len(),
                "Request rejected by validation"
            );
        })
    }

    /// Evaluate `rules` and deserialize the result into `T`
    pub fn validate<T: DeserializeOwned>(
        &self,
        rules: &RuleSet,
        body: &Value,
    ) -> Result<T, ValidationErrors> {
        let sanitized = self.validate_value(rules, body)?;
        serde_json::from_value(sanitized).map_err(|e| ValidationErrors::single("body", e.to_string()))
    }

    /// Path parameters share the document id constraints
    pub fn validate_path_id(&self, value: &str, field_name: &str) -> Result<(), ValidationErrors> {
        super::input_sanitization::Validator::validate_document_id(value, field_name)
            .map_err(|message| ValidationErrors::single(field_name, message))
    }
}

impl Default for RequestValidator {
    fn default() -> Self {
        Self::new(SanitizationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::middleware::input_sanitization::rule_sets::PROJECT_CREATE;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct NewProject {
        name: String,
        #[serde(default)]
        tags: Vec<String>,
        #[serde(default)]
        is_public: bool,
    }

    #[test]
    fn test_validate_deserializes_sanitized_body() {
        let validator = RequestValidator::default();
        let project: NewProject = validator
            .validate(
                &PROJECT_CREATE,
                &json!({"name": " <b>Loft</b> ", "tags": ["a", ""], "isPublic": true, "userId": "x"}),
            )
            .unwrap();

        assert_eq!(project.name, "Loft");
        assert_eq!(project.tags, vec!["a"]);
        assert!(project.is_public);
    }

    #[test]
    fn test_validate_returns_every_error() {
        let validator = RequestValidator::default();
        let err = validator
            .validate::<NewProject>(&PROJECT_CREATE, &json!({"name": "ab", "isPublic": "yes"}))
            .unwrap_err();

        let fields: Vec<_> = err.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "isPublic"]);
    }

    #[test]
    fn test_path_id_validation() {
        let validator = RequestValidator::default();
        assert!(validator.validate_path_id("abc", "projectId").is_ok());
        let err = validator.validate_path_id("a/b", "projectId").unwrap_err();
        assert_eq!(err.errors()[0].field, "projectId");
    }
}
