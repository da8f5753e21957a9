use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use super::config::SanitizationConfig;

/// Placeholder written where the object sanitizer hits its depth limit
pub const DEPTH_SENTINEL: &str = "[MAX_DEPTH_EXCEEDED]";

/// HTML, SQL and shell metacharacters removed from every string
pub const DENYLIST: &[char] = &['<', '>', '"', '\'', '`', '\\', ';', '\0'];

/// `<script>` and `<style>` elements are dropped together with their content
static EMBEDDED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
        .expect("Invalid regex pattern for embedded blocks")
});

static MARKUP_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("Invalid regex pattern for markup tags"));

/// Core sanitization functions
pub struct Sanitizer;

impl Sanitizer {
    /// Trim, strip markup and denylisted characters, then cap the length
    pub fn sanitize_string(input: &str, config: &SanitizationConfig) -> String {
        let without_markup = Self::strip_markup(input.trim());

        let cleaned: String = without_markup
            .chars()
            .filter(|c| !DENYLIST.contains(c))
            .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
            .take(config.max_string_length)
            .collect();

        cleaned.trim().to_string()
    }

    /// String sanitizer over an arbitrary JSON value; non-strings become `""`
    pub fn sanitize_value_as_string(value: &Value, config: &SanitizationConfig) -> String {
        match value {
            Value::String(s) => Self::sanitize_string(s, config),
            _ => String::new(),
        }
    }

    /// Remove every tag, with no allowed elements or attributes
    pub fn strip_markup(input: &str) -> String {
        if !input.contains('<') {
            return input.to_string();
        }
        let without_blocks = EMBEDDED_BLOCK.replace_all(input, "");
        MARKUP_TAG.replace_all(&without_blocks, "").into_owned()
    }

    /// Element-wise sanitization; empty strings dropped, length capped
    pub fn sanitize_array(value: &Value, config: &SanitizationConfig) -> Vec<Value> {
        let Value::Array(items) = value else {
            return Vec::new();
        };

        items
            .iter()
            .map(|item| match item {
                Value::String(s) => Value::String(Self::sanitize_string(s, config)),
                other => other.clone(),
            })
            .filter(|item| !matches!(item, Value::String(s) if s.is_empty()))
            .take(config.max_array_length)
            .collect()
    }

    /// Recursive sanitization of keys and string leaves.
    ///
    /// Subtrees nested deeper than `max_depth` are replaced with
    /// [`DEPTH_SENTINEL`]. Scalars other than strings are returned as-is.
    pub fn sanitize_object(value: &Value, config: &SanitizationConfig) -> Value {
        Self::sanitize_node(value, 0, config)
    }

    fn sanitize_node(value: &Value, depth: usize, config: &SanitizationConfig) -> Value {
        match value {
            Value::String(s) => Value::String(Self::sanitize_string(s, config)),
            Value::Array(_) | Value::Object(_) if depth > config.max_depth => {
                Value::String(DEPTH_SENTINEL.to_string())
            }
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| Self::sanitize_node(item, depth + 1, config))
                    .collect(),
            ),
            Value::Object(map) => {
                let mut sanitized = Map::with_capacity(map.len());
                for (key, child) in map {
                    let key = Self::sanitize_string(key, config);
                    if key.is_empty() {
                        continue;
                    }
                    sanitized.insert(key, Self::sanitize_node(child, depth + 1, config));
                }
                Value::Object(sanitized)
            }
            other => other.clone(),
        }
    }

    /// Serialized byte length of a value
    pub fn serialized_size(value: &Value) -> usize {
        serde_json::to_vec(value).map(|bytes| bytes.len()).unwrap_or(usize::MAX)
    }

    /// Reject values whose JSON form exceeds `max_bytes`
    pub fn validate_object_size(
        value: &Value,
        field_name: &str,
        max_bytes: usize,
    ) -> Result<(), String> {
        if Self::serialized_size(value) > max_bytes {
            return Err(format!(
                "{} is too large (max {} KB)",
                field_name,
                max_bytes / 1024
            ));
        }
        Ok(())
    }
}
