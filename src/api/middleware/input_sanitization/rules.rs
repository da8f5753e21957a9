//! Declarative field rules and the interpreter that runs them.
//!
//! A [`RuleSet`] is an ordered list of [`FieldRule`]s. Each rule locates a
//! field with a dot path (`*` walks every array element) and carries an
//! ordered list of [`Step`]s: transforms rewrite the current value, checks
//! record a message when they fail. Every rule runs, so one request reports
//! all of its violations at once.

use serde_json::{Map, Value};

use super::config::SanitizationConfig;
use super::sanitizers::Sanitizer;
use super::validators::Validator;
use crate::api::middleware::validation::{FieldError, ValidationErrors};

/// Which serialized size cap a [`Check::MaxSize`] applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeLimit {
    Field,
    Canvas,
}

/// Value rewrites applied in rule order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Trim,
    NormalizeEmail,
    /// Numeric strings (query parameters) become JSON numbers
    ToNumber,
    SanitizeString,
    SanitizeArray,
    SanitizeObject,
}

/// Constraints evaluated against the current value of a field
#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    /// Present, not null, and not an empty string or array
    Required,
    IsString,
    /// Character count of a string, inclusive
    Length { min: usize, max: usize },
    Email,
    Phone,
    Boolean,
    Object,
    Array { min_items: usize, max_items: usize },
    /// Every array element is a non-empty string
    StringItems,
    Number { min: Option<f64>, max: Option<f64> },
    Coordinate,
    OneOf(&'static [&'static str]),
    SafeUrl,
    MaxSize(SizeLimit),
    DocumentId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Transform(Transform),
    Check(Check, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Wildcard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSeg {
    Key(String),
    Index(usize),
}

/// One field's locator, optionality and ordered steps
#[derive(Debug, Clone)]
pub struct FieldRule {
    path: String,
    segments: Vec<Segment>,
    optional: bool,
    steps: Vec<Step>,
}

impl FieldRule {
    /// A field that must be present
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let segments = path
            .split('.')
            .filter(|s| !s.is_empty())
            .map(|s| match s {
                "*" => Segment::Wildcard,
                key => Segment::Key(key.to_string()),
            })
            .collect();

        Self {
            path,
            segments,
            optional: false,
            steps: Vec::new(),
        }
    }

    /// A field skipped entirely when absent or `null`
    pub fn optional(path: impl Into<String>) -> Self {
        Self {
            optional: true,
            ..Self::new(path)
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.steps.push(Step::Transform(transform));
        self
    }

    pub fn check(mut self, check: Check, message: impl Into<String>) -> Self {
        self.steps.push(Step::Check(check, message.into()));
        self
    }

    pub fn trim(self) -> Self {
        self.transform(Transform::Trim)
    }

    pub fn sanitize(self) -> Self {
        self.transform(Transform::SanitizeString)
    }

    pub fn required(self, message: impl Into<String>) -> Self {
        self.check(Check::Required, message)
    }

    pub fn length(self, min: usize, max: usize, message: impl Into<String>) -> Self {
        self.check(Check::Length { min, max }, message)
    }

    /// Expand the locator against a body into concrete paths
    fn resolve<'a>(&self, body: &'a Value) -> Vec<(Vec<PathSeg>, Option<&'a Value>)> {
        let mut matches = Vec::new();
        resolve_into(Some(body), &self.segments, Vec::new(), &mut matches);
        matches
    }
}

/// Named, ordered collection of field rules for one request type
#[derive(Debug, Clone)]
pub struct RuleSet {
    name: &'static str,
    rules: Vec<FieldRule>,
}

impl RuleSet {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rules: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn field(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn fields(mut self, rules: impl IntoIterator<Item = FieldRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Run every rule against `body`.
    ///
    /// On success the returned value holds only the declared fields, with
    /// their transformed values. On failure every violation is returned in
    /// rule order.
    pub fn evaluate(
        &self,
        body: &Value,
        config: &SanitizationConfig,
    ) -> Result<Value, ValidationErrors> {
        let mut output = Value::Object(Map::new());
        let mut errors = Vec::new();

        for rule in &self.rules {
            for (path, value) in rule.resolve(body) {
                let present = value.is_some_and(|v| !v.is_null());
                if rule.optional && !present {
                    continue;
                }

                let field = display_path(&path);
                let mut current = value.cloned().unwrap_or(Value::Null);

                for step in &rule.steps {
                    match step {
                        Step::Transform(transform) => {
                            current = apply_transform(*transform, current, config);
                        }
                        Step::Check(check, message) => {
                            if !holds(check, &current, config) {
                                errors.push(FieldError::new(&field, message));
                            }
                        }
                    }
                }

                if present {
                    set_path(&mut output, &path, current);
                }
            }
        }

        if errors.is_empty() {
            Ok(output)
        } else {
            Err(ValidationErrors::new(errors))
        }
    }
}

fn resolve_into<'a>(
    value: Option<&'a Value>,
    segments: &[Segment],
    prefix: Vec<PathSeg>,
    out: &mut Vec<(Vec<PathSeg>, Option<&'a Value>)>,
) {
    let Some((head, rest)) = segments.split_first() else {
        out.push((prefix, value));
        return;
    };

    match head {
        Segment::Key(key) => {
            let next = value.and_then(|v| v.get(key.as_str()));
            let mut path = prefix;
            path.push(PathSeg::Key(key.clone()));
            resolve_into(next, rest, path, out);
        }
        Segment::Wildcard => {
            if let Some(Value::Array(items)) = value {
                for (index, item) in items.iter().enumerate() {
                    let mut path = prefix.clone();
                    path.push(PathSeg::Index(index));
                    resolve_into(Some(item), rest, path, out);
                }
            }
        }
    }
}

/// `objects[0].position.x` style rendering; the empty path is `body`
fn display_path(path: &[PathSeg]) -> String {
    if path.is_empty() {
        return "body".to_string();
    }

    let mut rendered = String::new();
    for seg in path {
        match seg {
            PathSeg::Key(key) => {
                if !rendered.is_empty() {
                    rendered.push('.');
                }
                rendered.push_str(key);
            }
            PathSeg::Index(index) => {
                rendered.push_str(&format!("[{}]", index));
            }
        }
    }
    rendered
}

fn set_path(target: &mut Value, path: &[PathSeg], value: Value) {
    let Some((head, rest)) = path.split_first() else {
        *target = value;
        return;
    };

    match head {
        PathSeg::Key(key) => {
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            if let Value::Object(map) = target {
                let slot = map.entry(key.clone()).or_insert(Value::Null);
                set_path(slot, rest, value);
            }
        }
        PathSeg::Index(index) => {
            if !target.is_array() {
                *target = Value::Array(Vec::new());
            }
            if let Value::Array(items) = target {
                if items.len() <= *index {
                    items.resize(index + 1, Value::Null);
                }
                set_path(&mut items[*index], rest, value);
            }
        }
    }
}

fn apply_transform(transform: Transform, value: Value, config: &SanitizationConfig) -> Value {
    match transform {
        Transform::Trim => match value {
            Value::String(s) => Value::String(s.trim().to_string()),
            other => other,
        },
        Transform::NormalizeEmail => match value {
            Value::String(s) => Value::String(s.trim().to_lowercase()),
            other => other,
        },
        Transform::ToNumber => match &value {
            Value::String(s) => parse_number(s.trim()).map(Value::Number).unwrap_or(value),
            _ => value,
        },
        Transform::SanitizeString => {
            Value::String(Sanitizer::sanitize_value_as_string(&value, config))
        }
        Transform::SanitizeArray => Value::Array(Sanitizer::sanitize_array(&value, config)),
        Transform::SanitizeObject => Sanitizer::sanitize_object(&value, config),
    }
}

/// Integers stay integers so they deserialize into integer fields
fn parse_number(input: &str) -> Option<serde_json::Number> {
    if let Ok(integer) = input.parse::<i64>() {
        return Some(integer.into());
    }
    input
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
}

fn holds(check: &Check, value: &Value, config: &SanitizationConfig) -> bool {
    match check {
        Check::Required => match value {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            Value::Array(items) => !items.is_empty(),
            _ => true,
        },
        Check::IsString => value.is_string(),
        Check::Length { min, max } => value.as_str().is_some_and(|s| {
            let count = s.chars().count();
            count >= *min && count <= *max
        }),
        Check::Email => value.as_str().is_some_and(Validator::is_valid_email),
        Check::Phone => value.as_str().is_some_and(Validator::is_valid_phone),
        Check::Boolean => value.is_boolean(),
        Check::Object => value.is_object(),
        Check::Array {
            min_items,
            max_items,
        } => value
            .as_array()
            .is_some_and(|items| items.len() >= *min_items && items.len() <= *max_items),
        Check::StringItems => value.as_array().is_some_and(|items| {
            items
                .iter()
                .all(|item| item.as_str().is_some_and(|s| !s.trim().is_empty()))
        }),
        Check::Number { min, max } => value.as_f64().is_some_and(|n| {
            n.is_finite() && min.is_none_or(|m| n >= m) && max.is_none_or(|m| n <= m)
        }),
        Check::Coordinate => Validator::is_bounded_coordinate(value),
        Check::OneOf(allowed) => value.as_str().is_some_and(|s| allowed.contains(&s)),
        Check::SafeUrl => value
            .as_str()
            .is_some_and(|s| Validator::is_safe_url(s, config)),
        Check::MaxSize(limit) => {
            let max_bytes = match limit {
                SizeLimit::Field => config.max_field_bytes,
                SizeLimit::Canvas => config.max_canvas_bytes,
            };
            Sanitizer::serialized_size(value) <= max_bytes
        }
        Check::DocumentId => value
            .as_str()
            .is_some_and(|s| Validator::validate_document_id(s, "id").is_ok()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> SanitizationConfig {
        SanitizationConfig::default()
    }

    #[test]
    fn test_all_failures_are_reported() {
        let rules = RuleSet::new("test")
            .field(FieldRule::new("name").trim().required("name is required"))
            .field(FieldRule::new("email").check(Check::Email, "email is invalid"));

        let err = rules.evaluate(&json!({}), &config()).unwrap_err();

        let fields: Vec<&str> = err.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "email"]);
    }

    #[test]
    fn test_output_keeps_only_declared_fields() {
        let rules = RuleSet::new("test").field(FieldRule::new("name").trim().sanitize());

        let out = rules
            .evaluate(&json!({"name": "  <b>Sofa</b> ", "role": "admin"}), &config())
            .unwrap();

        assert_eq!(out, json!({"name": "Sofa"}));
    }

    #[test]
    fn test_optional_field_absent_or_null_is_skipped() {
        let rules = RuleSet::new("test")
            .field(FieldRule::optional("tags").check(Check::Array { min_items: 0, max_items: 2 }, "bad"));

        assert_eq!(rules.evaluate(&json!({}), &config()).unwrap(), json!({}));
        assert_eq!(
            rules.evaluate(&json!({"tags": null}), &config()).unwrap(),
            json!({})
        );
    }

    #[test]
    fn test_sanitize_runs_even_when_check_fails() {
        let rules = RuleSet::new("test").field(
            FieldRule::new("name")
                .length(10, 20, "name length")
                .sanitize(),
        );

        let err = rules.evaluate(&json!({"name": "<i>x</i>"}), &config()).unwrap_err();
        assert_eq!(err.errors().len(), 1);
        assert_eq!(err.errors()[0].field, "name");
    }

    #[test]
    fn test_wildcard_paths_render_indices() {
        let rules = RuleSet::new("test").field(
            FieldRule::optional("objects.*.position.x")
                .check(Check::Coordinate, "position.x out of range"),
        );

        let body = json!({
            "objects": [
                {"position": {"x": 1.5}},
                {"position": {"x": 2_000_000}}
            ]
        });

        let err = rules.evaluate(&body, &config()).unwrap_err();
        assert_eq!(err.errors().len(), 1);
        assert_eq!(err.errors()[0].field, "objects[1].position.x");
    }

    #[test]
    fn test_root_rule_targets_whole_body() {
        let rules = RuleSet::new("test").field(
            FieldRule::new("")
                .check(Check::Object, "body must be an object")
                .transform(Transform::SanitizeObject),
        );

        let out = rules
            .evaluate(&json!({"theme": "<b>dark</b>"}), &config())
            .unwrap();
        assert_eq!(out, json!({"theme": "dark"}));

        let err = rules.evaluate(&json!([1, 2]), &config()).unwrap_err();
        assert_eq!(err.errors()[0].field, "body");
    }

    #[test]
    fn test_to_number_converts_numeric_strings() {
        let rules = RuleSet::new("test").field(
            FieldRule::optional("minPrice")
                .transform(Transform::ToNumber)
                .check(Check::Number { min: Some(0.0), max: None }, "minPrice invalid"),
        );

        let out = rules.evaluate(&json!({"minPrice": "12.5"}), &config()).unwrap();
        assert_eq!(out["minPrice"], json!(12.5));

        assert!(rules.evaluate(&json!({"minPrice": "abc"}), &config()).is_err());
        assert!(rules.evaluate(&json!({"minPrice": "-1"}), &config()).is_err());
    }

    #[test]
    fn test_size_limit_uses_configured_cap() {
        let rules = RuleSet::new("test").field(
            FieldRule::optional("canvasData")
                .check(Check::MaxSize(SizeLimit::Canvas), "canvasData is too large"),
        );
        let small = config().with_max_canvas_bytes(32);

        let body = json!({"canvasData": {"blob": "x".repeat(64)}});
        let err = rules.evaluate(&body, &small).unwrap_err();
        assert!(err.errors()[0].message.contains("too large"));
        assert!(rules.evaluate(&body, &config()).is_ok());
    }
}
