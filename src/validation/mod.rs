//! Field validation.
//!
//! Every write path builds the full candidate record first, runs its
//! `validator` rules and only touches the store when nothing was collected.
//! Violations leave this module as a flat list of `{field, value, message}`
//! entries, with nested paths such as `orderDetails.2.discount`.

use std::borrow::Cow;
use std::fmt::{self, Display};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;
use validator::{ValidationError, ValidationErrorsKind};

pub mod order;

/// Accepts the empty string as well as `local@domain.tld`.
pub static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_.\-]+@([A-Za-z0-9_\-]+\.)+[A-Za-z0-9_\-]{2,4})?$")
        .expect("email pattern compiles")
});

/// Mobile numbers: optional leading 0, carrier prefix, seven digits.
pub static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^0?(3[2-9]|5[689]|7[06-9]|8[0-689]|9[0-46-9])[0-9]{7}$")
        .expect("phone pattern compiles")
});

const REQUIRED: &str = "Path `{PATH}` is required.";
const BELOW_MIN: &str = "Path `{PATH}` ({VALUE}) is less than minimum allowed value ({MIN}).";
const ABOVE_MAX: &str = "Path `{PATH}` ({VALUE}) is more than maximum allowed value ({MAX}).";
const TOO_SHORT: &str = "Path `{PATH}` is shorter than the minimum allowed length ({MIN}).";
const INVALID: &str = "Path `{PATH}` is invalid.";

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

pub fn is_valid_phone(value: &str) -> bool {
    PHONE_RE.is_match(value)
}

/// Substitute the rejected value into a `{VALUE}` message template.
pub fn render_message(template: &str, value: impl Display) -> String {
    template.replace("{VALUE}", &value.to_string())
}

/// A custom rule failure carrying the rejected value for message rendering.
pub fn rule_error(
    code: &'static str,
    message: &'static str,
    value: impl Serialize,
) -> ValidationError {
    let mut err = ValidationError::new(code).with_message(Cow::Borrowed(message));
    err.add_param(Cow::Borrowed("value"), &value);
    err
}

/// Text fields that must hold something other than whitespace.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.add_param(Cow::Borrowed("value"), &value);
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }

    pub fn push(&mut self, field: impl Into<String>, value: Option<String>, message: String) {
        self.errors.push(FieldError {
            field: field.into(),
            value,
            message,
        });
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Record a violation found outside the derived rules, such as a dangling reference.
    pub fn reject(&mut self, field: impl Into<String>, value: impl Display, template: &str) {
        let value = value.to_string();
        let message = render_message(template, &value);
        self.push(field, Some(value), message);
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    fn collect(&mut self, prefix: &str, errors: &validator::ValidationErrors) {
        for (field, kind) in errors.errors() {
            let name = camel_case(field);
            let path = if prefix.is_empty() {
                name
            } else {
                format!("{prefix}.{name}")
            };
            match kind {
                ValidationErrorsKind::Field(list) => {
                    for err in list {
                        // struct-level rules name their field in a param
                        let path = match err.params.get("field").and_then(|f| f.as_str()) {
                            Some(named) if field == "__all__" => named.to_string(),
                            _ => path.clone(),
                        };
                        self.push_rule(path, err);
                    }
                }
                ValidationErrorsKind::Struct(inner) => self.collect(&path, inner),
                ValidationErrorsKind::List(items) => {
                    for (index, inner) in items {
                        self.collect(&format!("{path}.{index}"), inner);
                    }
                }
            }
        }
    }

    fn push_rule(&mut self, path: String, err: &ValidationError) {
        let value = err.params.get("value").and_then(param_text);
        let min = err.params.get("min").and_then(param_text);
        let max = err.params.get("max").and_then(param_text);

        let template: &str = match (&err.message, &*err.code) {
            (Some(message), _) => &**message,
            (None, "required") => REQUIRED,
            (None, "range") => {
                let below = match (
                    err.params.get("value").and_then(|v| v.as_f64()),
                    err.params.get("min").and_then(|v| v.as_f64()),
                ) {
                    (Some(value), Some(min)) => value < min,
                    _ => false,
                };
                if below { BELOW_MIN } else { ABOVE_MAX }
            }
            (None, "length") => TOO_SHORT,
            (None, _) => INVALID,
        };

        let message = template
            .replace("{PATH}", &path)
            .replace("{VALUE}", value.as_deref().unwrap_or_default())
            .replace("{MIN}", min.as_deref().unwrap_or_default())
            .replace("{MAX}", max.as_deref().unwrap_or_default());

        // a rejected password is never echoed back
        let value = if path.ends_with("password") { None } else { value };
        self.push(path, value, message);
    }
}

impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut collected = ValidationErrors::new();
        collected.collect("", &errors);
        collected.errors.sort_by(|a, b| a.field.cmp(&b.field));
        collected
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

fn param_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) => Some(text.clone()),
        serde_json::Value::Number(number) => match number.as_i64() {
            Some(int) => Some(int.to_string()),
            None => number.as_f64().map(|float| float.to_string()),
        },
        other => Some(other.to_string()),
    }
}

/// `order_details` -> `orderDetails`
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}
