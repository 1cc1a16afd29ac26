use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Id;

// Write endpoints only accept alphanumeric-plus-space values; anything
// else is rejected before a query runs.
static TEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9 ]+$").expect("valid text pattern"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"));

/// One violated rule, reported back to the caller verbatim.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn missing(field: &str) -> Self {
        Self {
            field: field.to_string(),
            message: format!("Missing {field} parameter"),
        }
    }

    fn invalid(field: &str) -> Self {
        Self {
            field: field.to_string(),
            message: format!("Invalid {field} parameter"),
        }
    }
}

/// Accumulates the fixed rule list of one endpoint. Every rule is
/// evaluated so the caller gets the full violation list back, not just
/// the first failure; `finish` rejects before any query executes.
///
/// The typed getters return placeholders on failure -- those values are
/// unreachable because `finish` errors out first.
#[derive(Debug, Default)]
pub struct FieldCheck {
    errors: Vec<FieldError>,
}

impl FieldCheck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Required integer field (form value or path segment).
    pub fn int(&mut self, field: &str, value: Option<&str>) -> Id {
        match value {
            None => {
                self.errors.push(FieldError::missing(field));
                0
            }
            Some(raw) => match raw.trim().parse::<Id>() {
                Ok(v) => v,
                Err(_) => {
                    self.errors.push(FieldError::invalid(field));
                    0
                }
            },
        }
    }

    /// Required alphanumeric-plus-space string field.
    pub fn text(&mut self, field: &str, value: Option<&str>) -> String {
        match value {
            None => {
                self.errors.push(FieldError::missing(field));
                String::new()
            }
            Some(raw) if TEXT_RE.is_match(raw) => raw.to_string(),
            Some(_) => {
                self.errors.push(FieldError::invalid(field));
                String::new()
            }
        }
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) -> String {
        match value {
            None => {
                self.errors.push(FieldError::missing(field));
                String::new()
            }
            Some(raw) if EMAIL_RE.is_match(raw) => raw.to_string(),
            Some(_) => {
                self.errors.push(FieldError::invalid(field));
                String::new()
            }
        }
    }

    /// Required field with no character constraint (passwords).
    pub fn raw(&mut self, field: &str, value: Option<&str>) -> String {
        match value {
            None | Some("") => {
                self.errors.push(FieldError::missing(field));
                String::new()
            }
            Some(raw) => raw.to_string(),
        }
    }

    /// Record a violation the field kinds cannot express (e.g. the
    /// password confirmation mismatch).
    pub fn reject(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}
