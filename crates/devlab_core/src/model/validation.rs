//! Field-keyed validation errors.
//!
//! Validation failures are collected per field so the boundary can render
//! them as `{"field": ["message", ...]}` without re-parsing text.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Key used for failures that do not belong to one input field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Collected validation failures keyed by input field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an error set holding one message.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Messages recorded for one field, empty when the field is valid.
    pub fn messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    /// Converts the collected set into `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl Error for ValidationErrors {}

/// Records an `expected_end_date` failure when `end` precedes `start`.
pub fn check_date_order(start: NaiveDate, end: Option<NaiveDate>, errors: &mut ValidationErrors) {
    if let Some(end) = end {
        if end < start {
            errors.add(
                "expected_end_date",
                "expected end date cannot be earlier than the start date",
            );
        }
    }
}

/// Records a failure when `value` is blank or longer than `max_chars`.
pub fn check_required_text(
    field: &str,
    value: &str,
    max_chars: usize,
    errors: &mut ValidationErrors,
) {
    if value.trim().is_empty() {
        errors.add(field, "this field may not be blank");
    } else if value.chars().count() > max_chars {
        errors.add(
            field,
            format!("ensure this field has no more than {max_chars} characters"),
        );
    }
}
