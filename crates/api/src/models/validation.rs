//! Field validation errors collected across a request body.
//!
//! Handlers validate the whole payload before touching the store and report
//! every failing field at once, keyed by its JSON path (e.g. `name`,
//! `addresses[1].city`).

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use univali_core::{Cpf, CpfError, TextError};

/// Validation failures keyed by field path, in field-path order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for `field`, if any.
    #[must_use]
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Validate a required text field with the given parser.
    ///
    /// Returns `None` (and records a message) if the value is missing or
    /// fails to parse.
    pub fn text<T>(
        &mut self,
        field: &str,
        value: Option<&str>,
        parse: fn(&str) -> Result<T, TextError>,
    ) -> Option<T> {
        let Some(value) = value else {
            self.add(field, required_message(field));
            return None;
        };

        match parse(value) {
            Ok(parsed) => Some(parsed),
            Err(TextError::Empty) => {
                self.add(field, required_message(field));
                None
            }
            Err(e) => {
                self.add(field, format!("The {field} field {e}."));
                None
            }
        }
    }

    /// Validate a required CPF field.
    pub fn cpf(&mut self, field: &str, value: Option<&str>) -> Option<Cpf> {
        let Some(value) = value else {
            self.add(field, required_message(field));
            return None;
        };

        match Cpf::parse(value) {
            Ok(cpf) => Some(cpf),
            Err(CpfError::Empty) => {
                self.add(field, required_message(field));
                None
            }
            Err(CpfError::TooLong { max }) => {
                self.add(field, format!("The {field} field must be at most {max} characters."));
                None
            }
            Err(CpfError::NonDigit) => {
                self.add(field, format!("The {field} field must contain only digits."));
                None
            }
        }
    }

    /// Finish validation: `Ok` only if nothing was recorded and a value was built.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field failed.
    pub fn into_result<T>(self, value: Option<T>) -> Result<T, Self> {
        match value {
            Some(value) if self.is_empty() => Ok(value),
            _ => Err(self),
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

fn required_message(field: &str) -> String {
    format!("The {field} field is required.")
}
