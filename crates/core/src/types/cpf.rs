//! National tax identifier (CPF) type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Cpf`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CpfError {
    /// The input string is empty or only whitespace.
    #[error("cpf cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("cpf must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains something other than ASCII digits.
    #[error("cpf must contain only digits")]
    NonDigit,
}

/// A customer's national tax identifier.
///
/// Used as an alternate lookup key for customers. Only the shape is checked;
/// the check digits are not verified.
///
/// ## Constraints
///
/// - Surrounding whitespace is trimmed
/// - Length: 1-11 characters
/// - ASCII digits only (no `.` or `-` punctuation)
///
/// ## Examples
///
/// ```
/// use univali_core::Cpf;
///
/// assert!(Cpf::parse("12345678909").is_ok());
/// assert!(Cpf::parse("111").is_ok());
///
/// assert!(Cpf::parse("").is_err());              // empty
/// assert!(Cpf::parse("123.456.789-09").is_err()); // punctuation
/// assert!(Cpf::parse("123456789012").is_err());   // too long
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Cpf(String);

impl Cpf {
    /// Maximum length of a CPF (11 digits).
    pub const MAX_LENGTH: usize = 11;

    /// Parse a `Cpf` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input:
    /// - Is empty
    /// - Is longer than 11 characters
    /// - Contains anything but ASCII digits
    pub fn parse(s: &str) -> Result<Self, CpfError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(CpfError::Empty);
        }

        if s.chars().count() > Self::MAX_LENGTH {
            return Err(CpfError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CpfError::NonDigit);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the CPF as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Cpf` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Cpf {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
