//! Bounded, non-empty text fields.
//!
//! Customer names, streets, and cities share the same rules: required,
//! trimmed, and capped at a per-field length.

/// Errors that can occur when parsing a bounded text field.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TextError {
    /// The input string is empty or only whitespace.
    #[error("cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// Parse a trimmed, non-empty string of at most `max` characters.
fn parse_bounded(s: &str, max: usize) -> Result<String, TextError> {
    let s = s.trim();

    if s.is_empty() {
        return Err(TextError::Empty);
    }

    if s.chars().count() > max {
        return Err(TextError::TooLong { max });
    }

    Ok(s.to_owned())
}

macro_rules! define_text {
    ($(#[$meta:meta])* $name:ident, $max:expr) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Maximum length in characters.
            pub const MAX_LENGTH: usize = $max;

            /// Parse from a string, trimming surrounding whitespace.
            ///
            /// # Errors
            ///
            /// Returns [`TextError`] if the trimmed input is empty or longer
            /// than [`Self::MAX_LENGTH`] characters.
            pub fn parse(s: &str) -> Result<Self, TextError> {
                parse_bounded(s, Self::MAX_LENGTH).map(Self)
            }

            /// Returns the value as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the value and returns its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_text!(
    /// A customer's display name.
    CustomerName,
    100
);

define_text!(
    /// The street line of an address.
    Street,
    100
);

define_text!(
    /// The city of an address.
    City,
    50
);
