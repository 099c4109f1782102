//! Partial updates of a customer's scalar fields.
//!
//! A patch document is an ordered list of JSON-Patch style operations
//! (`add`, `remove`, `replace`, `copy`, `move`, `test`) restricted to the
//! patchable fields `/name` and `/cpf`:
//!
//! ```json
//! [
//!   { "op": "test",    "path": "/cpf",  "value": "111" },
//!   { "op": "replace", "path": "/name", "value": "Ana Maria" }
//! ]
//! ```
//!
//! Operations run against a scratch copy of the fields. The result is
//! validated before anything is written back, so a failing operation or an
//! invalid outcome leaves the stored customer untouched.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use super::customer::CustomerFields;
use super::validation::ValidationErrors;

/// A customer field that patch operations may address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum PatchField {
    Name,
    Cpf,
}

impl PatchField {
    /// The JSON pointer for this field.
    #[must_use]
    pub const fn pointer(self) -> &'static str {
        match self {
            Self::Name => "/name",
            Self::Cpf => "/cpf",
        }
    }
}

impl fmt::Display for PatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pointer())
    }
}

/// A patch path that does not name a patchable field.
#[derive(Debug, Error)]
#[error("unsupported patch path `{0}`, expected `/name` or `/cpf`")]
pub struct UnsupportedPath(String);

impl TryFrom<String> for PatchField {
    type Error = UnsupportedPath;

    fn try_from(path: String) -> Result<Self, Self::Error> {
        let field = path.strip_prefix('/').unwrap_or_default();
        if field.eq_ignore_ascii_case("name") {
            Ok(Self::Name)
        } else if field.eq_ignore_ascii_case("cpf") {
            Ok(Self::Cpf)
        } else {
            Err(UnsupportedPath(path))
        }
    }
}

/// One patch operation.
///
/// `value` must be present on `add`, `replace` and `test`; an explicit
/// `null` is accepted and clears (or tests for) an absent field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add {
        path: PatchField,
        #[serde(deserialize_with = "Option::deserialize")]
        value: Option<String>,
    },
    Remove {
        path: PatchField,
    },
    Replace {
        path: PatchField,
        #[serde(deserialize_with = "Option::deserialize")]
        value: Option<String>,
    },
    Move {
        from: PatchField,
        path: PatchField,
    },
    Copy {
        from: PatchField,
        path: PatchField,
    },
    Test {
        path: PatchField,
        #[serde(deserialize_with = "Option::deserialize")]
        value: Option<String>,
    },
}

/// An ordered list of patch operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct PatchDocument(Vec<PatchOperation>);

/// Errors raised while applying a patch document.
#[derive(Debug, Error)]
pub enum PatchError {
    /// A `test` operation found a different value.
    #[error("patch operation {index} failed: {path} is {actual:?}, expected {expected:?}")]
    TestFailed {
        index: usize,
        path: PatchField,
        expected: Option<String>,
        actual: Option<String>,
    },

    /// The patched customer does not pass validation.
    #[error("patched customer is invalid: {0}")]
    Invalid(ValidationErrors),
}

/// Working copy of the patchable fields. `None` means the field was removed.
#[derive(Debug, Clone, Default)]
struct PatchTarget {
    name: Option<String>,
    cpf: Option<String>,
}

impl PatchTarget {
    fn slot(&mut self, field: PatchField) -> &mut Option<String> {
        match field {
            PatchField::Name => &mut self.name,
            PatchField::Cpf => &mut self.cpf,
        }
    }

    fn get(&self, field: PatchField) -> Option<&String> {
        match field {
            PatchField::Name => self.name.as_ref(),
            PatchField::Cpf => self.cpf.as_ref(),
        }
    }

    fn apply(&mut self, index: usize, op: &PatchOperation) -> Result<(), PatchError> {
        match op {
            PatchOperation::Add { path, value } | PatchOperation::Replace { path, value } => {
                self.slot(*path).clone_from(value);
            }
            PatchOperation::Remove { path } => {
                *self.slot(*path) = None;
            }
            PatchOperation::Copy { from, path } => {
                let value = self.get(*from).cloned();
                *self.slot(*path) = value;
            }
            PatchOperation::Move { from, path } => {
                if from != path {
                    let value = self.slot(*from).take();
                    *self.slot(*path) = value;
                }
            }
            PatchOperation::Test { path, value } => {
                let actual = self.get(*path);
                if actual != value.as_ref() {
                    return Err(PatchError::TestFailed {
                        index,
                        path: *path,
                        expected: value.clone(),
                        actual: actual.cloned(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl From<&CustomerFields> for PatchTarget {
    fn from(fields: &CustomerFields) -> Self {
        Self {
            name: Some(fields.name.as_str().to_owned()),
            cpf: Some(fields.cpf.as_str().to_owned()),
        }
    }
}

impl PatchDocument {
    #[must_use]
    pub fn operations(&self) -> &[PatchOperation] {
        &self.0
    }

    /// Apply every operation to a copy of `current` and validate the result.
    ///
    /// # Errors
    ///
    /// Returns `PatchError::TestFailed` on the first failing `test` operation
    /// and `PatchError::Invalid` if the outcome fails validation.
    pub fn apply_to(&self, current: &CustomerFields) -> Result<CustomerFields, PatchError> {
        let mut target = PatchTarget::from(current);
        for (index, op) in self.0.iter().enumerate() {
            target.apply(index, op)?;
        }

        CustomerFields::validate(target.name.as_deref(), target.cpf.as_deref())
            .map_err(PatchError::Invalid)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(name: &str, cpf: &str) -> CustomerFields {
        CustomerFields::validate(Some(name), Some(cpf)).unwrap()
    }

    fn document(value: serde_json::Value) -> PatchDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_replace_name() {
        let patch = document(json!([{ "op": "replace", "path": "/name", "value": "Bia" }]));
        let patched = patch.apply_to(&fields("Ana", "111")).unwrap();

        assert_eq!(patched.name.as_str(), "Bia");
        assert_eq!(patched.cpf.as_str(), "111");
    }

    #[test]
    fn test_paths_are_case_insensitive() {
        let patch = document(json!([{ "op": "add", "path": "/CPF", "value": "999" }]));
        let patched = patch.apply_to(&fields("Ana", "111")).unwrap();
        assert_eq!(patched.cpf.as_str(), "999");
    }

    #[test]
    fn test_copy_and_move() {
        let patch = document(json!([
            { "op": "copy", "from": "/cpf", "path": "/name" },
        ]));
        let patched = patch.apply_to(&fields("Ana", "111")).unwrap();
        assert_eq!(patched.name.as_str(), "111");

        let patch = document(json!([
            { "op": "move", "from": "/cpf", "path": "/name" },
            { "op": "add", "path": "/cpf", "value": "222" },
        ]));
        let patched = patch.apply_to(&fields("Ana", "111")).unwrap();
        assert_eq!(patched.name.as_str(), "111");
        assert_eq!(patched.cpf.as_str(), "222");
    }

    #[test]
    fn test_move_onto_itself_is_noop() {
        let patch = document(json!([{ "op": "move", "from": "/name", "path": "/name" }]));
        let patched = patch.apply_to(&fields("Ana", "111")).unwrap();
        assert_eq!(patched.name.as_str(), "Ana");
    }

    #[test]
    fn test_failed_test_op() {
        let patch = document(json!([
            { "op": "replace", "path": "/name", "value": "Bia" },
            { "op": "test", "path": "/cpf", "value": "000" },
        ]));
        let err = patch.apply_to(&fields("Ana", "111")).unwrap_err();

        match err {
            PatchError::TestFailed {
                index,
                path,
                expected,
                actual,
            } => {
                assert_eq!(index, 1);
                assert_eq!(path, PatchField::Cpf);
                assert_eq!(expected.as_deref(), Some("000"));
                assert_eq!(actual.as_deref(), Some("111"));
            }
            PatchError::Invalid(_) => panic!("expected TestFailed"),
        }
    }

    #[test]
    fn test_remove_fails_validation() {
        let patch = document(json!([{ "op": "remove", "path": "/name" }]));
        let err = patch.apply_to(&fields("Ana", "111")).unwrap_err();

        let PatchError::Invalid(errors) = err else {
            panic!("expected Invalid");
        };
        assert_eq!(
            errors.field("name").unwrap(),
            ["The name field is required."]
        );
    }

    #[test]
    fn test_invalid_value_fails_validation() {
        let patch = document(json!([{ "op": "replace", "path": "/cpf", "value": "12a" }]));
        assert!(matches!(
            patch.apply_to(&fields("Ana", "111")),
            Err(PatchError::Invalid(_))
        ));
    }

    #[test]
    fn test_unsupported_path_is_rejected() {
        let result: Result<PatchDocument, _> =
            serde_json::from_value(json!([{ "op": "replace", "path": "/id", "value": "9" }]));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unsupported patch path `/id`"));
    }

    #[test]
    fn test_missing_value_is_rejected() {
        let result: Result<PatchDocument, _> =
            serde_json::from_value(json!([{ "op": "replace", "path": "/name" }]));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("missing field `value`"));

        let result: Result<PatchDocument, _> =
            serde_json::from_value(json!([{ "op": "test", "path": "/cpf" }]));
        assert!(result.is_err());
    }

    #[test]
    fn test_null_value_clears_field() {
        let patch = document(json!([{ "op": "replace", "path": "/name", "value": null }]));
        let err = patch.apply_to(&fields("Ana", "111")).unwrap_err();
        assert!(matches!(err, PatchError::Invalid(_)));
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        let result: Result<PatchDocument, _> =
            serde_json::from_value(json!([{ "op": "increment", "path": "/name" }]));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_document_keeps_fields() {
        let patched = PatchDocument::default()
            .apply_to(&fields("Ana", "111"))
            .unwrap();
        assert_eq!(patched, fields("Ana", "111"));
    }
}
