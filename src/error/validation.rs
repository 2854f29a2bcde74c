//! Validation error types.
//!
//! This module provides [`ValidationError`] for single keyword failures and
//! [`ValidationErrors`] for accumulating multiple errors. Validation failures
//! are structured data, not faults: the engine returns them so callers can
//! enumerate every violation in one pass.

use std::fmt::{self, Display};

use stillwater::prelude::*;

use crate::path::JsonPath;

/// A single validation error with full context.
///
/// `ValidationError` captures everything needed to render a diagnostic
/// without re-running validation:
/// - **path**: where in the instance the error occurred
/// - **keyword**: the schema keyword whose constraint failed (e.g. `minimum`)
/// - **code**: machine-readable error code; defaults to the keyword, but
///   composite keywords use it to distinguish failure kinds (e.g.
///   `one_of_none_matched` vs `one_of_multiple_matched`)
/// - **message**: human-readable description of the failure
/// - **children**: nested errors from sub-schema branches, for composite
///   failures such as `anyOf` reporting every failing branch
///
/// # Example
///
/// ```rust
/// use caliper::{JsonPath, ValidationError};
///
/// let error = ValidationError::new(
///     JsonPath::root().push_key("age"),
///     "minimum",
///     "value -1 is less than minimum 0",
/// );
///
/// assert_eq!(error.keyword, "minimum");
/// assert_eq!(error.code, "minimum");
/// assert!(error.children.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// The path to the instance value that failed validation.
    pub path: JsonPath,
    /// The schema keyword whose constraint failed.
    pub keyword: String,
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Nested errors from failing sub-schema branches.
    pub children: Vec<ValidationError>,
}

impl ValidationError {
    /// Creates a new validation error for the given keyword.
    ///
    /// The error code defaults to the keyword name. Use `with_code` for
    /// composite keywords that need to distinguish failure kinds.
    pub fn new(
        path: JsonPath,
        keyword: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let keyword = keyword.into();
        Self {
            path,
            code: keyword.clone(),
            keyword,
            message: message.into(),
            children: Vec::new(),
        }
    }

    /// Sets the error code and returns self for chaining.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Attaches nested branch errors and returns self for chaining.
    pub fn with_children(mut self, children: Vec<ValidationError>) -> Self {
        self.children = children;
        self
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let path_str = if self.path.is_root() {
            "(root)".to_string()
        } else {
            self.path.to_string()
        };

        write!(
            f,
            "{:indent$}{}: [{}] {}",
            "",
            path_str,
            self.keyword,
            self.message,
            indent = indent
        )?;

        for child in &self.children {
            writeln!(f)?;
            child.fmt_indented(f, indent + 2)?;
        }

        Ok(())
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

impl std::error::Error for ValidationError {}

// ValidationError is Send + Sync since all fields are owned types.
// These assertions keep it that way if the fields change.
const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ValidationError>();
    assert_sync::<ValidationError>();
};

/// A non-empty collection of validation errors.
///
/// `ValidationErrors` wraps a `NonEmptyVec<ValidationError>` to guarantee that
/// at least one error is present, which is what makes it usable as the failure
/// side of `Validation<T, ValidationErrors>`.
///
/// # Combining Errors
///
/// `ValidationErrors` implements `Semigroup`, so failures from sibling
/// validators combine without losing anything:
///
/// ```rust
/// use caliper::{JsonPath, ValidationError, ValidationErrors};
/// use stillwater::prelude::*;
///
/// let errors1 = ValidationErrors::single(ValidationError::new(
///     JsonPath::root().push_key("name"),
///     "required",
///     "required property 'name' is missing",
/// ));
/// let errors2 = ValidationErrors::single(ValidationError::new(
///     JsonPath::root().push_key("email"),
///     "pattern",
///     "does not match pattern",
/// ));
///
/// let combined = errors1.combine(errors2);
/// assert_eq!(combined.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(NonEmptyVec<ValidationError>);

impl ValidationErrors {
    /// Creates a `ValidationErrors` containing a single error.
    pub fn single(error: ValidationError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Creates a `ValidationErrors` from a `Vec<ValidationError>`.
    ///
    /// # Panics
    ///
    /// Panics if the provided vec is empty. Use this only when the vec is
    /// known to contain at least one error.
    pub fn from_vec(errors: Vec<ValidationError>) -> Self {
        Self(NonEmptyVec::from_vec(errors).expect("ValidationErrors requires at least one error"))
    }

    /// Returns the number of errors in this collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns false since this collection is guaranteed non-empty.
    pub fn is_empty(&self) -> bool {
        false // NonEmptyVec is never empty
    }

    /// Returns an iterator over the contained errors.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Returns the first error in the collection.
    pub fn first(&self) -> &ValidationError {
        self.0.head()
    }

    /// Returns all errors at the specified instance path.
    pub fn at_path(&self, path: &JsonPath) -> Vec<&ValidationError> {
        self.0.iter().filter(|e| &e.path == path).collect()
    }

    /// Returns all errors for the specified keyword.
    pub fn with_keyword(&self, keyword: &str) -> Vec<&ValidationError> {
        self.0.iter().filter(|e| e.keyword == keyword).collect()
    }

    /// Returns all errors with the specified error code.
    pub fn with_code(&self, code: &str) -> Vec<&ValidationError> {
        self.0.iter().filter(|e| e.code == code).collect()
    }

    /// Converts this collection into a `Vec<ValidationError>`.
    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0.into_vec()
    }
}

impl Semigroup for ValidationErrors {
    fn combine(self, other: Self) -> Self {
        ValidationErrors(self.0.combine(other.0))
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} error(s):", self.len())?;
        for (i, error) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = Box<dyn Iterator<Item = &'a ValidationError> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.0.iter())
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ValidationErrors>();
    assert_sync::<ValidationErrors>();
};
