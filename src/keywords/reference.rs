//! The `$ref` validator.
//!
//! References are resolved at compile time by the
//! [`SchemaFactory`](crate::SchemaFactory), which guarantees the target is
//! compiled before the referencing schema is returned. The validator itself
//! only carries the resolved absolute URI and delegates through the shared
//! compiled-schema cache at validation time, so mutually referencing schemas
//! need no cyclic ownership.

use serde_json::Value;
use stillwater::Validation;

use crate::context::ValidationContext;
use crate::error::{ValidationError, ValidationErrors};
use crate::keywords::KeywordValidator;
use crate::path::JsonPath;
use crate::EvalResult;

/// Delegates validation to a referenced schema.
pub struct RefValidator {
    reference: String,
    target: String,
}

impl RefValidator {
    pub(crate) fn new(reference: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            target: target.into(),
        }
    }

    /// The reference string as written in the schema document.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// The resolved absolute URI of the target schema.
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl KeywordValidator for RefValidator {
    fn keyword(&self) -> &str {
        "$ref"
    }

    fn collect_refs(&self, refs: &mut Vec<String>) {
        refs.push(self.target.clone());
    }

    fn validate(
        &self,
        instance: &Value,
        path: &JsonPath,
        context: &mut ValidationContext,
    ) -> EvalResult {
        match context.schema(&self.target) {
            Some(schema) => schema.validate_in_context(instance, path, context),
            // Unreachable through the factory, which refuses to return a
            // schema with unresolved references.
            None => Ok(Validation::Failure(ValidationErrors::single(
                ValidationError::new(
                    path.clone(),
                    "$ref",
                    format!(
                        "reference '{}' has no compiled target '{}'",
                        self.reference, self.target
                    ),
                )
                .with_code("unresolved_reference"),
            ))),
        }
    }
}
