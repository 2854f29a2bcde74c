//! Built-in keyword validator families and the [`KeywordValidator`] trait.
//!
//! Each validator family is a small, immutable state machine over the
//! instance, bound to one or more keywords. Validators are constructed only
//! through the constructor functions registered with a
//! [`KeywordRegistry`](crate::KeywordRegistry); they expose no setters and
//! evaluating them has no side effects, which is what makes compiled schemas
//! safe to share across threads.

mod arrays;
mod combinators;
mod enums;
mod numbers;
mod objects;
mod reference;
mod strings;
mod types;

pub use arrays::ArrayValidator;
pub use combinators::CombinatorValidator;
pub use enums::EnumValidator;
pub use numbers::NumberValidator;
pub use objects::ObjectValidator;
pub use reference::RefValidator;
pub use strings::StringValidator;
pub use types::TypeValidator;

use std::sync::Arc;

use serde_json::Value;

use crate::context::ValidationContext;
use crate::path::JsonPath;
use crate::schema::Schema;
use crate::EvalResult;

/// A compiled, immutable validator bound to a fixed set of keywords.
///
/// Implementations check one aspect of an instance (its type, a numeric
/// bound, the shape of its properties) and report either success or a
/// structured failure. Validators never reference each other except through
/// the sub-schemas they own.
///
/// Custom keyword families implement this trait and register a constructor
/// with [`RegistryBuilder::register`](crate::RegistryBuilder::register)
/// before any compilation occurs.
pub trait KeywordValidator: Send + Sync {
    /// The primary keyword this validator reports failures under.
    fn keyword(&self) -> &str;

    /// Returns the nested schemas owned by this validator, for traversal.
    fn subschemas(&self) -> Vec<&Arc<Schema>> {
        Vec::new()
    }

    /// Appends the resolution URIs of any references this validator holds.
    ///
    /// Composite validators recurse into their owned sub-schemas.
    fn collect_refs(&self, refs: &mut Vec<String>) {
        for schema in self.subschemas() {
            schema.collect_refs(refs);
        }
    }

    /// Validates an instance value.
    ///
    /// The context must be passed through to nested sub-schema validations
    /// as-is so the engine can detect reference cycles across the whole
    /// active call path.
    fn validate(
        &self,
        instance: &Value,
        path: &JsonPath,
        context: &mut ValidationContext,
    ) -> EvalResult;
}

/// Returns the JSON type name for a value.
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
