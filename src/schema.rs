//! Compiled schema representation and the validation engine.
//!
//! A [`Schema`] is the immutable result of compiling one schema document or
//! sub-schema: an ordered set of keyword validators plus scope metadata.
//! Validation walks the schema tree, invoking every validator, recursing into
//! sub-schemas, and threading one [`ValidationContext`] through the whole
//! call path to catch reference cycles.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use stillwater::prelude::*;
use stillwater::Validation;
use tracing::debug;
use url::Url;

use crate::context::ValidationContext;
use crate::error::{CycleError, ValidationError, ValidationErrors};
use crate::keywords::KeywordValidator;
use crate::path::JsonPath;
use crate::EvalResult;

/// The behavior of a compiled schema node.
pub enum SchemaKind {
    /// The boolean schema `true`: every instance passes.
    AlwaysValid,
    /// The boolean schema `false`: every instance fails.
    AlwaysInvalid,
    /// An object schema: the ordered validators all must pass.
    Constrained(Vec<Box<dyn KeywordValidator>>),
}

/// A compiled, immutable schema node.
///
/// Schemas are produced by the [`SchemaFactory`](crate::SchemaFactory) and
/// never change afterwards, so they are safe to share across concurrent
/// validations. A schema that can be reached through a reference carries its
/// resolution URI as `identifier`; anonymous inline schemas carry none and
/// are exempt from cycle tracking, since they can only be reached through a
/// named ancestor.
pub struct Schema {
    identifier: Option<String>,
    scope: Url,
    kind: SchemaKind,
}

impl Schema {
    pub(crate) fn new(identifier: Option<String>, scope: Url, kind: SchemaKind) -> Self {
        Self {
            identifier,
            scope,
            kind,
        }
    }

    /// The resolution URI of this schema, if it has one.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// The base URI against which relative references inside this schema
    /// resolve.
    pub fn scope(&self) -> &Url {
        &self.scope
    }

    /// The ordered validators owned by this schema.
    ///
    /// Empty for the boolean sentinel kinds.
    pub fn validators(&self) -> &[Box<dyn KeywordValidator>] {
        match &self.kind {
            SchemaKind::Constrained(validators) => validators.as_slice(),
            _ => &[],
        }
    }

    /// Returns true if this is the boolean schema `true`.
    pub fn is_always_valid(&self) -> bool {
        matches!(self.kind, SchemaKind::AlwaysValid)
    }

    /// Returns true if this is the boolean schema `false`.
    pub fn is_always_invalid(&self) -> bool {
        matches!(self.kind, SchemaKind::AlwaysInvalid)
    }

    /// Appends the resolution URIs of all references reachable from this
    /// schema without following them.
    pub fn collect_refs(&self, refs: &mut Vec<String>) {
        for validator in self.validators() {
            validator.collect_refs(refs);
        }
    }

    /// Validates an instance against this schema node.
    ///
    /// This is the recursive engine entry: keyword validators call it for
    /// their sub-schemas, passing the same context through unchanged. For
    /// top-level validation use
    /// [`CompiledSchema::validate`](crate::CompiledSchema::validate), which
    /// creates the fresh context.
    ///
    /// All validators run and all failures are collected; there is no
    /// short-circuiting across validators unless the context is in fast-fail
    /// mode. A detected cycle aborts the whole call with `Err(CycleError)`.
    pub fn validate_in_context(
        &self,
        instance: &Value,
        path: &JsonPath,
        context: &mut ValidationContext,
    ) -> EvalResult {
        let entered = match &self.identifier {
            Some(id) => {
                let location = path.to_pointer();
                if context.contains(id, &location) {
                    debug!(identifier = %id, depth = context.depth(), "schema cycle detected");
                    return Err(CycleError::new(id.clone(), context.depth()));
                }
                context.push(id.clone(), location);
                true
            }
            None => false,
        };

        let result = self.run_validators(instance, path, context);

        // The active path must reflect exactly the current call stack,
        // restored on every exit path, so sibling branches that revisit this
        // schema are not falsely flagged as cyclic.
        if entered {
            context.pop();
        }

        result
    }

    fn run_validators(
        &self,
        instance: &Value,
        path: &JsonPath,
        context: &mut ValidationContext,
    ) -> EvalResult {
        match &self.kind {
            SchemaKind::AlwaysValid => Ok(Validation::Success(())),
            SchemaKind::AlwaysInvalid => Ok(Validation::Failure(ValidationErrors::single(
                ValidationError::new(path.clone(), "schema", "no value can satisfy this schema")
                    .with_code("false_schema"),
            ))),
            SchemaKind::Constrained(validators) => {
                let mut failures: Option<ValidationErrors> = None;
                for validator in validators {
                    match validator.validate(instance, path, context)? {
                        Validation::Success(()) => {}
                        Validation::Failure(errors) => {
                            failures = Some(match failures.take() {
                                Some(acc) => acc.combine(errors),
                                None => errors,
                            });
                            if context.fail_fast() {
                                break;
                            }
                        }
                    }
                }
                Ok(match failures {
                    Some(errors) => Validation::Failure(errors),
                    None => Validation::Success(()),
                })
            }
        }
    }
}

// Compiled schemas are shared across threads; keep that true if fields change.
const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Schema>();
    assert_sync::<Schema>();
};

/// Read-only lookup table of compiled schemas keyed by resolution URI.
///
/// Built during one compilation session and owned by the resulting
/// [`CompiledSchema`](crate::CompiledSchema). Reference validators resolve
/// their targets through it at validation time, which is how mutually
/// referencing schemas avoid cyclic ownership.
pub struct SchemaCache {
    schemas: HashMap<String, Arc<Schema>>,
}

impl SchemaCache {
    pub(crate) fn empty() -> Self {
        Self {
            schemas: HashMap::new(),
        }
    }

    pub(crate) fn from_map(schemas: HashMap<String, Arc<Schema>>) -> Self {
        Self { schemas }
    }

    pub(crate) fn get(&self, uri: &str) -> Option<Arc<Schema>> {
        self.schemas.get(uri).cloned()
    }

    pub(crate) fn schemas(&self) -> impl Iterator<Item = &Arc<Schema>> {
        self.schemas.values()
    }
}
