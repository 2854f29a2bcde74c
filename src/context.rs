//! Validation context for cycle detection and reference lookup.
//!
//! This module provides the [`ValidationContext`] type that is threaded by
//! reference through every recursive validation call. It tracks which schemas
//! are being evaluated along the active call path so that self-referencing
//! and mutually-referencing schemas fail with a
//! [`CycleError`](crate::CycleError) instead of recursing without bound.

use std::sync::Arc;

use crate::schema::{Schema, SchemaCache};

/// Per-validation-call state threaded through the engine.
///
/// A fresh context is created for every top-level validation call and
/// destroyed when that call returns; it is never shared across concurrent
/// validations. Custom keyword validators receive it by mutable reference and
/// must pass it through to nested sub-schema validations as-is; beyond that,
/// they should treat it as opaque.
///
/// The active path holds (schema identifier, instance location) pairs rather
/// than identifiers alone: sibling branches and finite recursion over a
/// shrinking instance legitimately revisit the same schema, while revisiting
/// the same schema *at the same instance location* can only mean unbounded
/// recursion.
pub struct ValidationContext {
    cache: Arc<SchemaCache>,
    active: Vec<(String, String)>,
    fail_fast: bool,
}

impl ValidationContext {
    pub(crate) fn new(cache: Arc<SchemaCache>, fail_fast: bool) -> Self {
        Self {
            cache,
            active: Vec::new(),
            fail_fast,
        }
    }

    /// Returns true if the given schema identifier is already being validated
    /// at the given instance location on the active path.
    pub fn contains(&self, identifier: &str, location: &str) -> bool {
        self.active
            .iter()
            .any(|(id, loc)| id == identifier && loc == location)
    }

    /// Pushes a (schema identifier, instance location) pair onto the active
    /// path.
    ///
    /// Called by the engine when it enters a named schema; every push must be
    /// balanced by a [`pop`](Self::pop) on all exit paths.
    pub fn push(&mut self, identifier: impl Into<String>, location: impl Into<String>) {
        self.active.push((identifier.into(), location.into()));
    }

    /// Pops the most recent entry from the active path.
    pub fn pop(&mut self) {
        self.active.pop();
    }

    /// Returns the number of named schemas on the active path.
    pub fn depth(&self) -> usize {
        self.active.len()
    }

    /// Returns true if validation should stop at the first failure.
    ///
    /// Fast-fail is an optimization for callers that only need a yes/no
    /// answer; the default contract runs every validator and reports all
    /// failures.
    pub fn fail_fast(&self) -> bool {
        self.fail_fast
    }

    /// Looks up a compiled schema by its resolution URI.
    ///
    /// Used by reference validators to reach their targets through the shared
    /// read-only compiled-schema cache.
    pub fn schema(&self, uri: &str) -> Option<Arc<Schema>> {
        self.cache.get(uri)
    }
}
