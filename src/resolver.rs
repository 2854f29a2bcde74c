//! Reference resolution for external schema documents.
//!
//! When a `$ref` points outside the documents already known to a
//! compilation, the [`SchemaFactory`](crate::SchemaFactory) asks a
//! [`SchemaResolver`] for the raw document. Resolvers are supplied by the
//! embedding application; this crate performs no I/O of its own.

use std::collections::HashMap;

use serde_json::Value;
use url::Url;

use crate::error::ResolutionError;

/// A capability for resolving absolute URIs to raw schema documents.
///
/// The factory calls `resolve` with the target URI stripped of its fragment;
/// pointer fragments are applied to the returned document by the factory
/// itself. Errors are propagated to the compilation caller untouched, so a
/// resolver's timeout or cancellation behavior is preserved.
pub trait SchemaResolver: Send + Sync {
    /// Resolves an absolute URI to a raw schema document.
    fn resolve(&self, uri: &Url) -> Result<Value, ResolutionError>;
}

/// A resolver backed by an in-memory map of pre-registered documents.
///
/// Useful for embedders that load their schema set up front, and for tests.
///
/// # Example
///
/// ```rust
/// use caliper::{InMemoryResolver, KeywordRegistry, SchemaFactory};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let resolver = InMemoryResolver::new()
///     .with_document("https://example.com/name", json!({"type": "string"}));
///
/// let factory = SchemaFactory::new(KeywordRegistry::standard())
///     .with_resolver(Arc::new(resolver));
///
/// let schema = factory
///     .compile(&json!({"$ref": "https://example.com/name"}))
///     .unwrap();
/// assert!(schema.is_valid(&json!("Ada")));
/// assert!(!schema.is_valid(&json!(7)));
/// ```
#[derive(Default)]
pub struct InMemoryResolver {
    documents: HashMap<String, Value>,
}

impl InMemoryResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document under the given URI and returns self for chaining.
    pub fn with_document(mut self, uri: impl Into<String>, document: Value) -> Self {
        self.documents.insert(uri.into(), document);
        self
    }

    /// Returns the number of registered documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if no documents are registered.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl SchemaResolver for InMemoryResolver {
    fn resolve(&self, uri: &Url) -> Result<Value, ResolutionError> {
        self.documents
            .get(uri.as_str())
            .cloned()
            .ok_or_else(|| ResolutionError::NotFound(uri.to_string()))
    }
}
