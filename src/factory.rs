//! Schema compilation.
//!
//! The [`SchemaFactory`] turns raw schema documents into compiled
//! [`Schema`](crate::Schema) trees. It owns the mechanics the keyword
//! validators should not care about: boolean sentinel schemas, `$id` scope
//! resolution, `$schema` dialect selection, ignoring unrecognized keywords,
//! and resolving `$ref` targets through the per-compilation schema cache,
//! raw-document table, or the caller-supplied resolver.
//!
//! Compilation is fail-fast: the first malformed keyword or failed
//! resolution aborts the enclosing document, so a schema with unresolved
//! references is never returned as usable.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};
use stillwater::Validation;
use tracing::debug;
use url::Url;

use crate::context::ValidationContext;
use crate::error::{CompileError, ResolutionError};
use crate::keywords::{value_type_name, KeywordValidator, RefValidator};
use crate::path::JsonPath;
use crate::registry::{KeywordRegistry, DRAFT_2020_12};
use crate::resolver::SchemaResolver;
use crate::schema::{Schema, SchemaCache, SchemaKind};
use crate::EvalResult;

/// Base scope assigned to documents compiled without an explicit one.
const ANONYMOUS_SCOPE: &str = "json-schema:///anonymous";

/// Mutable bookkeeping for one compilation session.
///
/// Tracks the schemas compiled so far, the identifiers currently being
/// compiled (so references into an unfinished document resolve without
/// recursing forever), and the raw form of every identified document for
/// JSON Pointer fragment extraction.
#[derive(Default)]
struct Session {
    schemas: HashMap<String, Arc<Schema>>,
    in_progress: HashSet<String>,
    raw_documents: HashMap<String, Value>,
}

/// Compiles raw schema documents into immutable schema trees.
///
/// A factory is cheap to share: it holds the keyword registry, the optional
/// reference resolver, and a memo of raw documents fetched through the
/// resolver. Compiled-schema reuse across separate `compile` calls is the
/// concern of an external URI-keyed cache, not the factory.
///
/// # Example
///
/// ```rust
/// use caliper::{KeywordRegistry, SchemaFactory};
/// use serde_json::json;
///
/// let factory = SchemaFactory::new(KeywordRegistry::standard());
/// let schema = factory
///     .compile(&json!({"type": "integer", "minimum": 0}))
///     .unwrap();
///
/// assert!(schema.is_valid(&json!(5)));
/// assert!(!schema.is_valid(&json!(-1)));
/// ```
pub struct SchemaFactory {
    registry: Arc<KeywordRegistry>,
    resolver: Option<Arc<dyn SchemaResolver>>,
    fetched: RwLock<HashMap<String, Value>>,
    default_dialect: String,
}

impl SchemaFactory {
    /// Creates a factory over the given registry.
    ///
    /// Documents without a `$schema` keyword compile under draft 2020-12.
    pub fn new(registry: KeywordRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            resolver: None,
            fetched: RwLock::new(HashMap::new()),
            default_dialect: DRAFT_2020_12.to_string(),
        }
    }

    /// Sets the resolver used for `$ref` targets outside the documents known
    /// to the compilation.
    pub fn with_resolver(mut self, resolver: Arc<dyn SchemaResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Sets the dialect assumed for documents without a `$schema` keyword.
    pub fn with_default_dialect(mut self, dialect: impl Into<String>) -> Self {
        self.default_dialect = dialect.into();
        self
    }

    /// Compiles a document with an anonymous base scope.
    pub fn compile(&self, document: &Value) -> Result<CompiledSchema, CompileError> {
        let base = Url::parse(ANONYMOUS_SCOPE).expect("anonymous scope URI is valid");
        self.compile_at(document, base)
    }

    /// Compiles a document, resolving relative references against `base`.
    pub fn compile_at(&self, document: &Value, base: Url) -> Result<CompiledSchema, CompileError> {
        let base = canonical(base);
        let mut session = Session::default();
        let root = self.compile_node(
            document,
            base.clone(),
            Some(base.to_string()),
            &self.default_dialect,
            &mut session,
        )?;

        Ok(CompiledSchema {
            root,
            cache: Arc::new(SchemaCache::from_map(session.schemas)),
        })
    }

    fn compile_node(
        &self,
        document: &Value,
        scope: Url,
        identifier: Option<String>,
        dialect: &str,
        session: &mut Session,
    ) -> Result<Arc<Schema>, CompileError> {
        match document {
            Value::Bool(true) => Ok(Self::finish(
                Schema::new(identifier.clone(), scope, SchemaKind::AlwaysValid),
                identifier,
                None,
                session,
            )),
            Value::Bool(false) => Ok(Self::finish(
                Schema::new(identifier.clone(), scope, SchemaKind::AlwaysInvalid),
                identifier,
                None,
                session,
            )),
            Value::Object(map) => self.compile_object(map, scope, identifier, dialect, session),
            other => Err(CompileError::InvalidDocument {
                got: value_type_name(other),
            }),
        }
    }

    fn compile_object(
        &self,
        document: &Map<String, Value>,
        scope: Url,
        identifier: Option<String>,
        dialect: &str,
        session: &mut Session,
    ) -> Result<Arc<Schema>, CompileError> {
        let dialect = match document.get("$schema") {
            Some(Value::String(uri)) => uri.trim_end_matches('#').to_string(),
            Some(other) => {
                return Err(CompileError::MalformedKeyword {
                    keyword: "$schema".to_string(),
                    expected: "a string",
                    got: value_type_name(other).to_string(),
                })
            }
            None => dialect.to_string(),
        };

        // `$id` re-scopes this subtree; the caller-requested identifier is
        // kept as an alias so refs to either URI resolve to the same schema.
        let alias = identifier;
        let (scope, identifier) = match document.get("$id") {
            Some(Value::String(id)) => {
                let resolved = join_reference(&scope, id)?;
                let id = resolved.to_string();
                (resolved, Some(id))
            }
            Some(other) => {
                return Err(CompileError::MalformedKeyword {
                    keyword: "$id".to_string(),
                    expected: "a string",
                    got: value_type_name(other).to_string(),
                })
            }
            None => (scope, alias.clone()),
        };
        let alias = alias.filter(|a| Some(a) != identifier.as_ref());

        debug!(scope = %scope, dialect = %dialect, "compiling schema document");

        if let Some(id) = &identifier {
            session.in_progress.insert(id.clone());
            session
                .raw_documents
                .insert(id.clone(), Value::Object(document.clone()));
        }
        if let Some(a) = &alias {
            session.in_progress.insert(a.clone());
            session
                .raw_documents
                .insert(a.clone(), Value::Object(document.clone()));
        }

        let bindings = self
            .registry
            .bindings_for(&dialect)
            .ok_or_else(|| CompileError::UnknownDialect(dialect.clone()))?;

        // Definition containers compile eagerly, before any `$ref` in this
        // document resolves, so entries declaring their own `$id` are
        // referenceable by name from anywhere in the document.
        for container in ["$defs", "definitions"] {
            if let Some(Value::Object(entries)) = document.get(container) {
                for (name, fragment) in entries {
                    let pointer = format!(
                        "#/{}/{}",
                        container,
                        name.replace('~', "~0").replace('/', "~1")
                    );
                    let target = join_reference(&scope, &pointer)?;
                    let key = target.to_string();
                    if session.schemas.contains_key(&key) || session.in_progress.contains(&key) {
                        continue;
                    }
                    self.compile_node(fragment, scope.clone(), Some(key), &dialect, session)?;
                }
            }
        }

        let mut validators: Vec<Box<dyn KeywordValidator>> = Vec::new();

        // `$ref` is resolved here, by the factory, not by a registered
        // validator family: the target must exist (compiled or compiling)
        // before the node is usable.
        if let Some(reference) = document.get("$ref") {
            let reference = reference
                .as_str()
                .ok_or_else(|| CompileError::MalformedKeyword {
                    keyword: "$ref".to_string(),
                    expected: "a string",
                    got: value_type_name(reference).to_string(),
                })?;
            let target = self.resolve_reference(reference, &scope, &dialect, session)?;
            validators.push(Box::new(RefValidator::new(reference, target)));
        }

        for binding in bindings {
            if binding.applies_to(document) {
                let mut context = CompileContext {
                    factory: self,
                    session: &mut *session,
                    scope: scope.clone(),
                    dialect: dialect.clone(),
                };
                validators.push(binding.construct(document, &mut context)?);
            }
        }

        Ok(Self::finish(
            Schema::new(identifier.clone(), scope, SchemaKind::Constrained(validators)),
            identifier,
            alias,
            session,
        ))
    }

    fn finish(
        schema: Schema,
        identifier: Option<String>,
        alias: Option<String>,
        session: &mut Session,
    ) -> Arc<Schema> {
        let schema = Arc::new(schema);
        for id in identifier.into_iter().chain(alias) {
            session.schemas.insert(id.clone(), Arc::clone(&schema));
            session.in_progress.remove(&id);
        }
        schema
    }

    /// Resolves a reference string against the current scope, making sure the
    /// target is compiled (or being compiled) before returning its URI.
    fn resolve_reference(
        &self,
        reference: &str,
        scope: &Url,
        dialect: &str,
        session: &mut Session,
    ) -> Result<String, CompileError> {
        let target = join_reference(scope, reference)?;
        let key = target.to_string();
        debug!(reference, target = %key, "resolving schema reference");

        if session.schemas.contains_key(&key) || session.in_progress.contains(&key) {
            return Ok(key);
        }

        let mut document_uri = target.clone();
        document_uri.set_fragment(None);
        let document_key = document_uri.to_string();
        let fragment = target.fragment().map(|f| f.to_string());

        let raw = match session.raw_documents.get(&document_key) {
            Some(raw) => raw.clone(),
            None if session.schemas.contains_key(&document_key)
                || session.in_progress.contains(&document_key) =>
            {
                // Known document with no raw form (a boolean root); only a
                // fragment-free ref can point at it.
                return match fragment {
                    None => Ok(key),
                    Some(fragment) => Err(CompileError::UnresolvedFragment {
                        fragment,
                        uri: document_key,
                    }),
                };
            }
            None => {
                let raw = self.fetch(&document_uri)?;
                self.compile_node(
                    &raw,
                    document_uri.clone(),
                    Some(document_key.clone()),
                    dialect,
                    session,
                )?;
                raw
            }
        };

        match fragment {
            None => Ok(key),
            Some(fragment) => {
                // The fetch above may have registered the target under its
                // own `$id`.
                if session.schemas.contains_key(&key) || session.in_progress.contains(&key) {
                    return Ok(key);
                }
                if !fragment.starts_with('/') {
                    return Err(CompileError::InvalidReference {
                        reference: reference.to_string(),
                        reason: format!("unsupported anchor fragment '#{}'", fragment),
                    });
                }
                let sub = raw
                    .pointer(&fragment)
                    .cloned()
                    .ok_or_else(|| CompileError::UnresolvedFragment {
                        fragment: fragment.clone(),
                        uri: document_key.clone(),
                    })?;
                self.compile_node(&sub, document_uri, Some(key.clone()), dialect, session)?;
                Ok(key)
            }
        }
    }

    fn fetch(&self, uri: &Url) -> Result<Value, CompileError> {
        let key = uri.to_string();
        if let Some(raw) = self.fetched.read().get(&key) {
            return Ok(raw.clone());
        }

        let resolver = self
            .resolver
            .as_ref()
            .ok_or_else(|| ResolutionError::NotFound(key.clone()))?;
        let raw = resolver.resolve(uri)?;
        self.fetched.write().insert(key, raw.clone());
        Ok(raw)
    }
}

/// Compilation handle passed to keyword-validator constructors.
///
/// Carries the effective scope and dialect of the node being compiled and
/// lets constructors compile nested schema fragments (each value under
/// `properties`, every `allOf` branch) against that scope.
pub struct CompileContext<'a> {
    factory: &'a SchemaFactory,
    session: &'a mut Session,
    scope: Url,
    dialect: String,
}

impl CompileContext<'_> {
    /// The base URI against which relative references currently resolve.
    pub fn scope(&self) -> &Url {
        &self.scope
    }

    /// The dialect governing the node being compiled.
    pub fn dialect(&self) -> &str {
        &self.dialect
    }

    /// Compiles a nested schema fragment with the current scope as its base.
    pub fn compile_subschema(&mut self, fragment: &Value) -> Result<Arc<Schema>, CompileError> {
        self.factory.compile_node(
            fragment,
            self.scope.clone(),
            None,
            &self.dialect,
            self.session,
        )
    }
}

/// A fully compiled schema, ready for validation.
///
/// Owns the root schema node and the read-only cache of every named schema
/// reached during compilation, which reference validators resolve through at
/// validation time. Immutable and safe to share across threads.
pub struct CompiledSchema {
    root: Arc<Schema>,
    cache: Arc<SchemaCache>,
}

impl CompiledSchema {
    /// Validates an instance, collecting every failing constraint.
    ///
    /// Returns `Ok(Validation::Success(()))` when the instance conforms,
    /// `Ok(Validation::Failure(errors))` with the complete structured error
    /// list when it does not, and `Err(CycleError)` when the schema recursed
    /// into itself on the active path. Each call uses a fresh context, so
    /// concurrent calls never interfere.
    pub fn validate(&self, instance: &Value) -> EvalResult {
        let mut context = ValidationContext::new(Arc::clone(&self.cache), false);
        self.root
            .validate_in_context(instance, &JsonPath::root(), &mut context)
    }

    /// Returns true if the instance conforms to the schema.
    ///
    /// Runs in fast-fail mode as an optimization: validators stop at the
    /// first failure, and a cycle error counts as non-conforming. Use
    /// [`validate`](Self::validate) for full diagnostics.
    pub fn is_valid(&self, instance: &Value) -> bool {
        let mut context = ValidationContext::new(Arc::clone(&self.cache), true);
        matches!(
            self.root
                .validate_in_context(instance, &JsonPath::root(), &mut context),
            Ok(Validation::Success(()))
        )
    }

    /// Creates a fresh validation context for driving
    /// [`Schema::validate_in_context`] directly.
    pub fn new_context(&self) -> ValidationContext {
        ValidationContext::new(Arc::clone(&self.cache), false)
    }

    /// The compiled root schema node.
    pub fn root(&self) -> &Arc<Schema> {
        &self.root
    }

    /// Returns reference URIs that do not resolve to a compiled schema.
    ///
    /// Always empty for schemas produced by the factory; exposed as an
    /// integrity check for custom validator implementations.
    pub fn unresolved_references(&self) -> Vec<String> {
        let mut refs = Vec::new();
        self.root.collect_refs(&mut refs);
        for schema in self.cache.schemas() {
            schema.collect_refs(&mut refs);
        }

        let mut unresolved: Vec<String> = refs
            .into_iter()
            .filter(|uri| self.cache.get(uri).is_none())
            .collect();
        unresolved.sort();
        unresolved.dedup();
        unresolved
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<CompiledSchema>();
    assert_sync::<CompiledSchema>();
};

/// Joins a reference against a scope URI, normalizing empty fragments away.
fn join_reference(scope: &Url, reference: &str) -> Result<Url, CompileError> {
    let mut resolved = scope
        .join(reference)
        .map_err(|source| CompileError::InvalidReference {
            reference: reference.to_string(),
            reason: source.to_string(),
        })?;
    if resolved.fragment() == Some("") {
        resolved.set_fragment(None);
    }
    Ok(resolved)
}

/// Normalizes a base URI the same way reference joining does.
fn canonical(mut base: Url) -> Url {
    if base.fragment() == Some("") {
        base.set_fragment(None);
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn factory() -> SchemaFactory {
        SchemaFactory::new(KeywordRegistry::standard())
    }

    #[test]
    fn test_compile_boolean_true() {
        let schema = factory().compile(&json!(true)).unwrap();
        assert!(schema.root().is_always_valid());
        assert!(schema.is_valid(&json!({"any": "thing"})));
    }

    #[test]
    fn test_compile_boolean_false() {
        let schema = factory().compile(&json!(false)).unwrap();
        assert!(schema.root().is_always_invalid());
        assert!(!schema.is_valid(&json!(null)));
    }

    #[test]
    fn test_compile_rejects_non_schema_document() {
        let result = factory().compile(&json!(42));
        assert!(matches!(
            result,
            Err(CompileError::InvalidDocument { got: "number" })
        ));
    }

    #[test]
    fn test_unknown_keywords_are_ignored() {
        let schema = factory()
            .compile(&json!({"type": "string", "x-internal": true, "format": "email"}))
            .unwrap();
        assert!(schema.is_valid(&json!("not an email")));
        assert!(!schema.is_valid(&json!(5)));
    }

    #[test]
    fn test_unknown_dialect_fails() {
        let result = factory().compile(&json!({"$schema": "urn:unregistered", "type": "string"}));
        assert!(matches!(result, Err(CompileError::UnknownDialect(_))));
    }

    #[test]
    fn test_malformed_keyword_fails_fast() {
        let result = factory().compile(&json!({"type": 7}));
        assert!(matches!(result, Err(CompileError::MalformedKeyword { .. })));
    }

    #[test]
    fn test_id_sets_identifier() {
        let schema = factory()
            .compile(&json!({"$id": "https://example.com/root", "type": "object"}))
            .unwrap();
        assert_eq!(schema.root().identifier(), Some("https://example.com/root"));
        assert_eq!(schema.root().scope().as_str(), "https://example.com/root");
    }

    #[test]
    fn test_ref_without_resolver_fails() {
        let result = factory().compile(&json!({"$ref": "https://example.com/missing"}));
        assert!(matches!(
            result,
            Err(CompileError::Resolution(ResolutionError::NotFound(_)))
        ));
    }

    #[test]
    fn test_unresolved_pointer_fragment_fails() {
        let result = factory().compile(&json!({"$ref": "#/definitions/nothing"}));
        assert!(matches!(
            result,
            Err(CompileError::UnresolvedFragment { .. })
        ));
    }

    #[test]
    fn test_no_unresolved_references_after_compile() {
        let schema = factory()
            .compile(&json!({
                "definitions": {"name": {"type": "string"}},
                "properties": {"name": {"$ref": "#/definitions/name"}}
            }))
            .unwrap();
        assert!(schema.unresolved_references().is_empty());
    }
}
