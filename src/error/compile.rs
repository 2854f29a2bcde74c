//! Compilation-time and structural error types.
//!
//! Compilation errors are fail-fast: the first malformed keyword, unresolved
//! reference, or constructor failure aborts compilation of the enclosing
//! document. A schema with unresolved references is never returned as usable.

/// Errors that can occur while compiling a schema document.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The document is neither an object nor a boolean.
    #[error("schema document must be an object or boolean, got {got}")]
    InvalidDocument {
        /// JSON type name of the offending document.
        got: &'static str,
    },

    /// A keyword holds a value of the wrong JSON type or shape.
    #[error("keyword '{keyword}' expects {expected}, got {got}")]
    MalformedKeyword {
        /// The offending keyword.
        keyword: String,
        /// Description of the expected shape.
        expected: &'static str,
        /// Description of what was found.
        got: String,
    },

    /// No keyword validators are registered for the document's dialect.
    #[error("no keyword validators registered for dialect '{0}'")]
    UnknownDialect(String),

    /// A `$ref` or `$id` value could not be resolved against the current scope.
    #[error("invalid reference '{reference}': {reason}")]
    InvalidReference {
        /// The reference string as written in the document.
        reference: String,
        /// Why resolution failed.
        reason: String,
    },

    /// A JSON Pointer fragment does not address a location in its document.
    #[error("fragment '{fragment}' does not resolve to a schema in '{uri}'")]
    UnresolvedFragment {
        /// The pointer fragment.
        fragment: String,
        /// URI of the document the pointer was applied to.
        uri: String,
    },

    /// A `pattern` or `patternProperties` value is not a valid regex.
    #[error("invalid regular expression in '{keyword}'")]
    InvalidPattern {
        /// The offending keyword.
        keyword: String,
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// The external resolver failed to produce a referenced document.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// Errors produced by a [`SchemaResolver`](crate::SchemaResolver).
///
/// Resolution failures are fatal to compiling the referencing schema and are
/// propagated to the caller untouched: the factory never retries or swallows
/// them.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    /// No document is available for the requested URI.
    #[error("no schema document available for '{0}'")]
    NotFound(String),

    /// The resolver failed while producing the document.
    #[error("failed to load schema document from '{uri}': {reason}")]
    Failed {
        /// The requested URI.
        uri: String,
        /// Resolver-supplied failure description.
        reason: String,
    },
}

/// Errors that can occur while registering keyword validators.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A keyword in the requested set is already claimed by another family.
    ///
    /// Each keyword maps to exactly one validator family per dialect; this
    /// keeps compilation unambiguous.
    #[error("keyword '{keyword}' is already claimed in dialect '{dialect}'")]
    KeywordConflict {
        /// The contested keyword.
        keyword: String,
        /// The dialect in which the conflict occurred.
        dialect: String,
    },

    /// A validator family was registered with no keywords.
    #[error("a validator family must claim at least one keyword")]
    EmptyKeywords,
}

/// A schema recurred on the active validation path.
///
/// Raised when the same schema identifier is applied to the same instance
/// location twice along one call path, as with `{"$ref": "#"}`. Fatal to the
/// current validation call only; sibling branches and future calls are
/// unaffected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("schema '{identifier}' recursed into itself at depth {depth} on the active validation path")]
pub struct CycleError {
    /// Identifier of the schema that recurred.
    pub identifier: String,
    /// Depth of the active path at which the cycle was detected.
    pub depth: usize,
}

impl CycleError {
    /// Creates a new cycle error.
    pub fn new(identifier: impl Into<String>, depth: usize) -> Self {
        Self {
            identifier: identifier.into(),
            depth,
        }
    }
}
