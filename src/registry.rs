//! Keyword validator registry keyed by schema dialect.
//!
//! This module provides the [`KeywordRegistry`] that maps a dialect (the
//! metaschema URI from `$schema`) to the ordered set of keyword-validator
//! constructors recognized for that dialect. The registry is populated at
//! startup through [`RegistryBuilder`] and is immutable once built, so
//! registration cannot race with compilation or validation.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{CompileError, RegistryError};
use crate::factory::CompileContext;
use crate::keywords::{
    ArrayValidator, CombinatorValidator, EnumValidator, KeywordValidator, NumberValidator,
    ObjectValidator, StringValidator, TypeValidator,
};

/// Dialect URI for JSON Schema draft 2020-12, the default dialect.
pub const DRAFT_2020_12: &str = "https://json-schema.org/draft/2020-12/schema";

/// A constructor for one keyword validator family.
///
/// Constructors receive the *full* schema document (not just their own
/// keyword) so a family can read every keyword it consumes together, plus a
/// [`CompileContext`] for compiling nested schema fragments against the
/// current scope. A constructor is invoked at most once per document.
pub type KeywordConstructor = Arc<
    dyn Fn(&Map<String, Value>, &mut CompileContext<'_>) -> Result<Box<dyn KeywordValidator>, CompileError>
        + Send
        + Sync,
>;

/// One registered validator family: its claimed keywords and constructor.
pub struct KeywordBinding {
    keywords: Vec<String>,
    constructor: KeywordConstructor,
}

impl KeywordBinding {
    /// The keywords claimed by this family.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Returns true if any of this family's keywords appear in the document.
    pub fn applies_to(&self, document: &Map<String, Value>) -> bool {
        self.keywords.iter().any(|k| document.contains_key(k))
    }

    pub(crate) fn construct(
        &self,
        document: &Map<String, Value>,
        context: &mut CompileContext<'_>,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        (self.constructor)(document, context)
    }
}

/// Builder for a [`KeywordRegistry`].
///
/// Registration happens once, at startup, before any compilation; the built
/// registry exposes no mutation, so concurrent registration after validation
/// has begun is impossible by construction.
///
/// # Example
///
/// ```rust
/// use caliper::{KeywordRegistry, DRAFT_2020_12};
///
/// let registry = KeywordRegistry::standard();
/// assert!(registry.recognizes(DRAFT_2020_12, "type"));
/// assert!(!registry.recognizes(DRAFT_2020_12, "x-vendor-extension"));
/// ```
#[derive(Default)]
pub struct RegistryBuilder {
    dialects: IndexMap<String, Vec<KeywordBinding>>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates a constructor with a non-empty set of keywords for a dialect.
    ///
    /// Bindings keep registration order, so compiled schemas and their error
    /// ordering are reproducible.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::KeywordConflict`] if any keyword in the set is
    /// already claimed by another family in that dialect, or
    /// [`RegistryError::EmptyKeywords`] if the keyword set is empty.
    pub fn register(
        mut self,
        constructor: KeywordConstructor,
        keywords: &[&str],
        dialect: &str,
    ) -> Result<Self, RegistryError> {
        if keywords.is_empty() {
            return Err(RegistryError::EmptyKeywords);
        }

        let bindings = self.dialects.entry(dialect.to_string()).or_default();
        for keyword in keywords {
            let claimed = bindings
                .iter()
                .any(|b| b.keywords.iter().any(|k| k == keyword));
            if claimed {
                return Err(RegistryError::KeywordConflict {
                    keyword: keyword.to_string(),
                    dialect: dialect.to_string(),
                });
            }
        }

        bindings.push(KeywordBinding {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            constructor,
        });
        Ok(self)
    }

    /// Finishes registration and returns the immutable registry.
    pub fn build(self) -> KeywordRegistry {
        KeywordRegistry {
            dialects: self.dialects,
        }
    }
}

/// Process-wide mapping from dialect to keyword-validator constructors.
///
/// The registry behaves as startup-time configuration: it is built once,
/// shared behind an `Arc` by every [`SchemaFactory`](crate::SchemaFactory),
/// and never mutated during compilation or validation.
pub struct KeywordRegistry {
    dialects: IndexMap<String, Vec<KeywordBinding>>,
}

impl KeywordRegistry {
    /// Returns a builder with no registered families.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Returns a registry with the built-in draft 2020-12 keyword families.
    ///
    /// Families are registered in a fixed order (type, enum, numeric, string,
    /// array, object, allOf, anyOf, oneOf, not) so error ordering is stable.
    pub fn standard() -> Self {
        Self::standard_builder().build()
    }

    /// Returns a builder pre-populated with the built-in families, for
    /// embedders that register custom keywords on top of them.
    ///
    /// # Example
    ///
    /// ```rust
    /// use caliper::{KeywordRegistry, RegistryError, DRAFT_2020_12};
    ///
    /// # fn main() -> Result<(), RegistryError> {
    /// let registry = KeywordRegistry::standard_builder()
    ///     // .register(my_constructor, &["myKeyword"], DRAFT_2020_12)?
    ///     .build();
    /// assert!(registry.recognizes(DRAFT_2020_12, "type"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn standard_builder() -> RegistryBuilder {
        let builder = Self::builder();
        let builder = builder
            .register(Arc::new(TypeValidator::compile), &["type"], DRAFT_2020_12)
            .and_then(|b| {
                b.register(
                    Arc::new(EnumValidator::compile),
                    &["enum", "const"],
                    DRAFT_2020_12,
                )
            })
            .and_then(|b| {
                b.register(
                    Arc::new(NumberValidator::compile),
                    &[
                        "minimum",
                        "maximum",
                        "exclusiveMinimum",
                        "exclusiveMaximum",
                        "multipleOf",
                    ],
                    DRAFT_2020_12,
                )
            })
            .and_then(|b| {
                b.register(
                    Arc::new(StringValidator::compile),
                    &["minLength", "maxLength", "pattern"],
                    DRAFT_2020_12,
                )
            })
            .and_then(|b| {
                b.register(
                    Arc::new(ArrayValidator::compile),
                    &[
                        "prefixItems",
                        "items",
                        "minItems",
                        "maxItems",
                        "uniqueItems",
                        "contains",
                    ],
                    DRAFT_2020_12,
                )
            })
            .and_then(|b| {
                b.register(
                    Arc::new(ObjectValidator::compile),
                    &[
                        "properties",
                        "patternProperties",
                        "additionalProperties",
                        "required",
                        "minProperties",
                        "maxProperties",
                    ],
                    DRAFT_2020_12,
                )
            })
            .and_then(|b| {
                b.register(Arc::new(CombinatorValidator::compile_all_of), &["allOf"], DRAFT_2020_12)
            })
            .and_then(|b| {
                b.register(Arc::new(CombinatorValidator::compile_any_of), &["anyOf"], DRAFT_2020_12)
            })
            .and_then(|b| {
                b.register(Arc::new(CombinatorValidator::compile_one_of), &["oneOf"], DRAFT_2020_12)
            })
            .and_then(|b| {
                b.register(Arc::new(CombinatorValidator::compile_not), &["not"], DRAFT_2020_12)
            });

        builder.expect("built-in keyword families cannot conflict")
    }

    /// Returns the ordered validator bindings for a dialect, or `None` if the
    /// dialect has no registered families.
    pub fn bindings_for(&self, dialect: &str) -> Option<&[KeywordBinding]> {
        self.dialects.get(dialect).map(|b| b.as_slice())
    }

    /// Returns an iterator over the registered dialect URIs.
    pub fn dialects(&self) -> impl Iterator<Item = &str> {
        self.dialects.keys().map(|d| d.as_str())
    }

    /// Returns true if a keyword is claimed by some family in a dialect.
    pub fn recognizes(&self, dialect: &str, keyword: &str) -> bool {
        self.dialects
            .get(dialect)
            .map(|bindings| {
                bindings
                    .iter()
                    .any(|b| b.keywords.iter().any(|k| k == keyword))
            })
            .unwrap_or(false)
    }
}
