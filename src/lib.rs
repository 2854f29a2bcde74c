//! # Caliper
//!
//! A JSON Schema validation engine that compiles schema documents into
//! immutable validator trees and accumulates ALL validation errors,
//! providing comprehensive feedback rather than short-circuiting on the
//! first failure.
//!
//! ## Overview
//!
//! A raw schema document compiles through the [`SchemaFactory`] into a tree
//! of keyword validators, dispatched through a [`KeywordRegistry`] keyed by
//! dialect. The compiled [`CompiledSchema`] is immutable and safe to share
//! across threads; each validation call gets a fresh [`ValidationContext`]
//! that tracks the active call path, so self-referencing schemas like
//! `{"$ref": "#"}` fail with a [`CycleError`] instead of recursing without
//! bound.
//!
//! ## Core Types
//!
//! - [`JsonPath`]: paths to values in nested instances (e.g., `users[0].email`)
//! - [`ValidationError`]: a single keyword failure with path, code, and
//!   nested child errors; [`ValidationErrors`] is the non-empty collection
//! - [`KeywordRegistry`]: dialect-keyed registry of keyword-validator
//!   constructors, the startup-time extension point for custom keywords
//! - [`SchemaFactory`]: compiles documents, resolves `$ref`, ignores unknown
//!   keywords
//! - [`CompiledSchema`]: the validation entry point
//!
//! ## Example
//!
//! ```rust
//! use caliper::{KeywordRegistry, SchemaFactory};
//! use serde_json::json;
//!
//! let factory = SchemaFactory::new(KeywordRegistry::standard());
//! let schema = factory
//!     .compile(&json!({
//!         "type": "object",
//!         "properties": {"name": {"type": "string", "minLength": 1}},
//!         "required": ["name"]
//!     }))
//!     .unwrap();
//!
//! let result = schema.validate(&json!({"name": "Ada"})).unwrap();
//! assert!(result.is_success());
//!
//! // Invalid instances produce the complete list of violations
//! let result = schema.validate(&json!({"name": ""})).unwrap();
//! assert!(result.is_failure());
//! ```

pub mod context;
pub mod error;
pub mod factory;
pub mod keywords;
pub mod path;
pub mod registry;
pub mod resolver;
pub mod schema;

pub use context::ValidationContext;
pub use error::{
    CompileError, CycleError, RegistryError, ResolutionError, ValidationError, ValidationErrors,
};
pub use factory::{CompileContext, CompiledSchema, SchemaFactory};
pub use keywords::KeywordValidator;
pub use path::{JsonPath, PathSegment};
pub use registry::{
    KeywordBinding, KeywordConstructor, KeywordRegistry, RegistryBuilder, DRAFT_2020_12,
};
pub use resolver::{InMemoryResolver, SchemaResolver};
pub use schema::{Schema, SchemaKind};

/// Result of evaluating a schema against an instance.
///
/// The outer `Result` carries hard [`CycleError`]s that abort the whole
/// validation call; the inner `Validation` is the structured pass/fail
/// outcome, with every violated constraint accumulated on failure.
pub type EvalResult = Result<stillwater::Validation<(), ValidationErrors>, CycleError>;
