//! Error types for compilation and validation.

mod compile;
mod validation;

pub use compile::{CompileError, CycleError, RegistryError, ResolutionError};
pub use validation::{ValidationError, ValidationErrors};
