//! The string constraint keyword family.
//!
//! Covers `minLength`, `maxLength` and `pattern`. Lengths count Unicode
//! characters, not bytes. Non-string instances pass.

use regex::Regex;
use serde_json::{Map, Value};
use stillwater::Validation;

use crate::context::ValidationContext;
use crate::error::{CompileError, ValidationError, ValidationErrors};
use crate::factory::CompileContext;
use crate::keywords::{value_type_name, KeywordValidator};
use crate::path::JsonPath;
use crate::EvalResult;

/// Validates string length and pattern constraints.
pub struct StringValidator {
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<(Regex, String)>,
}

impl StringValidator {
    pub(crate) fn compile(
        document: &Map<String, Value>,
        _context: &mut CompileContext<'_>,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        let pattern = match document.get("pattern") {
            Some(Value::String(source)) => {
                let regex = Regex::new(source).map_err(|source_err| CompileError::InvalidPattern {
                    keyword: "pattern".to_string(),
                    source: source_err,
                })?;
                Some((regex, source.clone()))
            }
            Some(other) => {
                return Err(CompileError::MalformedKeyword {
                    keyword: "pattern".to_string(),
                    expected: "a string",
                    got: value_type_name(other).to_string(),
                })
            }
            None => None,
        };

        Ok(Box::new(StringValidator {
            min_length: length_keyword(document, "minLength")?,
            max_length: length_keyword(document, "maxLength")?,
            pattern,
        }))
    }
}

pub(crate) fn length_keyword(
    document: &Map<String, Value>,
    keyword: &str,
) -> Result<Option<usize>, CompileError> {
    match document.get(keyword) {
        Some(Value::Number(n)) if n.as_u64().is_some() => {
            Ok(n.as_u64().map(|n| n as usize))
        }
        Some(other) => Err(CompileError::MalformedKeyword {
            keyword: keyword.to_string(),
            expected: "a non-negative integer",
            got: match other {
                Value::Number(n) => n.to_string(),
                other => value_type_name(other).to_string(),
            },
        }),
        None => Ok(None),
    }
}

impl KeywordValidator for StringValidator {
    fn keyword(&self) -> &str {
        "minLength"
    }

    fn validate(
        &self,
        instance: &Value,
        path: &JsonPath,
        _context: &mut ValidationContext,
    ) -> EvalResult {
        let value = match instance.as_str() {
            Some(value) => value,
            None => return Ok(Validation::Success(())),
        };

        let mut errors = Vec::new();
        let length = value.chars().count();

        if let Some(min) = self.min_length {
            if length < min {
                errors.push(ValidationError::new(
                    path.clone(),
                    "minLength",
                    format!("length must be at least {}, got {}", min, length),
                ));
            }
        }
        if let Some(max) = self.max_length {
            if length > max {
                errors.push(ValidationError::new(
                    path.clone(),
                    "maxLength",
                    format!("length must be at most {}, got {}", max, length),
                ));
            }
        }
        if let Some((regex, source)) = &self.pattern {
            if !regex.is_match(value) {
                errors.push(ValidationError::new(
                    path.clone(),
                    "pattern",
                    format!("value does not match pattern '{}'", source),
                ));
            }
        }

        Ok(if errors.is_empty() {
            Validation::Success(())
        } else {
            Validation::Failure(ValidationErrors::from_vec(errors))
        })
    }
}
