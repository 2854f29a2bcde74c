//! The numeric bounds keyword family.
//!
//! Covers `minimum`, `maximum`, `exclusiveMinimum`, `exclusiveMaximum` and
//! `multipleOf`. Non-numeric instances pass: constraining the type is the
//! `type` keyword's job.

use serde_json::{Map, Value};
use stillwater::Validation;

use crate::context::ValidationContext;
use crate::error::{CompileError, ValidationError, ValidationErrors};
use crate::factory::CompileContext;
use crate::keywords::{value_type_name, KeywordValidator};
use crate::path::JsonPath;
use crate::EvalResult;

/// Validates numeric bounds and divisibility.
pub struct NumberValidator {
    minimum: Option<f64>,
    maximum: Option<f64>,
    exclusive_minimum: Option<f64>,
    exclusive_maximum: Option<f64>,
    multiple_of: Option<f64>,
}

impl NumberValidator {
    pub(crate) fn compile(
        document: &Map<String, Value>,
        _context: &mut CompileContext<'_>,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        let multiple_of = number_keyword(document, "multipleOf")?;
        if let Some(multiple) = multiple_of {
            if multiple <= 0.0 {
                return Err(CompileError::MalformedKeyword {
                    keyword: "multipleOf".to_string(),
                    expected: "a number greater than zero",
                    got: multiple.to_string(),
                });
            }
        }

        Ok(Box::new(NumberValidator {
            minimum: number_keyword(document, "minimum")?,
            maximum: number_keyword(document, "maximum")?,
            exclusive_minimum: number_keyword(document, "exclusiveMinimum")?,
            exclusive_maximum: number_keyword(document, "exclusiveMaximum")?,
            multiple_of,
        }))
    }
}

fn number_keyword(document: &Map<String, Value>, keyword: &str) -> Result<Option<f64>, CompileError> {
    match document.get(keyword) {
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(other) => Err(CompileError::MalformedKeyword {
            keyword: keyword.to_string(),
            expected: "a number",
            got: value_type_name(other).to_string(),
        }),
        None => Ok(None),
    }
}

fn is_multiple_of(value: f64, multiple: f64) -> bool {
    let quotient = value / multiple;
    (quotient - quotient.round()).abs() < 1e-9
}

impl KeywordValidator for NumberValidator {
    fn keyword(&self) -> &str {
        "minimum"
    }

    fn validate(
        &self,
        instance: &Value,
        path: &JsonPath,
        _context: &mut ValidationContext,
    ) -> EvalResult {
        let value = match instance.as_f64() {
            Some(value) => value,
            None => return Ok(Validation::Success(())),
        };

        let mut errors = Vec::new();

        if let Some(min) = self.minimum {
            if value < min {
                errors.push(ValidationError::new(
                    path.clone(),
                    "minimum",
                    format!("value {} is less than minimum {}", value, min),
                ));
            }
        }
        if let Some(max) = self.maximum {
            if value > max {
                errors.push(ValidationError::new(
                    path.clone(),
                    "maximum",
                    format!("value {} is greater than maximum {}", value, max),
                ));
            }
        }
        if let Some(min) = self.exclusive_minimum {
            if value <= min {
                errors.push(ValidationError::new(
                    path.clone(),
                    "exclusiveMinimum",
                    format!("value {} is not greater than {}", value, min),
                ));
            }
        }
        if let Some(max) = self.exclusive_maximum {
            if value >= max {
                errors.push(ValidationError::new(
                    path.clone(),
                    "exclusiveMaximum",
                    format!("value {} is not less than {}", value, max),
                ));
            }
        }
        if let Some(multiple) = self.multiple_of {
            if !is_multiple_of(value, multiple) {
                errors.push(ValidationError::new(
                    path.clone(),
                    "multipleOf",
                    format!("value {} is not a multiple of {}", value, multiple),
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
