//! The `enum` and `const` keyword family.

use serde_json::{Map, Value};
use stillwater::prelude::*;
use stillwater::Validation;

use crate::context::ValidationContext;
use crate::error::{CompileError, ValidationError, ValidationErrors};
use crate::factory::CompileContext;
use crate::keywords::{value_type_name, KeywordValidator};
use crate::path::JsonPath;
use crate::EvalResult;

/// Validates enumerated-value membership (`enum`) and constant equality
/// (`const`).
pub struct EnumValidator {
    allowed: Option<Vec<Value>>,
    constant: Option<Value>,
}

impl EnumValidator {
    pub(crate) fn compile(
        document: &Map<String, Value>,
        _context: &mut CompileContext<'_>,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        let allowed = match document.get("enum") {
            Some(Value::Array(values)) if !values.is_empty() => Some(values.clone()),
            Some(Value::Array(_)) => {
                return Err(CompileError::MalformedKeyword {
                    keyword: "enum".to_string(),
                    expected: "a non-empty array",
                    got: "an empty array".to_string(),
                })
            }
            Some(other) => {
                return Err(CompileError::MalformedKeyword {
                    keyword: "enum".to_string(),
                    expected: "a non-empty array",
                    got: value_type_name(other).to_string(),
                })
            }
            None => None,
        };

        Ok(Box::new(EnumValidator {
            allowed,
            constant: document.get("const").cloned(),
        }))
    }
}

impl KeywordValidator for EnumValidator {
    fn keyword(&self) -> &str {
        "enum"
    }

    fn validate(
        &self,
        instance: &Value,
        path: &JsonPath,
        _context: &mut ValidationContext,
    ) -> EvalResult {
        let mut failures: Option<ValidationErrors> = None;

        if let Some(allowed) = &self.allowed {
            if !allowed.contains(instance) {
                failures = Some(ValidationErrors::single(ValidationError::new(
                    path.clone(),
                    "enum",
                    format!("value is not one of {} enumerated values", allowed.len()),
                )));
            }
        }

        if let Some(constant) = &self.constant {
            if instance != constant {
                let error = ValidationErrors::single(ValidationError::new(
                    path.clone(),
                    "const",
                    format!("value does not equal the constant {}", constant),
                ));
                failures = Some(match failures.take() {
                    Some(acc) => acc.combine(error),
                    None => error,
                });
            }
        }

        Ok(match failures {
            Some(errors) => Validation::Failure(errors),
            None => Validation::Success(()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaCache;
    use serde_json::json;
    use std::sync::Arc;

    fn run(validator: &EnumValidator, instance: &Value) -> Validation<(), ValidationErrors> {
        let mut ctx = ValidationContext::new(Arc::new(SchemaCache::empty()), false);
        validator
            .validate(instance, &JsonPath::root(), &mut ctx)
            .unwrap()
    }

    #[test]
    fn test_enum_membership() {
        let validator = EnumValidator {
            allowed: Some(vec![json!("red"), json!("green"), json!(3)]),
            constant: None,
        };

        assert!(run(&validator, &json!("red")).is_success());
        assert!(run(&validator, &json!(3)).is_success());
        assert!(run(&validator, &json!("blue")).is_failure());
    }

    #[test]
    fn test_enum_compares_structurally() {
        let validator = EnumValidator {
            allowed: Some(vec![json!({"a": [1, 2]})]),
            constant: None,
        };

        assert!(run(&validator, &json!({"a": [1, 2]})).is_success());
        assert!(run(&validator, &json!({"a": [2, 1]})).is_failure());
    }

    #[test]
    fn test_const_equality() {
        let validator = EnumValidator {
            allowed: None,
            constant: Some(json!(42)),
        };

        assert!(run(&validator, &json!(42)).is_success());
        assert!(run(&validator, &json!(41)).is_failure());

        if let Validation::Failure(errors) = run(&validator, &json!(41)) {
            assert_eq!(errors.first().keyword, "const");
        }
    }

    #[test]
    fn test_enum_and_const_both_reported() {
        let validator = EnumValidator {
            allowed: Some(vec![json!(1)]),
            constant: Some(json!(2)),
        };

        if let Validation::Failure(errors) = run(&validator, &json!(3)) {
            assert_eq!(errors.len(), 2);
            assert_eq!(errors.with_keyword("enum").len(), 1);
            assert_eq!(errors.with_keyword("const").len(), 1);
        } else {
            panic!("expected failure");
        }
    }
}
