//! The `type` keyword family.

use serde_json::{Map, Value};
use stillwater::Validation;

use crate::context::ValidationContext;
use crate::error::{CompileError, ValidationError, ValidationErrors};
use crate::factory::CompileContext;
use crate::keywords::{value_type_name, KeywordValidator};
use crate::path::JsonPath;
use crate::EvalResult;

/// A JSON Schema primitive type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JsonType {
    Null,
    Boolean,
    Object,
    Array,
    Number,
    Integer,
    String,
}

impl JsonType {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "null" => Some(JsonType::Null),
            "boolean" => Some(JsonType::Boolean),
            "object" => Some(JsonType::Object),
            "array" => Some(JsonType::Array),
            "number" => Some(JsonType::Number),
            "integer" => Some(JsonType::Integer),
            "string" => Some(JsonType::String),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            JsonType::Null => "null",
            JsonType::Boolean => "boolean",
            JsonType::Object => "object",
            JsonType::Array => "array",
            JsonType::Number => "number",
            JsonType::Integer => "integer",
            JsonType::String => "string",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            JsonType::Null => value.is_null(),
            JsonType::Boolean => value.is_boolean(),
            JsonType::Object => value.is_object(),
            JsonType::Array => value.is_array(),
            JsonType::Number => value.is_number(),
            JsonType::String => value.is_string(),
            // A number with a zero fractional part is an integer, per the
            // JSON Schema data model.
            JsonType::Integer => match value {
                Value::Number(n) => {
                    n.is_i64() || n.is_u64() || n.as_f64().map(|f| f.fract() == 0.0).unwrap_or(false)
                }
                _ => false,
            },
        }
    }
}

/// Validates the `type` keyword: the instance must be one of the allowed
/// primitive types.
pub struct TypeValidator {
    allowed: Vec<JsonType>,
}

impl TypeValidator {
    pub(crate) fn compile(
        document: &Map<String, Value>,
        _context: &mut CompileContext<'_>,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        let allowed = match document.get("type") {
            Some(Value::String(name)) => vec![parse_type_name(name)?],
            Some(Value::Array(names)) => names
                .iter()
                .map(|name| match name {
                    Value::String(name) => parse_type_name(name),
                    other => Err(CompileError::MalformedKeyword {
                        keyword: "type".to_string(),
                        expected: "a string or array of strings",
                        got: value_type_name(other).to_string(),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(CompileError::MalformedKeyword {
                    keyword: "type".to_string(),
                    expected: "a string or array of strings",
                    got: value_type_name(other).to_string(),
                })
            }
            None => Vec::new(),
        };

        Ok(Box::new(TypeValidator { allowed }))
    }
}

fn parse_type_name(name: &str) -> Result<JsonType, CompileError> {
    JsonType::from_name(name).ok_or_else(|| CompileError::MalformedKeyword {
        keyword: "type".to_string(),
        expected: "a JSON type name",
        got: format!("'{}'", name),
    })
}

impl KeywordValidator for TypeValidator {
    fn keyword(&self) -> &str {
        "type"
    }

    fn validate(
        &self,
        instance: &Value,
        path: &JsonPath,
        _context: &mut ValidationContext,
    ) -> EvalResult {
        if self.allowed.is_empty() || self.allowed.iter().any(|t| t.matches(instance)) {
            return Ok(Validation::Success(()));
        }

        let expected = self
            .allowed
            .iter()
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join(" or ");
        Ok(Validation::Failure(ValidationErrors::single(
            ValidationError::new(
                path.clone(),
                "type",
                format!("expected {}, got {}", expected, value_type_name(instance)),
            ),
        )))
    }
}
