//! The object constraint keyword family.
//!
//! Covers `properties`, `patternProperties`, `additionalProperties`,
//! `required`, `minProperties` and `maxProperties`. The keywords compile
//! together as one family so a single pass over the instance can decide
//! which schema applies to each property. Non-object instances pass.

use std::sync::Arc;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Map, Value};
use stillwater::Validation;

use crate::context::ValidationContext;
use crate::error::{CompileError, ValidationError, ValidationErrors};
use crate::factory::CompileContext;
use crate::keywords::strings::length_keyword;
use crate::keywords::{value_type_name, KeywordValidator};
use crate::path::JsonPath;
use crate::schema::Schema;
use crate::EvalResult;

struct PatternProperty {
    source: String,
    regex: Regex,
    schema: Arc<Schema>,
}

/// Validates object shape: named and pattern-matched property schemas,
/// a schema for the remaining properties, required keys, and property-count
/// bounds.
pub struct ObjectValidator {
    properties: IndexMap<String, Arc<Schema>>,
    pattern_properties: Vec<PatternProperty>,
    additional: Option<Arc<Schema>>,
    required: Vec<String>,
    min_properties: Option<usize>,
    max_properties: Option<usize>,
}

impl ObjectValidator {
    pub(crate) fn compile(
        document: &Map<String, Value>,
        context: &mut CompileContext<'_>,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        let mut properties = IndexMap::new();
        match document.get("properties") {
            Some(Value::Object(entries)) => {
                for (name, fragment) in entries {
                    properties.insert(name.clone(), context.compile_subschema(fragment)?);
                }
            }
            Some(other) => {
                return Err(CompileError::MalformedKeyword {
                    keyword: "properties".to_string(),
                    expected: "an object mapping names to schemas",
                    got: value_type_name(other).to_string(),
                })
            }
            None => {}
        }

        let mut pattern_properties = Vec::new();
        match document.get("patternProperties") {
            Some(Value::Object(entries)) => {
                for (source, fragment) in entries {
                    let regex =
                        Regex::new(source).map_err(|source_err| CompileError::InvalidPattern {
                            keyword: "patternProperties".to_string(),
                            source: source_err,
                        })?;
                    pattern_properties.push(PatternProperty {
                        source: source.clone(),
                        regex,
                        schema: context.compile_subschema(fragment)?,
                    });
                }
            }
            Some(other) => {
                return Err(CompileError::MalformedKeyword {
                    keyword: "patternProperties".to_string(),
                    expected: "an object mapping patterns to schemas",
                    got: value_type_name(other).to_string(),
                })
            }
            None => {}
        }

        let additional = document
            .get("additionalProperties")
            .map(|fragment| context.compile_subschema(fragment))
            .transpose()?;

        let required = match document.get("required") {
            Some(Value::Array(names)) => names
                .iter()
                .map(|name| match name {
                    Value::String(name) => Ok(name.clone()),
                    other => Err(CompileError::MalformedKeyword {
                        keyword: "required".to_string(),
                        expected: "an array of strings",
                        got: value_type_name(other).to_string(),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(CompileError::MalformedKeyword {
                    keyword: "required".to_string(),
                    expected: "an array of strings",
                    got: value_type_name(other).to_string(),
                })
            }
            None => Vec::new(),
        };

        Ok(Box::new(ObjectValidator {
            properties,
            pattern_properties,
            additional,
            required,
            min_properties: length_keyword(document, "minProperties")?,
            max_properties: length_keyword(document, "maxProperties")?,
        }))
    }
}

impl KeywordValidator for ObjectValidator {
    fn keyword(&self) -> &str {
        "properties"
    }

    fn subschemas(&self) -> Vec<&Arc<Schema>> {
        let mut subschemas: Vec<&Arc<Schema>> = self.properties.values().collect();
        subschemas.extend(self.pattern_properties.iter().map(|p| &p.schema));
        subschemas.extend(self.additional.iter());
        subschemas
    }

    fn validate(
        &self,
        instance: &Value,
        path: &JsonPath,
        context: &mut ValidationContext,
    ) -> EvalResult {
        let object = match instance.as_object() {
            Some(object) => object,
            None => return Ok(Validation::Success(())),
        };

        let mut errors = Vec::new();

        for name in &self.required {
            if !object.contains_key(name) {
                errors.push(ValidationError::new(
                    path.clone(),
                    "required",
                    format!("required property '{}' is missing", name),
                ));
            }
        }

        if let Some(min) = self.min_properties {
            if object.len() < min {
                errors.push(ValidationError::new(
                    path.clone(),
                    "minProperties",
                    format!(
                        "object must have at least {} properties, got {}",
                        min,
                        object.len()
                    ),
                ));
            }
        }
        if let Some(max) = self.max_properties {
            if object.len() > max {
                errors.push(ValidationError::new(
                    path.clone(),
                    "maxProperties",
                    format!(
                        "object must have at most {} properties, got {}",
                        max,
                        object.len()
                    ),
                ));
            }
        }

        for (name, value) in object {
            let property_path = path.push_key(name);
            let mut claimed = false;

            if let Some(schema) = self.properties.get(name) {
                claimed = true;
                if let Validation::Failure(nested) =
                    schema.validate_in_context(value, &property_path, context)?
                {
                    errors.extend(nested.into_iter());
                }
            }

            for pattern in &self.pattern_properties {
                if pattern.regex.is_match(name) {
                    claimed = true;
                    if let Validation::Failure(nested) =
                        pattern.schema.validate_in_context(value, &property_path, context)?
                    {
                        // Pattern failures keep the property path; the source
                        // pattern goes into the message.
                        errors.extend(nested.into_iter().map(|mut error| {
                            error.message =
                                format!("{} (via pattern '{}')", error.message, pattern.source);
                            error
                        }));
                    }
                }
            }

            if !claimed {
                if let Some(additional) = &self.additional {
                    if additional.is_always_invalid() {
                        errors.push(ValidationError::new(
                            property_path.clone(),
                            "additionalProperties",
                            format!("additional property '{}' is not allowed", name),
                        ));
                    } else if let Validation::Failure(nested) =
                        additional.validate_in_context(value, &property_path, context)?
                    {
                        errors.extend(nested.into_iter());
                    }
                }
            }
        }

        Ok(if errors.is_empty() {
            Validation::Success(())
        } else {
            Validation::Failure(ValidationErrors::from_vec(errors))
        })
    }
}
