//! The array constraint keyword family.
//!
//! Covers `prefixItems`, `items`, `minItems`, `maxItems`, `uniqueItems` and
//! `contains`. Non-array instances pass.

use std::sync::Arc;

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

/// Validates array shape: positional item schemas, a schema for the rest,
/// length bounds, uniqueness, and the `contains` existence check.
pub struct ArrayValidator {
    prefix_items: Vec<Arc<Schema>>,
    items: Option<Arc<Schema>>,
    min_items: Option<usize>,
    max_items: Option<usize>,
    unique_items: bool,
    contains: Option<Arc<Schema>>,
}

impl ArrayValidator {
    pub(crate) fn compile(
        document: &Map<String, Value>,
        context: &mut CompileContext<'_>,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        let prefix_items = match document.get("prefixItems") {
            Some(Value::Array(fragments)) => fragments
                .iter()
                .map(|fragment| context.compile_subschema(fragment))
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(CompileError::MalformedKeyword {
                    keyword: "prefixItems".to_string(),
                    expected: "an array of schemas",
                    got: value_type_name(other).to_string(),
                })
            }
            None => Vec::new(),
        };

        let items = document
            .get("items")
            .map(|fragment| context.compile_subschema(fragment))
            .transpose()?;

        let unique_items = match document.get("uniqueItems") {
            Some(Value::Bool(unique)) => *unique,
            Some(other) => {
                return Err(CompileError::MalformedKeyword {
                    keyword: "uniqueItems".to_string(),
                    expected: "a boolean",
                    got: value_type_name(other).to_string(),
                })
            }
            None => false,
        };

        let contains = document
            .get("contains")
            .map(|fragment| context.compile_subschema(fragment))
            .transpose()?;

        Ok(Box::new(ArrayValidator {
            prefix_items,
            items,
            min_items: length_keyword(document, "minItems")?,
            max_items: length_keyword(document, "maxItems")?,
            unique_items,
            contains,
        }))
    }
}

impl KeywordValidator for ArrayValidator {
    fn keyword(&self) -> &str {
        "items"
    }

    fn subschemas(&self) -> Vec<&Arc<Schema>> {
        let mut subschemas: Vec<&Arc<Schema>> = self.prefix_items.iter().collect();
        subschemas.extend(self.items.iter());
        subschemas.extend(self.contains.iter());
        subschemas
    }

    fn validate(
        &self,
        instance: &Value,
        path: &JsonPath,
        context: &mut ValidationContext,
    ) -> EvalResult {
        let items = match instance.as_array() {
            Some(items) => items,
            None => return Ok(Validation::Success(())),
        };

        let mut errors = Vec::new();

        if let Some(min) = self.min_items {
            if items.len() < min {
                errors.push(ValidationError::new(
                    path.clone(),
                    "minItems",
                    format!("array must have at least {} items, got {}", min, items.len()),
                ));
            }
        }
        if let Some(max) = self.max_items {
            if items.len() > max {
                errors.push(ValidationError::new(
                    path.clone(),
                    "maxItems",
                    format!("array must have at most {} items, got {}", max, items.len()),
                ));
            }
        }

        if self.unique_items {
            for (later, item) in items.iter().enumerate().skip(1) {
                if let Some(earlier) = items[..later].iter().position(|other| other == item) {
                    errors.push(ValidationError::new(
                        path.clone(),
                        "uniqueItems",
                        format!("items at indexes {} and {} are equal", earlier, later),
                    ));
                }
            }
        }

        for (index, item) in items.iter().enumerate() {
            let schema = self
                .prefix_items
                .get(index)
                .or(self.items.as_ref());
            if let Some(schema) = schema {
                let item_path = path.push_index(index);
                if let Validation::Failure(nested) =
                    schema.validate_in_context(item, &item_path, context)?
                {
                    errors.extend(nested.into_iter());
                }
            }
        }

        if let Some(contains) = &self.contains {
            let mut matched = false;
            let mut branch_errors = Vec::new();
            for (index, item) in items.iter().enumerate() {
                match contains.validate_in_context(item, &path.push_index(index), context)? {
                    Validation::Success(()) => {
                        matched = true;
                        break;
                    }
                    Validation::Failure(nested) => branch_errors.extend(nested.into_iter()),
                }
            }
            if !matched {
                errors.push(
                    ValidationError::new(
                        path.clone(),
                        "contains",
                        "no array item matches the contains schema",
                    )
                    .with_children(branch_errors),
                );
            }
        }

        Ok(if errors.is_empty() {
            Validation::Success(())
        } else {
            Validation::Failure(ValidationErrors::from_vec(errors))
        })
    }
}
