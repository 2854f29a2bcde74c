//! The boolean composition keyword families.
//!
//! `allOf`, `anyOf`, `oneOf` and `not` each register as their own family; a
//! document carrying several of them gets several combinator validators, all
//! of which must pass.

use std::sync::Arc;

use serde_json::{Map, Value};
use stillwater::Validation;

use crate::context::ValidationContext;
use crate::error::{CompileError, ValidationError, ValidationErrors};
use crate::factory::CompileContext;
use crate::keywords::{value_type_name, KeywordValidator};
use crate::path::JsonPath;
use crate::schema::Schema;
use crate::EvalResult;

/// Validates one boolean composition keyword over its sub-schema branches.
pub enum CombinatorValidator {
    /// Every branch must pass; branch failures aggregate flat.
    AllOf { branches: Vec<Arc<Schema>> },
    /// At least one branch must pass. Evaluation short-circuits on the first
    /// success; on overall failure every branch's errors are reported as
    /// children for diagnostics.
    AnyOf { branches: Vec<Arc<Schema>> },
    /// Exactly one branch must pass. Zero matches and multiple matches are
    /// distinct failures.
    OneOf { branches: Vec<Arc<Schema>> },
    /// The sub-schema must fail.
    Not { schema: Arc<Schema> },
}

impl CombinatorValidator {
    pub(crate) fn compile_all_of(
        document: &Map<String, Value>,
        context: &mut CompileContext<'_>,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        Ok(Box::new(CombinatorValidator::AllOf {
            branches: compile_branches(document, "allOf", context)?,
        }))
    }

    pub(crate) fn compile_any_of(
        document: &Map<String, Value>,
        context: &mut CompileContext<'_>,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        Ok(Box::new(CombinatorValidator::AnyOf {
            branches: compile_branches(document, "anyOf", context)?,
        }))
    }

    pub(crate) fn compile_one_of(
        document: &Map<String, Value>,
        context: &mut CompileContext<'_>,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        Ok(Box::new(CombinatorValidator::OneOf {
            branches: compile_branches(document, "oneOf", context)?,
        }))
    }

    pub(crate) fn compile_not(
        document: &Map<String, Value>,
        context: &mut CompileContext<'_>,
    ) -> Result<Box<dyn KeywordValidator>, CompileError> {
        let fragment = document
            .get("not")
            .ok_or_else(|| CompileError::MalformedKeyword {
                keyword: "not".to_string(),
                expected: "a schema",
                got: "nothing".to_string(),
            })?;
        Ok(Box::new(CombinatorValidator::Not {
            schema: context.compile_subschema(fragment)?,
        }))
    }

    fn validate_all_of(
        branches: &[Arc<Schema>],
        instance: &Value,
        path: &JsonPath,
        context: &mut ValidationContext,
    ) -> EvalResult {
        let mut errors = Vec::new();
        for branch in branches {
            if let Validation::Failure(nested) =
                branch.validate_in_context(instance, path, context)?
            {
                errors.extend(nested.into_iter());
            }
        }

        Ok(if errors.is_empty() {
            Validation::Success(())
        } else {
            Validation::Failure(ValidationErrors::from_vec(errors))
        })
    }

    fn validate_any_of(
        branches: &[Arc<Schema>],
        instance: &Value,
        path: &JsonPath,
        context: &mut ValidationContext,
    ) -> EvalResult {
        let mut branch_errors = Vec::new();
        for branch in branches {
            match branch.validate_in_context(instance, path, context)? {
                Validation::Success(()) => return Ok(Validation::Success(())),
                Validation::Failure(nested) => branch_errors.extend(nested.into_iter()),
            }
        }

        Ok(Validation::Failure(ValidationErrors::single(
            ValidationError::new(
                path.clone(),
                "anyOf",
                format!("value did not match any of {} schemas", branches.len()),
            )
            .with_code("any_of_none_matched")
            .with_children(branch_errors),
        )))
    }

    fn validate_one_of(
        branches: &[Arc<Schema>],
        instance: &Value,
        path: &JsonPath,
        context: &mut ValidationContext,
    ) -> EvalResult {
        let mut matched = Vec::new();
        let mut branch_errors = Vec::new();
        for (index, branch) in branches.iter().enumerate() {
            match branch.validate_in_context(instance, path, context)? {
                Validation::Success(()) => matched.push(index),
                Validation::Failure(nested) => branch_errors.extend(nested.into_iter()),
            }
        }

        Ok(match matched.len() {
            0 => Validation::Failure(ValidationErrors::single(
                ValidationError::new(
                    path.clone(),
                    "oneOf",
                    format!("value did not match any of {} schemas", branches.len()),
                )
                .with_code("one_of_none_matched")
                .with_children(branch_errors),
            )),
            1 => Validation::Success(()),
            n => Validation::Failure(ValidationErrors::single(
                ValidationError::new(
                    path.clone(),
                    "oneOf",
                    format!(
                        "value matched {} schemas (indices {:?}), expected exactly one",
                        n, matched
                    ),
                )
                .with_code("one_of_multiple_matched"),
            )),
        })
    }

    fn validate_not(
        schema: &Arc<Schema>,
        instance: &Value,
        path: &JsonPath,
        context: &mut ValidationContext,
    ) -> EvalResult {
        Ok(match schema.validate_in_context(instance, path, context)? {
            Validation::Success(()) => Validation::Failure(ValidationErrors::single(
                ValidationError::new(
                    path.clone(),
                    "not",
                    "value must not match the disallowed schema",
                ),
            )),
            Validation::Failure(_) => Validation::Success(()),
        })
    }
}

fn compile_branches(
    document: &Map<String, Value>,
    keyword: &str,
    context: &mut CompileContext<'_>,
) -> Result<Vec<Arc<Schema>>, CompileError> {
    match document.get(keyword) {
        Some(Value::Array(fragments)) if !fragments.is_empty() => fragments
            .iter()
            .map(|fragment| context.compile_subschema(fragment))
            .collect(),
        Some(Value::Array(_)) => Err(CompileError::MalformedKeyword {
            keyword: keyword.to_string(),
            expected: "a non-empty array of schemas",
            got: "an empty array".to_string(),
        }),
        Some(other) => Err(CompileError::MalformedKeyword {
            keyword: keyword.to_string(),
            expected: "a non-empty array of schemas",
            got: value_type_name(other).to_string(),
        }),
        None => Err(CompileError::MalformedKeyword {
            keyword: keyword.to_string(),
            expected: "a non-empty array of schemas",
            got: "nothing".to_string(),
        }),
    }
}

impl KeywordValidator for CombinatorValidator {
    fn keyword(&self) -> &str {
        match self {
            CombinatorValidator::AllOf { .. } => "allOf",
            CombinatorValidator::AnyOf { .. } => "anyOf",
            CombinatorValidator::OneOf { .. } => "oneOf",
            CombinatorValidator::Not { .. } => "not",
        }
    }

    fn subschemas(&self) -> Vec<&Arc<Schema>> {
        match self {
            CombinatorValidator::AllOf { branches }
            | CombinatorValidator::AnyOf { branches }
            | CombinatorValidator::OneOf { branches } => branches.iter().collect(),
            CombinatorValidator::Not { schema } => vec![schema],
        }
    }

    fn validate(
        &self,
        instance: &Value,
        path: &JsonPath,
        context: &mut ValidationContext,
    ) -> EvalResult {
        match self {
            CombinatorValidator::AllOf { branches } => {
                Self::validate_all_of(branches, instance, path, context)
            }
            CombinatorValidator::AnyOf { branches } => {
                Self::validate_any_of(branches, instance, path, context)
            }
            CombinatorValidator::OneOf { branches } => {
                Self::validate_one_of(branches, instance, path, context)
            }
            CombinatorValidator::Not { schema } => {
                Self::validate_not(schema, instance, path, context)
            }
        }
    }
}
