//! JSON-Schema-backed validation engine.
//!
//! Wraps a compiled [`jsonschema::Validator`] (Draft 7) and translates its
//! diagnostics into the crate's [`FieldErrorCode`] taxonomy — see the
//! translation table in the module-level doc of [`ValidationEngine::validate`].

use std::collections::HashMap;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, Validator};
use serde_json::Value;

use crate::envelope::FieldError;
use crate::model::FieldErrorCode;
use crate::types::{Error, Result};

/// Outcome of validating a data document against a schema.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<FieldError>,
    pub data: Value,
    pub missing_fields: Vec<String>,
    pub invalid_fields: Vec<String>,
}

/// Validates submission data against one JSON Schema and translates
/// validator diagnostics into the contract's fielded error taxonomy.
///
/// Bound to a single schema for its lifetime; the runtime orchestrator
/// holds one engine per intake, shared read-only across that intake's
/// submissions.
pub struct ValidationEngine {
    validator: Validator,
}

impl std::fmt::Debug for ValidationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationEngine").finish()
    }
}

impl ValidationEngine {
    /// Compiles `schema`. Fails with [`Error::SchemaInvalid`] if it is not a
    /// valid JSON-Schema-Draft-7-compatible document.
    ///
    /// Pinned to Draft 7 with format assertion forced on, matching the
    /// original's `Draft7Validator`: letting the validator infer a draft from
    /// `$schema` would fall back to a newer default draft where `format` is
    /// annotation-only and never produces a diagnostic.
    pub fn new(schema: &Value) -> Result<Self> {
        let validator = jsonschema::options()
            .with_draft(Draft::Draft7)
            .should_validate_formats(true)
            .build(schema)
            .map_err(|e| Error::schema_invalid(e.to_string()))?;
        Ok(Self { validator })
    }

    /// Runs every diagnostic the validator produces (never stops at the
    /// first) and partitions them into `missing_fields` (code `required`)
    /// and `invalid_fields` (every other code). On success both are empty
    /// and `data` echoes the input verbatim — the engine performs no
    /// coercion.
    pub fn validate(&self, data: Value) -> ValidationResult {
        let diagnostics: Vec<_> = self.validator.iter_errors(&data).collect();
        if diagnostics.is_empty() {
            return ValidationResult {
                is_valid: true,
                errors: Vec::new(),
                data,
                missing_fields: Vec::new(),
                invalid_fields: Vec::new(),
            };
        }

        let mut errors = Vec::with_capacity(diagnostics.len());
        let mut missing_fields = Vec::new();
        let mut invalid_fields = Vec::new();

        for diagnostic in &diagnostics {
            let field_error = translate(diagnostic);
            if field_error.code == FieldErrorCode::Required {
                missing_fields.push(field_error.path.clone());
            } else {
                invalid_fields.push(field_error.path.clone());
            }
            errors.push(field_error);
        }

        ValidationResult {
            is_valid: false,
            errors,
            data,
            missing_fields,
            invalid_fields,
        }
    }
}

/// Joins an instance pointer's segments with `.`, stringifying array
/// indices, per §6's canonical path format.
fn dotted_path(error: &jsonschema::ValidationError<'_>) -> String {
    error
        .instance_path
        .iter()
        .map(|chunk| chunk.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn translate(error: &jsonschema::ValidationError<'_>) -> FieldError {
    let path = dotted_path(error);

    match &error.kind {
        ValidationErrorKind::Required { property } => {
            let prop = property.as_str().unwrap_or("field");
            let full_path = if path.is_empty() {
                prop.to_string()
            } else {
                format!("{path}.{prop}")
            };
            FieldError::new(
                &full_path,
                FieldErrorCode::Required,
                format!("field '{full_path}' is required but was not provided"),
            )
            .with_expected("required field")
        }
        ValidationErrorKind::Type { kind } => {
            let expected = kind.to_string();
            let received = json_type_name(&error.instance);
            FieldError::new(
                &path,
                FieldErrorCode::InvalidType,
                format!("field '{path}' has invalid type. expected {expected}, got {received}"),
            )
            .with_expected(expected)
            .with_received(received)
        }
        ValidationErrorKind::Format { format } => FieldError::new(
            &path,
            FieldErrorCode::InvalidFormat,
            format!("field '{path}' does not satisfy format '{format}'"),
        )
        .with_expected(format.clone())
        .with_received(error.instance.clone().into_owned()),
        ValidationErrorKind::Pattern { pattern } => FieldError::new(
            &path,
            FieldErrorCode::InvalidFormat,
            format!("field '{path}' does not match pattern '{pattern}'"),
        )
        .with_expected(format!("pattern: {pattern}"))
        .with_received(error.instance.clone().into_owned()),
        ValidationErrorKind::Enum { options } => FieldError::new(
            &path,
            FieldErrorCode::InvalidValue,
            format!("field '{path}' must be one of the allowed values"),
        )
        .with_expected(options.clone())
        .with_received(error.instance.clone().into_owned()),
        ValidationErrorKind::Constant { expected_value } => FieldError::new(
            &path,
            FieldErrorCode::InvalidValue,
            format!("field '{path}' does not match the required constant value"),
        )
        .with_expected(expected_value.clone())
        .with_received(error.instance.clone().into_owned()),
        ValidationErrorKind::MinLength { limit } => {
            let actual = error.instance.as_str().map(|s| s.chars().count()).unwrap_or(0);
            FieldError::new(
                &path,
                FieldErrorCode::TooShort,
                format!("field '{path}' is too short: minimum length {limit}, got {actual}"),
            )
            .with_expected(format!("minimum {limit} characters"))
            .with_received(format!("{actual} characters"))
        }
        ValidationErrorKind::MaxLength { limit } => {
            let actual = error.instance.as_str().map(|s| s.chars().count()).unwrap_or(0);
            FieldError::new(
                &path,
                FieldErrorCode::TooLong,
                format!("field '{path}' is too long: maximum length {limit}, got {actual}"),
            )
            .with_expected(format!("maximum {limit} characters"))
            .with_received(format!("{actual} characters"))
        }
        ValidationErrorKind::Minimum { limit } => bound_error(&path, "minimum", limit, error),
        ValidationErrorKind::Maximum { limit } => bound_error(&path, "maximum", limit, error),
        ValidationErrorKind::ExclusiveMinimum { limit } => {
            bound_error(&path, "exclusiveMinimum", limit, error)
        }
        ValidationErrorKind::ExclusiveMaximum { limit } => {
            bound_error(&path, "exclusiveMaximum", limit, error)
        }
        ValidationErrorKind::MinItems { limit } => FieldError::new(
            &path,
            FieldErrorCode::InvalidValue,
            format!("field '{path}' has too few items: minimum {limit}"),
        )
        .with_expected(format!("minItems: {limit}")),
        ValidationErrorKind::MaxItems { limit } => FieldError::new(
            &path,
            FieldErrorCode::InvalidValue,
            format!("field '{path}' has too many items: maximum {limit}"),
        )
        .with_expected(format!("maxItems: {limit}")),
        other => FieldError::new(
            &path,
            FieldErrorCode::Custom,
            format!("field '{path}' failed validation: {other}"),
        ),
    }
}

fn bound_error(
    path: &str,
    constraint: &str,
    limit: &Value,
    error: &jsonschema::ValidationError<'_>,
) -> FieldError {
    FieldError::new(
        path,
        FieldErrorCode::InvalidValue,
        format!("field '{path}' violates constraint '{constraint}': {limit}"),
    )
    .with_expected(format!("{constraint}: {limit}"))
    .with_received(error.instance.clone().into_owned())
}

/// Convenience for building a `HashMap<path, FieldError>` from a result's
/// error list, handy for tests and for embedders that want path-keyed
/// lookups instead of a flat list.
pub fn errors_by_path(result: &ValidationResult) -> HashMap<String, &FieldError> {
    result.errors.iter().map(|e| (e.path.clone(), e)).collect()
}
