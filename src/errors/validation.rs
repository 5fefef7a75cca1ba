use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::errors::InternalError;

/// User-input validation failures. All of these are recoverable states
/// surfaced to the submitter for correction, never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("this field is required")]
    Required,

    /// A free-text reference did not match any record.
    #[error("the {entity} '{name}' does not exist")]
    NotFound { entity: &'static str, name: String },

    /// A free-text reference matched more than one record. Names are expected
    /// to be unique, so this signals a data-integrity anomaly; the resolver
    /// never picks a candidate on the user's behalf.
    #[error("multiple {entity} records match '{name}', please be more specific")]
    Ambiguous { entity: &'static str, name: String },

    #[error("the end time must be after the start time")]
    InvalidRange,

    /// The submitted time range intersects an existing event at the same
    /// place and date.
    #[error("this event overlaps with '{title}' on the same date and place")]
    ScheduleConflict { title: String },

    #[error("{0}")]
    DuplicateEntity(String),
}

impl ValidationError {
    /// Stable machine-readable code for API payloads.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::Required => "required",
            ValidationError::NotFound { .. } => "not_found",
            ValidationError::Ambiguous { .. } => "ambiguous",
            ValidationError::InvalidRange => "invalid_range",
            ValidationError::ScheduleConflict { .. } => "schedule_conflict",
            ValidationError::DuplicateEntity(_) => "duplicate_entity",
        }
    }
}

/// Accumulated validation outcome of one submission.
///
/// Field-scoped errors attach to the originating input so the user sees all
/// of them in a single round trip; form-scoped errors block the submission
/// as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    field: BTreeMap<String, Vec<ValidationError>>,
    form: Vec<ValidationError>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_field(&mut self, field: impl Into<String>, error: ValidationError) {
        self.field.entry(field.into()).or_default().push(error);
    }

    pub fn add_form(&mut self, error: ValidationError) {
        self.form.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.field.is_empty() && self.form.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.field.contains_key(field)
    }

    pub fn field_errors(&self) -> impl Iterator<Item = (&str, &ValidationError)> {
        self.field
            .iter()
            .flat_map(|(name, errors)| errors.iter().map(move |e| (name.as_str(), e)))
    }

    pub fn form_errors(&self) -> impl Iterator<Item = &ValidationError> {
        self.form.iter()
    }

    /// Finish a validation pass: `Ok(value)` when nothing was recorded,
    /// otherwise the collected errors.
    pub fn into_result<T>(self, value: T) -> Result<T, SubmissionError> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(SubmissionError::Validation(self))
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.form {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{error}")?;
            first = false;
        }
        for (name, errors) in &self.field {
            for error in errors {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{name}: {error}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Outcome of a form submission: either the input was invalid, or something
/// broke underneath while validating/persisting it.
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("validation failed: {0}")]
    Validation(FormErrors),

    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl SubmissionError {
    pub fn field(field: impl Into<String>, error: ValidationError) -> Self {
        let mut errors = FormErrors::new();
        errors.add_field(field, error);
        SubmissionError::Validation(errors)
    }

    pub fn form(error: ValidationError) -> Self {
        let mut errors = FormErrors::new();
        errors.add_form(error);
        SubmissionError::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_form_errors_resolve_to_ok() {
        let errors = FormErrors::new();
        assert!(errors.is_empty());
        assert_eq!(errors.into_result(42).unwrap(), 42);
    }

    #[test]
    fn field_errors_accumulate_per_field() {
        let mut errors = FormErrors::new();
        errors.add_field("place_name", ValidationError::Required);
        errors.add_field(
            "responsible_first_name",
            ValidationError::NotFound {
                entity: "employee",
                name: "Nadie".to_string(),
            },
        );
        errors.add_field("place_name", ValidationError::Required);

        assert!(!errors.is_empty());
        assert!(errors.has_field("place_name"));
        assert!(errors.has_field("responsible_first_name"));
        assert_eq!(errors.field_errors().count(), 3);
        assert_eq!(errors.form_errors().count(), 0);
    }

    #[test]
    fn form_level_errors_are_kept_apart_from_field_errors() {
        let mut errors = FormErrors::new();
        errors.add_form(ValidationError::ScheduleConflict {
            title: "Weekly sync".to_string(),
        });

        assert_eq!(errors.field_errors().count(), 0);
        let form: Vec<_> = errors.form_errors().collect();
        assert_eq!(form.len(), 1);
        assert_eq!(form[0].code(), "schedule_conflict");
    }

    #[test]
    fn into_result_reports_collected_errors() {
        let mut errors = FormErrors::new();
        errors.add_field("end_time", ValidationError::InvalidRange);

        match errors.into_result(()) {
            Err(SubmissionError::Validation(errors)) => {
                assert!(errors.has_field("end_time"));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn display_includes_field_names_and_messages() {
        let mut errors = FormErrors::new();
        errors.add_field("department_name", ValidationError::Required);
        let rendered = errors.to_string();
        assert!(rendered.contains("department_name"));
        assert!(rendered.contains("required"));
    }
}
