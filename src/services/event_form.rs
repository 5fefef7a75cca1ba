use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};

use crate::errors::{FormErrors, SubmissionError, ValidationError};
use crate::services::resolver::{require, split_name_list, Resolution};
use crate::services::schedule::ScheduleConflictChecker;
use crate::stores::{EmployeeStore, EventData, EventStore, ModuleStore, PlaceStore};
use crate::types::db::event;

/// Raw field values of an event submission, as handed over by the API layer.
/// Responsible, place and modules arrive as free-text names.
#[derive(Debug, Clone)]
pub struct EventSubmission {
    pub title: String,
    pub description: Option<String>,
    pub responsible_first_name: String,
    pub responsible_last_name: String,
    pub place_name: String,
    pub module_names: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

struct ValidatedEvent {
    data: EventData,
    module_ids: Vec<i32>,
}

/// Validates and persists event submissions.
///
/// Validation order is fixed: resolve the responsible person, the place and
/// the modules, then validate the time range, then run the overlap check.
/// Field errors are collected so the user sees all of them in one round
/// trip; the overlap check only runs once its prerequisites (place and a
/// valid time range) are in hand. Nothing is written unless every check
/// passed, and the write itself replaces the module set atomically with the
/// event row.
pub struct EventForm {
    employees: Arc<EmployeeStore>,
    places: Arc<PlaceStore>,
    modules: Arc<ModuleStore>,
    events: Arc<EventStore>,
    schedule: ScheduleConflictChecker,
}

impl EventForm {
    pub fn new(
        employees: Arc<EmployeeStore>,
        places: Arc<PlaceStore>,
        modules: Arc<ModuleStore>,
        events: Arc<EventStore>,
    ) -> Self {
        Self {
            employees,
            places,
            modules,
            schedule: ScheduleConflictChecker::new(events.clone()),
            events,
        }
    }

    pub async fn create(
        &self,
        submission: EventSubmission,
        creator_id: &str,
    ) -> Result<event::Model, SubmissionError> {
        let validated = self.validate(&submission, None).await?;
        self.events
            .create(validated.data, creator_id, &validated.module_ids)
            .await
            .map_err(Into::into)
    }

    /// Re-validates with the event's own primary key excluded from the
    /// overlap check, so an event never conflicts with itself.
    pub async fn update(
        &self,
        id: i32,
        submission: EventSubmission,
    ) -> Result<event::Model, SubmissionError> {
        let validated = self.validate(&submission, Some(id)).await?;
        self.events
            .update(id, validated.data, &validated.module_ids)
            .await
            .map_err(Into::into)
    }

    async fn validate(
        &self,
        submission: &EventSubmission,
        editing: Option<i32>,
    ) -> Result<ValidatedEvent, SubmissionError> {
        let mut errors = FormErrors::new();

        let title = match require(&submission.title) {
            Ok(title) => title.to_string(),
            Err(e) => {
                errors.add_field("title", e);
                String::new()
            }
        };

        let responsible = self.resolve_responsible(submission, &mut errors).await?;
        let place = self.resolve_place(submission, &mut errors).await?;
        let module_ids = self.resolve_modules(submission, &mut errors).await?;

        let range_valid = submission.start_time < submission.end_time;
        if !range_valid {
            errors.add_field("end_time", ValidationError::InvalidRange);
        }

        // Overlap is only decidable once the place resolved and the range is
        // coherent; missing prerequisites were already reported above.
        if let Some(place) = &place {
            if range_valid {
                if let Some(conflicting_title) = self
                    .schedule
                    .check(
                        place.id,
                        submission.date,
                        submission.start_time,
                        submission.end_time,
                        editing,
                    )
                    .await?
                {
                    errors.add_form(ValidationError::ScheduleConflict {
                        title: conflicting_title,
                    });
                }
            }
        }

        match (responsible, place) {
            (Some(responsible), Some(place)) if errors.is_empty() => Ok(ValidatedEvent {
                data: EventData {
                    title,
                    description: submission.description.clone().unwrap_or_default(),
                    responsible_id: responsible.id,
                    place_id: place.id,
                    date: submission.date,
                    start_time: submission.start_time,
                    end_time: submission.end_time,
                },
                module_ids,
            }),
            _ => Err(SubmissionError::Validation(errors)),
        }
    }

    async fn resolve_responsible(
        &self,
        submission: &EventSubmission,
        errors: &mut FormErrors,
    ) -> Result<Option<crate::types::db::employee::Model>, SubmissionError> {
        let first = require(&submission.responsible_first_name);
        let last = require(&submission.responsible_last_name);

        if let Err(e) = &first {
            errors.add_field("responsible_first_name", e.clone());
        }
        if let Err(e) = &last {
            errors.add_field("responsible_last_name", e.clone());
        }

        let (Ok(first), Ok(last)) = (first, last) else {
            return Ok(None);
        };

        let matches = self.employees.find_by_full_name_ci(first, last).await?;
        match Resolution::from_matches(matches)
            .into_field_result("employee", &format!("{first} {last}"))
        {
            Ok(employee) => Ok(Some(employee)),
            Err(e) => {
                errors.add_field("responsible_first_name", e);
                Ok(None)
            }
        }
    }

    async fn resolve_place(
        &self,
        submission: &EventSubmission,
        errors: &mut FormErrors,
    ) -> Result<Option<crate::types::db::place::Model>, SubmissionError> {
        let name = match require(&submission.place_name) {
            Ok(name) => name,
            Err(e) => {
                errors.add_field("place_name", e);
                return Ok(None);
            }
        };

        let matches = self.places.find_by_name_ci(name).await?;
        match Resolution::from_matches(matches).into_field_result("place", name) {
            Ok(place) => Ok(Some(place)),
            Err(e) => {
                errors.add_field("place_name", e);
                Ok(None)
            }
        }
    }

    /// Resolve the comma-separated module list. Every token resolves
    /// independently; one bad token invalidates the whole field. Repeated
    /// names collapse to a single association.
    async fn resolve_modules(
        &self,
        submission: &EventSubmission,
        errors: &mut FormErrors,
    ) -> Result<Vec<i32>, SubmissionError> {
        let raw = match require(&submission.module_names) {
            Ok(raw) => raw,
            Err(e) => {
                errors.add_field("module_names", e);
                return Ok(Vec::new());
            }
        };

        let tokens = split_name_list(raw);
        if tokens.is_empty() {
            errors.add_field("module_names", ValidationError::Required);
            return Ok(Vec::new());
        }

        let mut module_ids: Vec<i32> = Vec::new();
        for token in tokens {
            let matches = self.modules.find_by_name_ci(token).await?;
            match Resolution::from_matches(matches).into_field_result("module", token) {
                Ok(module) => {
                    if !module_ids.contains(&module.id) {
                        module_ids.push(module.id);
                    }
                }
                Err(e) => {
                    errors.add_field("module_names", e);
                    return Ok(Vec::new());
                }
            }
        }

        Ok(module_ids)
    }
}
