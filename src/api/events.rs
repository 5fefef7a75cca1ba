use std::sync::Arc;

use poem_openapi::{
    param::{Path, Query},
    payload::Json,
    OpenApi, Tags,
};

use crate::api::{authenticate, BearerAuth};
use crate::errors::ApiError;
use crate::services::{EventForm, EventSubmission, TokenService};
use crate::stores::{EventDetail, EventFilters, EventStore};
use crate::types::dto::common::MessageResponse;
use crate::types::dto::event::{CalendarEntry, EventRequest, EventResponse, EventSummary};

/// Scheduled event endpoints
pub struct EventsApi {
    form: EventForm,
    events: Arc<EventStore>,
    tokens: Arc<TokenService>,
}

/// API tags for event endpoints
#[derive(Tags)]
enum EventTags {
    /// Scheduled events
    Events,
}

impl EventsApi {
    pub fn new(form: EventForm, events: Arc<EventStore>, tokens: Arc<TokenService>) -> Self {
        Self {
            form,
            events,
            tokens,
        }
    }

    fn to_response(detail: EventDetail) -> EventResponse {
        EventResponse {
            id: detail.event.id,
            title: detail.event.title,
            description: detail.event.description,
            responsible_id: detail.responsible.id,
            responsible_name: format!(
                "{} {}",
                detail.responsible.first_name, detail.responsible.last_name
            ),
            place_id: detail.place.id,
            place_name: detail.place.name,
            modules: detail.modules.into_iter().map(|m| m.name).collect(),
            date: detail.event.date,
            start_time: detail.event.start_time,
            end_time: detail.event.end_time,
            creator_id: detail.event.creator_id,
        }
    }

    fn submission(body: EventRequest) -> EventSubmission {
        EventSubmission {
            title: body.title,
            description: body.description,
            responsible_first_name: body.responsible_first_name,
            responsible_last_name: body.responsible_last_name,
            place_name: body.place_name,
            module_names: body.module_names,
            date: body.date,
            start_time: body.start_time,
            end_time: body.end_time,
        }
    }

    async fn detail_response(&self, id: i32) -> Result<Json<EventResponse>, ApiError> {
        let detail = self
            .events
            .get_detail(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("event {id} not found")))?;
        Ok(Json(Self::to_response(detail)))
    }

    /// Only the creator may modify or delete an event.
    async fn require_creator(&self, id: i32, user_id: &str) -> Result<(), ApiError> {
        let event = self
            .events
            .get(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("event {id} not found")))?;

        if event.creator_id != user_id {
            return Err(ApiError::forbidden("only the creator may modify this event"));
        }

        Ok(())
    }
}

#[OpenApi(prefix_path = "/events")]
impl EventsApi {
    /// List events ordered by date and start time, optionally filtered by
    /// responsible name, place name or module name
    #[oai(path = "/", method = "get", tag = "EventTags::Events")]
    async fn list(
        &self,
        responsible: Query<Option<String>>,
        place: Query<Option<String>>,
        module: Query<Option<String>>,
    ) -> Result<Json<Vec<EventSummary>>, ApiError> {
        let filters = EventFilters {
            responsible: responsible.0,
            place: place.0,
            module: module.0,
        };

        let rows = self.events.list(&filters).await?;

        Ok(Json(
            rows.into_iter()
                .map(|(event, modules)| EventSummary {
                    id: event.id,
                    title: event.title,
                    date: event.date,
                    start_time: event.start_time,
                    end_time: event.end_time,
                    place_id: event.place_id,
                    responsible_id: event.responsible_id,
                    modules: modules.into_iter().map(|m| m.name).collect(),
                })
                .collect(),
        ))
    }

    /// Calendar feed of all events
    #[oai(path = "/calendar", method = "get", tag = "EventTags::Events")]
    async fn calendar(&self) -> Result<Json<Vec<CalendarEntry>>, ApiError> {
        let rows = self.events.list(&EventFilters::default()).await?;

        Ok(Json(
            rows.into_iter()
                .map(|(event, _)| CalendarEntry {
                    title: event.title,
                    start: format!("{}T{}", event.date, event.start_time),
                    end: format!("{}T{}", event.date, event.end_time),
                    url: format!("/api/events/{}", event.id),
                })
                .collect(),
        ))
    }

    /// Fetch one event with its resolved references
    #[oai(path = "/:id", method = "get", tag = "EventTags::Events")]
    async fn get(&self, id: Path<i32>) -> Result<Json<EventResponse>, ApiError> {
        self.detail_response(id.0).await
    }

    /// Create an event. Responsible, place and modules are referenced by
    /// free-text names; the submission is rejected as a whole if it overlaps
    /// an existing event at the same place and date.
    #[oai(path = "/", method = "post", tag = "EventTags::Events")]
    async fn create(
        &self,
        auth: BearerAuth,
        body: Json<EventRequest>,
    ) -> Result<Json<EventResponse>, ApiError> {
        let claims = authenticate(&self.tokens, &auth)?;

        let created = self
            .form
            .create(Self::submission(body.0), &claims.sub)
            .await?;

        self.detail_response(created.id).await
    }

    /// Update an event through the same validation path as creation; the
    /// event's own id is excluded from the overlap check
    #[oai(path = "/:id", method = "put", tag = "EventTags::Events")]
    async fn update(
        &self,
        auth: BearerAuth,
        id: Path<i32>,
        body: Json<EventRequest>,
    ) -> Result<Json<EventResponse>, ApiError> {
        let claims = authenticate(&self.tokens, &auth)?;
        self.require_creator(id.0, &claims.sub).await?;

        let updated = self.form.update(id.0, Self::submission(body.0)).await?;

        self.detail_response(updated.id).await
    }

    /// Delete an event
    #[oai(path = "/:id", method = "delete", tag = "EventTags::Events")]
    async fn delete(
        &self,
        auth: BearerAuth,
        id: Path<i32>,
    ) -> Result<Json<MessageResponse>, ApiError> {
        let claims = authenticate(&self.tokens, &auth)?;
        self.require_creator(id.0, &claims.sub).await?;

        self.events.delete(id.0).await?;
        Ok(Json(MessageResponse {
            message: "event deleted".to_string(),
        }))
    }
}
