use chrono::{NaiveDate, NaiveTime};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType,
    LoaderTrait, ModelTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionTrait,
};

use crate::errors::InternalError;
use crate::stores::contains_ci;
use crate::types::db::{employee, event, event_module, module, place};

/// Field values of an event submission after validation: every free-text
/// reference already resolved to a row id.
#[derive(Debug, Clone)]
pub struct EventData {
    pub title: String,
    pub description: String,
    pub responsible_id: i32,
    pub place_id: i32,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Optional substring filters for the event list
#[derive(Debug, Clone, Default)]
pub struct EventFilters {
    /// Matches first OR last name of the responsible employee
    pub responsible: Option<String>,
    pub place: Option<String>,
    pub module: Option<String>,
}

/// An event with its resolved references, for detail views
#[derive(Debug)]
pub struct EventDetail {
    pub event: event::Model,
    pub responsible: employee::Model,
    pub place: place::Model,
    pub modules: Vec<module::Model>,
}

/// EventStore manages scheduled events and their module associations
pub struct EventStore {
    db: DatabaseConnection,
}

impl EventStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// List events ordered by date then start time, each with its module set.
    pub async fn list(
        &self,
        filters: &EventFilters,
    ) -> Result<Vec<(event::Model, Vec<module::Model>)>, InternalError> {
        let mut query = event::Entity::find()
            .order_by_asc(event::Column::Date)
            .order_by_asc(event::Column::StartTime);

        if let Some(term) = filters.responsible.as_deref() {
            query = query
                .join(JoinType::InnerJoin, event::Relation::Responsible.def())
                .filter(
                    Condition::any()
                        .add(contains_ci(
                            (employee::Entity, employee::Column::FirstName),
                            term,
                        ))
                        .add(contains_ci(
                            (employee::Entity, employee::Column::LastName),
                            term,
                        )),
                );
        }

        if let Some(term) = filters.place.as_deref() {
            query = query
                .join(JoinType::InnerJoin, event::Relation::Place.def())
                .filter(contains_ci((place::Entity, place::Column::Name), term));
        }

        if let Some(term) = filters.module.as_deref() {
            query = query
                .join(JoinType::InnerJoin, event::Relation::EventModule.def())
                .join(JoinType::InnerJoin, event_module::Relation::Module.def())
                .filter(contains_ci((module::Entity, module::Column::Name), term))
                .distinct();
        }

        let events = query
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list_events", e))?;

        let modules = events
            .load_many_to_many(module::Entity, event_module::Entity, &self.db)
            .await
            .map_err(|e| InternalError::database("load_event_modules", e))?;

        Ok(events.into_iter().zip(modules).collect())
    }

    pub async fn get_detail(&self, id: i32) -> Result<Option<EventDetail>, InternalError> {
        let Some(event) = event::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("get_event", e))?
        else {
            return Ok(None);
        };

        let responsible = event
            .find_related(employee::Entity)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("get_event_responsible", e))?
            .ok_or_else(|| InternalError::entity_not_found("employee", event.responsible_id))?;

        let place = event
            .find_related(place::Entity)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("get_event_place", e))?
            .ok_or_else(|| InternalError::entity_not_found("place", event.place_id))?;

        let modules = event
            .find_related(module::Entity)
            .order_by_asc(module::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("get_event_modules", e))?;

        Ok(Some(EventDetail {
            event,
            responsible,
            place,
            modules,
        }))
    }

    pub async fn get(&self, id: i32) -> Result<Option<event::Model>, InternalError> {
        event::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("get_event", e))
    }

    /// Existing events at the same place and date, the candidate set of the
    /// overlap check. `exclude` removes the event being edited.
    pub async fn overlap_candidates(
        &self,
        place_id: i32,
        date: NaiveDate,
        exclude: Option<i32>,
    ) -> Result<Vec<event::Model>, InternalError> {
        let mut query = event::Entity::find()
            .filter(event::Column::PlaceId.eq(place_id))
            .filter(event::Column::Date.eq(date));

        if let Some(id) = exclude {
            query = query.filter(event::Column::Id.ne(id));
        }

        query
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("overlap_candidates", e))
    }

    /// Insert the event row and its module associations in one transaction.
    pub async fn create(
        &self,
        data: EventData,
        creator_id: &str,
        module_ids: &[i32],
    ) -> Result<event::Model, InternalError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| InternalError::database("begin_create_event", e))?;

        let row = event::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            title: Set(data.title),
            description: Set(data.description),
            responsible_id: Set(data.responsible_id),
            place_id: Set(data.place_id),
            date: Set(data.date),
            start_time: Set(data.start_time),
            end_time: Set(data.end_time),
            creator_id: Set(creator_id.to_string()),
        };

        let event = row
            .insert(&txn)
            .await
            .map_err(|e| InternalError::database("insert_event", e))?;

        Self::replace_modules(&txn, event.id, module_ids).await?;

        txn.commit()
            .await
            .map_err(|e| InternalError::database("commit_create_event", e))?;

        Ok(event)
    }

    /// Update the event row and replace its module set in one transaction.
    /// The module associations are replaced wholesale, never merged.
    pub async fn update(
        &self,
        id: i32,
        data: EventData,
        module_ids: &[i32],
    ) -> Result<event::Model, InternalError> {
        let existing = event::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("get_event", e))?
            .ok_or_else(|| InternalError::entity_not_found("event", id))?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| InternalError::database("begin_update_event", e))?;

        let mut row: event::ActiveModel = existing.into();
        row.title = Set(data.title);
        row.description = Set(data.description);
        row.responsible_id = Set(data.responsible_id);
        row.place_id = Set(data.place_id);
        row.date = Set(data.date);
        row.start_time = Set(data.start_time);
        row.end_time = Set(data.end_time);

        let event = row
            .update(&txn)
            .await
            .map_err(|e| InternalError::database("update_event", e))?;

        Self::replace_modules(&txn, event.id, module_ids).await?;

        txn.commit()
            .await
            .map_err(|e| InternalError::database("commit_update_event", e))?;

        Ok(event)
    }

    pub async fn delete(&self, id: i32) -> Result<(), InternalError> {
        let result = event::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("delete_event", e))?;

        if result.rows_affected == 0 {
            return Err(InternalError::entity_not_found("event", id));
        }

        Ok(())
    }

    async fn replace_modules(
        txn: &sea_orm::DatabaseTransaction,
        event_id: i32,
        module_ids: &[i32],
    ) -> Result<(), InternalError> {
        event_module::Entity::delete_many()
            .filter(event_module::Column::EventId.eq(event_id))
            .exec(txn)
            .await
            .map_err(|e| InternalError::database("clear_event_modules", e))?;

        let links: Vec<event_module::ActiveModel> = module_ids
            .iter()
            .map(|module_id| event_module::ActiveModel {
                event_id: Set(event_id),
                module_id: Set(*module_id),
            })
            .collect();

        if !links.is_empty() {
            event_module::Entity::insert_many(links)
                .exec(txn)
                .await
                .map_err(|e| InternalError::database("insert_event_modules", e))?;
        }

        Ok(())
    }
}
