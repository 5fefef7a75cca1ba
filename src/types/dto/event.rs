use chrono::{NaiveDate, NaiveTime};
use poem_openapi::Object;

/// Submitted event fields. Responsible, place and modules are referenced by
/// free-text names and resolved against existing records before anything is
/// written.
#[derive(Object, Debug)]
pub struct EventRequest {
    /// Event title
    pub title: String,

    /// Long description
    pub description: Option<String>,

    /// First name of the responsible employee
    pub responsible_first_name: String,

    /// Last name(s) of the responsible employee
    pub responsible_last_name: String,

    /// Place name (resolved case-insensitively)
    pub place_name: String,

    /// Comma-separated module names; duplicates collapse to one
    pub module_names: String,

    /// Calendar date of the event
    pub date: NaiveDate,

    /// Start time
    pub start_time: NaiveTime,

    /// End time (must be after the start time)
    pub end_time: NaiveTime,
}

/// An event as returned by the API
#[derive(Object, Debug)]
pub struct EventResponse {
    /// Row id
    pub id: i32,

    /// Event title
    pub title: String,

    /// Long description
    pub description: String,

    /// Responsible employee id
    pub responsible_id: i32,

    /// Responsible employee full name
    pub responsible_name: String,

    /// Place id
    pub place_id: i32,

    /// Place name
    pub place_name: String,

    /// Names of the associated modules
    pub modules: Vec<String>,

    /// Calendar date of the event
    pub date: NaiveDate,

    /// Start time
    pub start_time: NaiveTime,

    /// End time
    pub end_time: NaiveTime,

    /// Id of the user who created the event
    pub creator_id: String,
}

/// Compact event row for list endpoints
#[derive(Object, Debug)]
pub struct EventSummary {
    /// Row id
    pub id: i32,

    /// Event title
    pub title: String,

    /// Calendar date of the event
    pub date: NaiveDate,

    /// Start time
    pub start_time: NaiveTime,

    /// End time
    pub end_time: NaiveTime,

    /// Place id
    pub place_id: i32,

    /// Responsible employee id
    pub responsible_id: i32,

    /// Names of the associated modules
    pub modules: Vec<String>,
}

/// Calendar feed entry (start/end as `date`T`time`)
#[derive(Object, Debug)]
pub struct CalendarEntry {
    /// Event title
    pub title: String,

    /// Start instant, `YYYY-MM-DDTHH:MM:SS`
    pub start: String,

    /// End instant, `YYYY-MM-DDTHH:MM:SS`
    pub end: String,

    /// Detail URL for the event
    pub url: String,
}
