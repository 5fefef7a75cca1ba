use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};

use crate::errors::InternalError;
use crate::stores::EventStore;

/// Half-open interval overlap test: `[start, end)` against
/// `[other_start, other_end)`. Two ranges do NOT overlap exactly when one
/// ends before (or at the instant) the other starts, so a shared boundary is
/// not a conflict.
pub fn overlaps(
    start: NaiveTime,
    end: NaiveTime,
    other_start: NaiveTime,
    other_end: NaiveTime,
) -> bool {
    !(start >= other_end || end <= other_start)
}

/// Decides whether a candidate event collides with an existing event at the
/// same place and date.
///
/// This is a plain read-then-decide check with no locking: two overlapping
/// submissions racing each other can both pass. Accepted for a low-traffic
/// internal tool.
pub struct ScheduleConflictChecker {
    events: Arc<EventStore>,
}

impl ScheduleConflictChecker {
    pub fn new(events: Arc<EventStore>) -> Self {
        Self { events }
    }

    /// Returns the title of the first conflicting event, if any.
    /// `exclude` removes the event being edited from the candidate set so an
    /// event never conflicts with itself.
    pub async fn check(
        &self,
        place_id: i32,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        exclude: Option<i32>,
    ) -> Result<Option<String>, InternalError> {
        let candidates = self.events.overlap_candidates(place_id, date, exclude).await?;

        Ok(candidates
            .into_iter()
            .find(|candidate| overlaps(start, end, candidate.start_time, candidate.end_time))
            .map(|candidate| candidate.title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn contained_interval_overlaps() {
        assert!(overlaps(t(10, 30), t(11, 0), t(10, 0), t(12, 0)));
    }

    #[test]
    fn straddling_intervals_overlap() {
        // starts inside, ends after
        assert!(overlaps(t(11, 0), t(13, 0), t(10, 0), t(12, 0)));
        // starts before, ends inside
        assert!(overlaps(t(9, 0), t(10, 30), t(10, 0), t(12, 0)));
        // fully covers
        assert!(overlaps(t(9, 0), t(13, 0), t(10, 0), t(12, 0)));
    }

    #[test]
    fn identical_intervals_overlap() {
        assert!(overlaps(t(10, 0), t(12, 0), t(10, 0), t(12, 0)));
    }

    #[test]
    fn disjoint_intervals_do_not_overlap() {
        assert!(!overlaps(t(8, 0), t(9, 0), t(10, 0), t(12, 0)));
        assert!(!overlaps(t(13, 0), t(14, 0), t(10, 0), t(12, 0)));
    }

    #[test]
    fn touching_boundaries_do_not_overlap() {
        // new event starts exactly when the existing one ends
        assert!(!overlaps(t(12, 0), t(13, 0), t(10, 0), t(12, 0)));
        // new event ends exactly when the existing one starts
        assert!(!overlaps(t(9, 0), t(10, 0), t(10, 0), t(12, 0)));
    }
}
