// End-to-end exercise of the event submission pipeline: free-text references
// resolved against the directory, then the overlap check, then the atomic
// write of the event row plus its module set.

mod common;

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use staffhub_backend::errors::SubmissionError;
use staffhub_backend::services::{EventForm, EventSubmission};
use staffhub_backend::stores::{
    DepartmentStore, EmployeeData, EmployeeStore, EventFilters, EventStore, ModuleStore,
    NewUser, PlaceStore, UserStore,
};

struct World {
    form: EventForm,
    events: Arc<EventStore>,
    creator_id: String,
}

async fn setup_world() -> World {
    let db = common::setup_test_db().await;

    let department = DepartmentStore::new(db.clone())
        .create("IT")
        .await
        .expect("Failed to create department");

    EmployeeStore::new(db.clone())
        .insert(EmployeeData {
            first_name: "Juan".to_string(),
            last_name: "Perez".to_string(),
            department_id: department.id,
            phone: "123456789".to_string(),
            email: "juan.perez@example.com".to_string(),
            notes: None,
        })
        .await
        .expect("Failed to create employee");

    PlaceStore::new(db.clone())
        .create("Sala 1")
        .await
        .expect("Failed to create place");

    let modules = ModuleStore::new(db.clone());
    modules.create("Modulo A").await.expect("Failed to create module");
    modules.create("Modulo B").await.expect("Failed to create module");

    let creator = UserStore::new(db.clone(), common::TEST_PEPPER.to_string())
        .create_with_profile(NewUser {
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            phone: "600000000".to_string(),
            department: "IT".to_string(),
            password: "adminpassword".to_string(),
            security_answer_1: "rex".to_string(),
            security_answer_2: "maria".to_string(),
        })
        .await
        .expect("Failed to create user");

    let events = Arc::new(EventStore::new(db.clone()));
    let form = EventForm::new(
        Arc::new(EmployeeStore::new(db.clone())),
        Arc::new(PlaceStore::new(db.clone())),
        Arc::new(ModuleStore::new(db)),
        events.clone(),
    );

    World {
        form,
        events,
        creator_id: creator.id,
    }
}

fn submission(title: &str, start: (u32, u32), end: (u32, u32)) -> EventSubmission {
    EventSubmission {
        title: title.to_string(),
        description: Some("integration test event".to_string()),
        responsible_first_name: "Juan".to_string(),
        responsible_last_name: "Perez".to_string(),
        place_name: "Sala 1".to_string(),
        module_names: "Modulo A, Modulo B".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
    }
}

#[tokio::test]
async fn overlapping_booking_is_rejected_then_accepted_at_the_boundary() {
    let world = setup_world().await;

    // Seed: event A occupies Sala 1 on 2024-01-01 from 10:00 to 12:00
    let event_a = world
        .form
        .create(submission("Evento Test", (10, 0), (12, 0)), &world.creator_id)
        .await
        .expect("seed event should be accepted");

    // 11:00-13:00 intersects A and must be rejected, naming A
    let rejected = world
        .form
        .create(submission("Evento B", (11, 0), (13, 0)), &world.creator_id)
        .await;
    match rejected {
        Err(SubmissionError::Validation(errors)) => {
            let form_errors: Vec<_> = errors.form_errors().collect();
            assert_eq!(form_errors.len(), 1);
            assert!(form_errors[0].to_string().contains("Evento Test"));
        }
        other => panic!("expected schedule conflict, got {other:?}"),
    }

    // Nothing was written for the rejected submission
    let rows = world.events.list(&EventFilters::default()).await.unwrap();
    assert_eq!(rows.len(), 1);

    // 12:00-13:00 only touches A's boundary and is accepted
    world
        .form
        .create(submission("Evento B", (12, 0), (13, 0)), &world.creator_id)
        .await
        .expect("touching boundary must not conflict");

    // Editing A into its own window is not a self-conflict
    world
        .form
        .update(event_a.id, submission("Evento Test", (10, 0), (12, 0)))
        .await
        .expect("an event must not conflict with itself");

    let rows = world.events.list(&EventFilters::default()).await.unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn all_field_failures_surface_in_one_round_trip() {
    let world = setup_world().await;

    let mut bad = submission("Evento Roto", (10, 0), (9, 0));
    bad.responsible_first_name = "Nadie".to_string();
    bad.place_name = "Sala Fantasma".to_string();
    bad.module_names = "Modulo X".to_string();

    match world.form.create(bad, &world.creator_id).await {
        Err(SubmissionError::Validation(errors)) => {
            for field in [
                "responsible_first_name",
                "place_name",
                "module_names",
                "end_time",
            ] {
                assert!(errors.has_field(field), "missing error for {field}");
            }
        }
        other => panic!("expected validation failure, got {other:?}"),
    }

    assert!(world
        .events
        .list(&EventFilters::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn saving_an_event_replaces_its_module_set() {
    let world = setup_world().await;

    let event = world
        .form
        .create(submission("Evento Test", (10, 0), (12, 0)), &world.creator_id)
        .await
        .unwrap();

    let mut edited = submission("Evento Test", (10, 0), (12, 0));
    edited.module_names = "Modulo B".to_string();
    world.form.update(event.id, edited).await.unwrap();

    let detail = world.events.get_detail(event.id).await.unwrap().unwrap();
    let names: Vec<_> = detail.modules.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Modulo B"]);
}
