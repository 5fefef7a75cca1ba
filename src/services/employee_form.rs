use std::sync::Arc;

use crate::errors::{FormErrors, SubmissionError, ValidationError};
use crate::services::resolver::{require, Resolution};
use crate::stores::{DepartmentStore, EmployeeData, EmployeeStore};
use crate::types::db::employee;

/// Raw field values of an employee submission. The department arrives as a
/// free-text name.
#[derive(Debug, Clone)]
pub struct EmployeeSubmission {
    pub first_name: String,
    pub last_name: String,
    pub department_name: String,
    pub phone: String,
    pub email: String,
    pub notes: Option<String>,
}

/// Validates and persists employee submissions.
///
/// Two employees may never share the same (first name, last name) pair,
/// compared case-insensitively. That invariant is enforced here at
/// validation time, not by a storage constraint, and the row being edited is
/// excluded from the check.
pub struct EmployeeForm {
    employees: Arc<EmployeeStore>,
    departments: Arc<DepartmentStore>,
}

impl EmployeeForm {
    pub fn new(employees: Arc<EmployeeStore>, departments: Arc<DepartmentStore>) -> Self {
        Self {
            employees,
            departments,
        }
    }

    pub async fn create(
        &self,
        submission: EmployeeSubmission,
    ) -> Result<employee::Model, SubmissionError> {
        let data = self.validate(&submission, None).await?;
        self.employees.insert(data).await.map_err(Into::into)
    }

    pub async fn update(
        &self,
        id: i32,
        submission: EmployeeSubmission,
    ) -> Result<employee::Model, SubmissionError> {
        let data = self.validate(&submission, Some(id)).await?;
        self.employees.update(id, data).await.map_err(Into::into)
    }

    async fn validate(
        &self,
        submission: &EmployeeSubmission,
        editing: Option<i32>,
    ) -> Result<EmployeeData, SubmissionError> {
        let mut errors = FormErrors::new();

        let first_name = require(&submission.first_name);
        let last_name = require(&submission.last_name);
        if let Err(e) = &first_name {
            errors.add_field("first_name", e.clone());
        }
        if let Err(e) = &last_name {
            errors.add_field("last_name", e.clone());
        }

        if let Err(e) = require(&submission.phone) {
            errors.add_field("phone", e);
        }
        if let Err(e) = require(&submission.email) {
            errors.add_field("email", e);
        }

        let department = match require(&submission.department_name) {
            Ok(name) => {
                let matches = self.departments.find_by_name_ci(name).await?;
                match Resolution::from_matches(matches).into_field_result("department", name) {
                    Ok(department) => Some(department),
                    Err(e) => {
                        errors.add_field("department_name", e);
                        None
                    }
                }
            }
            Err(e) => {
                errors.add_field("department_name", e);
                None
            }
        };

        // Duplicate (first, last) pair blocks the whole submission
        if let (Ok(first), Ok(last)) = (&first_name, &last_name) {
            let duplicates = self.employees.count_same_name(first, last, editing).await?;
            if duplicates > 0 {
                errors.add_form(ValidationError::DuplicateEntity(format!(
                    "an employee named '{first} {last}' already exists"
                )));
            }
        }

        match (first_name, last_name, department) {
            (Ok(first), Ok(last), Some(department)) if errors.is_empty() => Ok(EmployeeData {
                first_name: first.to_string(),
                last_name: last.to_string(),
                department_id: department.id,
                phone: submission.phone.trim().to_string(),
                email: submission.email.trim().to_string(),
                notes: submission.notes.clone(),
            }),
            _ => Err(SubmissionError::Validation(errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    struct Fixture {
        form: EmployeeForm,
        employees: Arc<EmployeeStore>,
    }

    async fn setup() -> Fixture {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let departments = Arc::new(DepartmentStore::new(db.clone()));
        departments.create("IT").await.unwrap();

        let employees = Arc::new(EmployeeStore::new(db));
        Fixture {
            form: EmployeeForm::new(employees.clone(), departments),
            employees,
        }
    }

    fn submission(first: &str, last: &str, department: &str) -> EmployeeSubmission {
        EmployeeSubmission {
            first_name: first.to_string(),
            last_name: last.to_string(),
            department_name: department.to_string(),
            phone: "111222333".to_string(),
            email: format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase()),
            notes: None,
        }
    }

    fn expect_validation(result: Result<employee::Model, SubmissionError>) -> FormErrors {
        match result {
            Err(SubmissionError::Validation(errors)) => errors,
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn valid_submission_resolves_the_department() {
        let fx = setup().await;

        let employee = fx
            .form
            .create(submission("Carlos", "Lopez", "it"))
            .await
            .unwrap();

        let (_, department) = fx.employees.get(employee.id).await.unwrap().unwrap();
        assert_eq!(department.unwrap().name, "IT");
    }

    #[tokio::test]
    async fn unknown_department_is_reported_on_the_department_field() {
        let fx = setup().await;

        let errors =
            expect_validation(fx.form.create(submission("Carlos", "Lopez", "NoExiste")).await);
        assert!(errors.has_field("department_name"));
    }

    #[tokio::test]
    async fn duplicate_name_pair_blocks_the_submission() {
        let fx = setup().await;

        fx.form
            .create(submission("Juan", "Perez", "IT"))
            .await
            .unwrap();

        // different casing, same pair
        let errors = expect_validation(fx.form.create(submission("juan", "PEREZ", "IT")).await);
        let form: Vec<_> = errors.form_errors().collect();
        assert_eq!(form.len(), 1);
        assert_eq!(form[0].code(), "duplicate_entity");
    }

    #[tokio::test]
    async fn editing_an_employee_keeps_their_own_name_available() {
        let fx = setup().await;

        let juan = fx
            .form
            .create(submission("Juan", "Perez", "IT"))
            .await
            .unwrap();

        // renaming to their own name pair is not a duplicate
        let mut sub = submission("Juan", "Perez", "IT");
        sub.phone = "555555555".to_string();
        let updated = fx.form.update(juan.id, sub).await.unwrap();

        assert_eq!(updated.phone, "555555555");
    }

    #[tokio::test]
    async fn renaming_onto_another_employee_is_rejected() {
        let fx = setup().await;

        fx.form
            .create(submission("Juan", "Perez", "IT"))
            .await
            .unwrap();
        let ana = fx
            .form
            .create(submission("Ana", "Gomez", "IT"))
            .await
            .unwrap();

        let errors = expect_validation(fx.form.update(ana.id, submission("Juan", "Perez", "IT")).await);
        assert_eq!(errors.form_errors().count(), 1);
    }

    #[tokio::test]
    async fn blank_fields_are_all_reported_together() {
        let fx = setup().await;

        let errors = expect_validation(
            fx.form
                .create(EmployeeSubmission {
                    first_name: " ".to_string(),
                    last_name: String::new(),
                    department_name: String::new(),
                    phone: String::new(),
                    email: String::new(),
                    notes: None,
                })
                .await,
        );

        for field in ["first_name", "last_name", "department_name", "phone", "email"] {
            assert!(errors.has_field(field), "missing error for {field}");
        }
    }
}
