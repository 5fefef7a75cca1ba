use std::sync::Arc;

use poem_openapi::{
    param::{Path, Query},
    payload::Json,
    OpenApi, Tags,
};

use crate::api::{authenticate, BearerAuth};
use crate::errors::ApiError;
use crate::services::{EmployeeForm, EmployeeSubmission, TokenService};
use crate::stores::EmployeeStore;
use crate::types::db::{department, employee};
use crate::types::dto::common::MessageResponse;
use crate::types::dto::employee::{EmployeeRequest, EmployeeResponse};

/// Employee directory endpoints
pub struct EmployeesApi {
    form: EmployeeForm,
    employees: Arc<EmployeeStore>,
    tokens: Arc<TokenService>,
}

/// API tags for employee endpoints
#[derive(Tags)]
enum EmployeeTags {
    /// Employee directory
    Employees,
}

impl EmployeesApi {
    pub fn new(form: EmployeeForm, employees: Arc<EmployeeStore>, tokens: Arc<TokenService>) -> Self {
        Self {
            form,
            employees,
            tokens,
        }
    }

    fn to_response(
        employee: employee::Model,
        department: Option<department::Model>,
    ) -> EmployeeResponse {
        EmployeeResponse {
            id: employee.id,
            first_name: employee.first_name,
            last_name: employee.last_name,
            department_id: employee.department_id,
            department_name: department.map(|d| d.name).unwrap_or_default(),
            phone: employee.phone,
            email: employee.email,
            notes: employee.notes,
        }
    }

    fn submission(body: EmployeeRequest) -> EmployeeSubmission {
        EmployeeSubmission {
            first_name: body.first_name,
            last_name: body.last_name,
            department_name: body.department_name,
            phone: body.phone,
            email: body.email,
            notes: body.notes,
        }
    }
}

#[OpenApi(prefix_path = "/employees")]
impl EmployeesApi {
    /// List employees, optionally filtered by a name substring and by
    /// department name
    #[oai(path = "/", method = "get", tag = "EmployeeTags::Employees")]
    async fn list(
        &self,
        search: Query<Option<String>>,
        department: Query<Option<String>>,
    ) -> Result<Json<Vec<EmployeeResponse>>, ApiError> {
        let rows = self
            .employees
            .list(search.0.as_deref(), department.0.as_deref())
            .await?;

        Ok(Json(
            rows.into_iter()
                .map(|(employee, department)| Self::to_response(employee, department))
                .collect(),
        ))
    }

    /// Fetch one employee
    #[oai(path = "/:id", method = "get", tag = "EmployeeTags::Employees")]
    async fn get(&self, id: Path<i32>) -> Result<Json<EmployeeResponse>, ApiError> {
        let (employee, department) = self
            .employees
            .get(id.0)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("employee {} not found", id.0)))?;

        Ok(Json(Self::to_response(employee, department)))
    }

    /// Create an employee; the department is referenced by name
    #[oai(path = "/", method = "post", tag = "EmployeeTags::Employees")]
    async fn create(
        &self,
        auth: BearerAuth,
        body: Json<EmployeeRequest>,
    ) -> Result<Json<EmployeeResponse>, ApiError> {
        authenticate(&self.tokens, &auth)?;

        let created = self.form.create(Self::submission(body.0)).await?;
        let (employee, department) = self
            .employees
            .get(created.id)
            .await?
            .ok_or_else(|| ApiError::internal("employee vanished after insert"))?;

        Ok(Json(Self::to_response(employee, department)))
    }

    /// Update an employee through the same validation path as creation, with
    /// the row itself excluded from the duplicate-name check
    #[oai(path = "/:id", method = "put", tag = "EmployeeTags::Employees")]
    async fn update(
        &self,
        auth: BearerAuth,
        id: Path<i32>,
        body: Json<EmployeeRequest>,
    ) -> Result<Json<EmployeeResponse>, ApiError> {
        authenticate(&self.tokens, &auth)?;

        let updated = self.form.update(id.0, Self::submission(body.0)).await?;
        let (employee, department) = self
            .employees
            .get(updated.id)
            .await?
            .ok_or_else(|| ApiError::internal("employee vanished after update"))?;

        Ok(Json(Self::to_response(employee, department)))
    }

    /// Delete an employee; blocked while they are responsible for events
    #[oai(path = "/:id", method = "delete", tag = "EmployeeTags::Employees")]
    async fn delete(
        &self,
        auth: BearerAuth,
        id: Path<i32>,
    ) -> Result<Json<MessageResponse>, ApiError> {
        authenticate(&self.tokens, &auth)?;
        self.employees.delete(id.0).await?;
        Ok(Json(MessageResponse {
            message: "employee deleted".to_string(),
        }))
    }
}
