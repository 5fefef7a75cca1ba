use std::sync::Arc;

use poem_openapi::{param::Path, payload::Json, OpenApi, Tags};

use crate::api::{authenticate, BearerAuth};
use crate::errors::{ApiError, SubmissionError, ValidationError};
use crate::services::resolver::require;
use crate::services::TokenService;
use crate::stores::{DepartmentStore, ModuleStore, PlaceStore};
use crate::types::dto::common::MessageResponse;
use crate::types::dto::directory::{CreateNamedRequest, NamedResponse};

/// Reference data endpoints: departments, places and modules.
/// These rows are shared lookup targets; event and employee submissions never
/// create them implicitly.
pub struct DirectoryApi {
    departments: Arc<DepartmentStore>,
    places: Arc<PlaceStore>,
    modules: Arc<ModuleStore>,
    tokens: Arc<TokenService>,
}

/// API tags for directory endpoints
#[derive(Tags)]
enum DirectoryTags {
    /// Shared reference data
    Directory,
}

impl DirectoryApi {
    pub fn new(
        departments: Arc<DepartmentStore>,
        places: Arc<PlaceStore>,
        modules: Arc<ModuleStore>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            departments,
            places,
            modules,
            tokens,
        }
    }

    fn required_name(body: &CreateNamedRequest) -> Result<&str, ApiError> {
        require(&body.name)
            .map_err(|e| SubmissionError::field("name", e).into())
    }
}

#[OpenApi(prefix_path = "/directory")]
impl DirectoryApi {
    /// List all departments
    #[oai(path = "/departments", method = "get", tag = "DirectoryTags::Directory")]
    async fn list_departments(&self) -> Result<Json<Vec<NamedResponse>>, ApiError> {
        let rows = self.departments.list().await?;
        Ok(Json(
            rows.into_iter()
                .map(|d| NamedResponse { id: d.id, name: d.name })
                .collect(),
        ))
    }

    /// Create a department (name must be unique)
    #[oai(path = "/departments", method = "post", tag = "DirectoryTags::Directory")]
    async fn create_department(
        &self,
        auth: BearerAuth,
        body: Json<CreateNamedRequest>,
    ) -> Result<Json<NamedResponse>, ApiError> {
        authenticate(&self.tokens, &auth)?;
        let name = Self::required_name(&body.0)?;

        if !self.departments.find_by_name_ci(name).await?.is_empty() {
            return Err(SubmissionError::form(ValidationError::DuplicateEntity(
                format!("a department named '{name}' already exists"),
            ))
            .into());
        }

        let created = self.departments.create(name).await?;
        Ok(Json(NamedResponse {
            id: created.id,
            name: created.name,
        }))
    }

    /// Delete a department; cascades to its employees unless an event still
    /// references one of them
    #[oai(path = "/departments/:id", method = "delete", tag = "DirectoryTags::Directory")]
    async fn delete_department(
        &self,
        auth: BearerAuth,
        id: Path<i32>,
    ) -> Result<Json<MessageResponse>, ApiError> {
        authenticate(&self.tokens, &auth)?;
        self.departments.delete(id.0).await?;
        Ok(Json(MessageResponse {
            message: "department deleted".to_string(),
        }))
    }

    /// List all places
    #[oai(path = "/places", method = "get", tag = "DirectoryTags::Directory")]
    async fn list_places(&self) -> Result<Json<Vec<NamedResponse>>, ApiError> {
        let rows = self.places.list().await?;
        Ok(Json(
            rows.into_iter()
                .map(|p| NamedResponse { id: p.id, name: p.name })
                .collect(),
        ))
    }

    /// Create a place. Place names are not forced unique; a duplicate name
    /// will surface as an ambiguity when events reference it.
    #[oai(path = "/places", method = "post", tag = "DirectoryTags::Directory")]
    async fn create_place(
        &self,
        auth: BearerAuth,
        body: Json<CreateNamedRequest>,
    ) -> Result<Json<NamedResponse>, ApiError> {
        authenticate(&self.tokens, &auth)?;
        let name = Self::required_name(&body.0)?;

        let created = self.places.create(name).await?;
        Ok(Json(NamedResponse {
            id: created.id,
            name: created.name,
        }))
    }

    /// Delete a place; blocked while events are scheduled there
    #[oai(path = "/places/:id", method = "delete", tag = "DirectoryTags::Directory")]
    async fn delete_place(
        &self,
        auth: BearerAuth,
        id: Path<i32>,
    ) -> Result<Json<MessageResponse>, ApiError> {
        authenticate(&self.tokens, &auth)?;
        self.places.delete(id.0).await?;
        Ok(Json(MessageResponse {
            message: "place deleted".to_string(),
        }))
    }

    /// List all modules
    #[oai(path = "/modules", method = "get", tag = "DirectoryTags::Directory")]
    async fn list_modules(&self) -> Result<Json<Vec<NamedResponse>>, ApiError> {
        let rows = self.modules.list().await?;
        Ok(Json(
            rows.into_iter()
                .map(|m| NamedResponse { id: m.id, name: m.name })
                .collect(),
        ))
    }

    /// Create a module (name must be unique)
    #[oai(path = "/modules", method = "post", tag = "DirectoryTags::Directory")]
    async fn create_module(
        &self,
        auth: BearerAuth,
        body: Json<CreateNamedRequest>,
    ) -> Result<Json<NamedResponse>, ApiError> {
        authenticate(&self.tokens, &auth)?;
        let name = Self::required_name(&body.0)?;

        if !self.modules.find_by_name_ci(name).await?.is_empty() {
            return Err(SubmissionError::form(ValidationError::DuplicateEntity(
                format!("a module named '{name}' already exists"),
            ))
            .into());
        }

        let created = self.modules.create(name).await?;
        Ok(Json(NamedResponse {
            id: created.id,
            name: created.name,
        }))
    }

    /// Delete a module; its event associations are removed with it
    #[oai(path = "/modules/:id", method = "delete", tag = "DirectoryTags::Directory")]
    async fn delete_module(
        &self,
        auth: BearerAuth,
        id: Path<i32>,
    ) -> Result<Json<MessageResponse>, ApiError> {
        authenticate(&self.tokens, &auth)?;
        self.modules.delete(id.0).await?;
        Ok(Json(MessageResponse {
            message: "module deleted".to_string(),
        }))
    }
}
