use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};

use crate::api::errors::ApiError;
use crate::api::extract::JsonBody;
use crate::api::middleware::input_sanitization::rule_sets::{
    COLLABORATION_SHARE, PROJECT_ADD_ITEM, PROJECT_CREATE, PROJECT_UPDATE,
};
use crate::api::response::{ApiResponse, MessageResponse};
use crate::api::router::AppState;
use crate::application::dto::{CreatedId, ItemRequest, ProjectInput, ShareProjectRequest};
use crate::application::use_cases::Collaborator;
use crate::domain::authorization::Identity;
use crate::domain::entities::{FurnitureItem, Project};

/// GET /api/projects
#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "projects",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Projects owned by the caller, newest first", body = ApiResponse<Vec<Project>>))
)]
pub async fn list_projects_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
) -> Result<Json<ApiResponse<Vec<Project>>>, ApiError> {
    Ok(ApiResponse::data(state.projects.list(&caller.uid).await?))
}

/// POST /api/projects
#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "projects",
    security(("bearer_auth" = [])),
    request_body = ProjectInput,
    responses(
        (status = 201, description = "Project created", body = ApiResponse<CreatedId>),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_project_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<ApiResponse<CreatedId>>), ApiError> {
    let input: ProjectInput = state.validator.validate(&PROJECT_CREATE, &body)?;
    let id = state.projects.create(&caller.uid, input).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("Project created", CreatedId { id }),
    ))
}

/// GET /api/projects/{projectId}
#[utoipa::path(
    get,
    path = "/api/projects/{projectId}",
    tag = "projects",
    security(("bearer_auth" = [])),
    params(("projectId" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project", body = ApiResponse<Project>),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn get_project_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(project_id): Path<String>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    state.validator.validate_path_id(&project_id, "projectId")?;
    Ok(ApiResponse::data(
        state.projects.get(&caller.uid, &project_id).await?,
    ))
}

/// PUT /api/projects/{projectId}
#[utoipa::path(
    put,
    path = "/api/projects/{projectId}",
    tag = "projects",
    security(("bearer_auth" = [])),
    params(("projectId" = String, Path, description = "Project id")),
    request_body = ProjectInput,
    responses(
        (status = 200, description = "Project updated", body = ApiResponse<Project>),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn update_project_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(project_id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    state.validator.validate_path_id(&project_id, "projectId")?;
    let input: ProjectInput = state.validator.validate(&PROJECT_UPDATE, &body)?;
    let project = state.projects.update(&caller.uid, &project_id, input).await?;
    Ok(ApiResponse::with_message("Project updated", project))
}

/// DELETE /api/projects/{projectId}
#[utoipa::path(
    delete,
    path = "/api/projects/{projectId}",
    tag = "projects",
    security(("bearer_auth" = [])),
    params(("projectId" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project deleted", body = MessageResponse),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn delete_project_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(project_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.validator.validate_path_id(&project_id, "projectId")?;
    state.projects.delete(&caller.uid, &project_id).await?;
    Ok(MessageResponse::new("Project deleted"))
}

/// GET /api/projects/{projectId}/items
#[utoipa::path(
    get,
    path = "/api/projects/{projectId}/items",
    tag = "projects",
    security(("bearer_auth" = [])),
    params(("projectId" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Catalog items in the project", body = ApiResponse<Vec<FurnitureItem>>),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn list_items_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(project_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<FurnitureItem>>>, ApiError> {
    state.validator.validate_path_id(&project_id, "projectId")?;
    Ok(ApiResponse::data(
        state.projects.items(&caller.uid, &project_id).await?,
    ))
}

/// POST /api/projects/{projectId}/items
#[utoipa::path(
    post,
    path = "/api/projects/{projectId}/items",
    tag = "projects",
    security(("bearer_auth" = [])),
    params(("projectId" = String, Path, description = "Project id")),
    request_body = ItemRequest,
    responses(
        (status = 200, description = "Item added", body = ApiResponse<Project>),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn add_item_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(project_id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    state.validator.validate_path_id(&project_id, "projectId")?;
    let request: ItemRequest = state.validator.validate(&PROJECT_ADD_ITEM, &body)?;
    let project = state
        .projects
        .add_item(&caller.uid, &project_id, &request.item_id)
        .await?;
    Ok(ApiResponse::with_message("Item added to project", project))
}

/// DELETE /api/projects/{projectId}/items/{itemId}
#[utoipa::path(
    delete,
    path = "/api/projects/{projectId}/items/{itemId}",
    tag = "projects",
    security(("bearer_auth" = [])),
    params(
        ("projectId" = String, Path, description = "Project id"),
        ("itemId" = String, Path, description = "Furniture item id")
    ),
    responses(
        (status = 200, description = "Item removed", body = ApiResponse<Project>),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn remove_item_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path((project_id, item_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    state.validator.validate_path_id(&project_id, "projectId")?;
    state.validator.validate_path_id(&item_id, "itemId")?;
    let project = state
        .projects
        .remove_item(&caller.uid, &project_id, &item_id)
        .await?;
    Ok(ApiResponse::with_message("Item removed from project", project))
}

/// POST /api/projects/{projectId}/share
#[utoipa::path(
    post,
    path = "/api/projects/{projectId}/share",
    tag = "projects",
    security(("bearer_auth" = [])),
    params(("projectId" = String, Path, description = "Project id")),
    request_body = ShareProjectRequest,
    responses(
        (status = 200, description = "Collaborator added", body = ApiResponse<Project>),
        (status = 400, description = "Validation failed or sharing with the owner"),
        (status = 403, description = "Only owner can share project"),
        (status = 404, description = "Project or user not found")
    )
)]
pub async fn share_project_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(project_id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    state.validator.validate_path_id(&project_id, "projectId")?;
    let request: ShareProjectRequest = state.validator.validate(&COLLABORATION_SHARE, &body)?;
    let project = state
        .projects
        .share(&caller.uid, &project_id, request)
        .await?;
    Ok(ApiResponse::with_message("Project shared successfully", project))
}

/// GET /api/projects/{projectId}/collaborators
#[utoipa::path(
    get,
    path = "/api/projects/{projectId}/collaborators",
    tag = "projects",
    security(("bearer_auth" = [])),
    params(("projectId" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Collaborator profiles", body = ApiResponse<Vec<Collaborator>>),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn collaborators_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(project_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Collaborator>>>, ApiError> {
    state.validator.validate_path_id(&project_id, "projectId")?;
    Ok(ApiResponse::data(
        state.projects.collaborators(&caller.uid, &project_id).await?,
    ))
}
