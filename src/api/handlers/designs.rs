use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};

use crate::api::errors::ApiError;
use crate::api::extract::JsonBody;
use crate::api::middleware::input_sanitization::rule_sets::{
    DESIGN_CREATE, DESIGN_OBJECT_ADD, DESIGN_OBJECT_UPDATE, DESIGN_UPDATE,
};
use crate::api::response::{ApiResponse, MessageResponse};
use crate::api::router::AppState;
use crate::application::dto::{AddDesignObjectRequest, CreatedId, DesignInput};
use crate::domain::authorization::Identity;
use crate::domain::entities::{Design, PlacedObject, TransformPatch};

/// GET /api/designs
#[utoipa::path(
    get,
    path = "/api/designs",
    tag = "designs",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Designs owned by the caller", body = ApiResponse<Vec<Design>>))
)]
pub async fn list_designs_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
) -> Result<Json<ApiResponse<Vec<Design>>>, ApiError> {
    Ok(ApiResponse::data(state.designs.list(&caller.uid).await?))
}

/// POST /api/designs
/// `canvasData` is size-capped and sanitized before it is stored
#[utoipa::path(
    post,
    path = "/api/designs",
    tag = "designs",
    security(("bearer_auth" = [])),
    request_body = DesignInput,
    responses(
        (status = 201, description = "Design created", body = ApiResponse<CreatedId>),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Caller cannot access the project"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn create_design_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<ApiResponse<CreatedId>>), ApiError> {
    let input: DesignInput = state.validator.validate(&DESIGN_CREATE, &body)?;
    let id = state.designs.create(&caller.uid, input).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("Design created", CreatedId { id }),
    ))
}

/// GET /api/designs/project/{projectId}
#[utoipa::path(
    get,
    path = "/api/designs/project/{projectId}",
    tag = "designs",
    security(("bearer_auth" = [])),
    params(("projectId" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Designs in the project", body = ApiResponse<Vec<Design>>),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn designs_by_project_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(project_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Design>>>, ApiError> {
    state.validator.validate_path_id(&project_id, "projectId")?;
    Ok(ApiResponse::data(
        state.designs.by_project(&caller.uid, &project_id).await?,
    ))
}

/// GET /api/designs/{designId}
#[utoipa::path(
    get,
    path = "/api/designs/{designId}",
    tag = "designs",
    security(("bearer_auth" = [])),
    params(("designId" = String, Path, description = "Design id")),
    responses(
        (status = 200, description = "Design", body = ApiResponse<Design>),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Design not found")
    )
)]
pub async fn get_design_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(design_id): Path<String>,
) -> Result<Json<ApiResponse<Design>>, ApiError> {
    state.validator.validate_path_id(&design_id, "designId")?;
    Ok(ApiResponse::data(
        state.designs.get(&caller.uid, &design_id).await?,
    ))
}

/// PUT /api/designs/{designId}
#[utoipa::path(
    put,
    path = "/api/designs/{designId}",
    tag = "designs",
    security(("bearer_auth" = [])),
    params(("designId" = String, Path, description = "Design id")),
    request_body = DesignInput,
    responses(
        (status = 200, description = "Design updated", body = ApiResponse<Design>),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Design not found")
    )
)]
pub async fn update_design_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(design_id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<ApiResponse<Design>>, ApiError> {
    state.validator.validate_path_id(&design_id, "designId")?;
    let input: DesignInput = state.validator.validate(&DESIGN_UPDATE, &body)?;
    let design = state.designs.update(&caller.uid, &design_id, input).await?;
    Ok(ApiResponse::with_message("Design updated", design))
}

/// DELETE /api/designs/{designId}
#[utoipa::path(
    delete,
    path = "/api/designs/{designId}",
    tag = "designs",
    security(("bearer_auth" = [])),
    params(("designId" = String, Path, description = "Design id")),
    responses(
        (status = 200, description = "Design deleted", body = MessageResponse),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Design not found")
    )
)]
pub async fn delete_design_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(design_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.validator.validate_path_id(&design_id, "designId")?;
    state.designs.delete(&caller.uid, &design_id).await?;
    Ok(MessageResponse::new("Design deleted"))
}

/// POST /api/designs/{designId}/objects
#[utoipa::path(
    post,
    path = "/api/designs/{designId}/objects",
    tag = "designs",
    security(("bearer_auth" = [])),
    params(("designId" = String, Path, description = "Design id")),
    request_body = AddDesignObjectRequest,
    responses(
        (status = 201, description = "Object placed", body = ApiResponse<PlacedObject>),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Design not found")
    )
)]
pub async fn add_object_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(design_id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<ApiResponse<PlacedObject>>), ApiError> {
    state.validator.validate_path_id(&design_id, "designId")?;
    let request: AddDesignObjectRequest = state.validator.validate(&DESIGN_OBJECT_ADD, &body)?;
    let object = state
        .designs
        .add_object(&caller.uid, &design_id, request)
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("Object added to design", object),
    ))
}

/// PUT /api/designs/{designId}/objects/{objectId}
#[utoipa::path(
    put,
    path = "/api/designs/{designId}/objects/{objectId}",
    tag = "designs",
    security(("bearer_auth" = [])),
    params(
        ("designId" = String, Path, description = "Design id"),
        ("objectId" = String, Path, description = "Placed object id")
    ),
    request_body = TransformPatch,
    responses(
        (status = 200, description = "Object moved", body = ApiResponse<PlacedObject>),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Design or object not found")
    )
)]
pub async fn update_object_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path((design_id, object_id)): Path<(String, String)>,
    JsonBody(body): JsonBody,
) -> Result<Json<ApiResponse<PlacedObject>>, ApiError> {
    state.validator.validate_path_id(&design_id, "designId")?;
    state.validator.validate_path_id(&object_id, "objectId")?;
    let patch: TransformPatch = state.validator.validate(&DESIGN_OBJECT_UPDATE, &body)?;
    let object = state
        .designs
        .update_object(&caller.uid, &design_id, &object_id, patch)
        .await?;
    Ok(ApiResponse::with_message("Object updated", object))
}

/// DELETE /api/designs/{designId}/objects/{objectId}
#[utoipa::path(
    delete,
    path = "/api/designs/{designId}/objects/{objectId}",
    tag = "designs",
    security(("bearer_auth" = [])),
    params(
        ("designId" = String, Path, description = "Design id"),
        ("objectId" = String, Path, description = "Placed object id")
    ),
    responses(
        (status = 200, description = "Object removed", body = MessageResponse),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Design or object not found")
    )
)]
pub async fn remove_object_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path((design_id, object_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.validator.validate_path_id(&design_id, "designId")?;
    state.validator.validate_path_id(&object_id, "objectId")?;
    state
        .designs
        .remove_object(&caller.uid, &design_id, &object_id)
        .await?;
    Ok(MessageResponse::new("Object removed from design"))
}
