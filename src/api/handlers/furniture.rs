use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};

use crate::api::errors::ApiError;
use crate::api::extract::{query_value, JsonBody};
use crate::api::middleware::input_sanitization::rule_sets::{
    FURNITURE_CREATE, FURNITURE_LIST, FURNITURE_SEARCH, FURNITURE_TRACK_VIEW,
};
use crate::api::response::{ApiResponse, MessageResponse};
use crate::api::router::AppState;
use crate::application::dto::{
    CreatedId, FurnitureListQuery, FurnitureSearchQuery, ItemRequest, NewFurnitureRequest,
};
use crate::domain::authorization::Identity;
use crate::domain::entities::FurnitureItem;

/// GET /api/furniture
#[utoipa::path(
    get,
    path = "/api/furniture",
    tag = "furniture",
    params(FurnitureListQuery),
    responses(
        (status = 200, description = "Catalog items matching the filters", body = ApiResponse<Vec<FurnitureItem>>),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn list_furniture_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<FurnitureItem>>>, ApiError> {
    let filter: FurnitureListQuery =
        state.validator.validate(&FURNITURE_LIST, &query_value(params))?;
    Ok(ApiResponse::data(state.furniture.list(filter).await?))
}

/// GET /api/furniture/featured
#[utoipa::path(
    get,
    path = "/api/furniture/featured",
    tag = "furniture",
    responses((status = 200, description = "Featured items", body = ApiResponse<Vec<FurnitureItem>>))
)]
pub async fn featured_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<FurnitureItem>>>, ApiError> {
    Ok(ApiResponse::data(state.furniture.featured().await?))
}

/// GET /api/furniture/search?q=..
#[utoipa::path(
    get,
    path = "/api/furniture/search",
    tag = "furniture",
    params(FurnitureSearchQuery),
    responses(
        (status = 200, description = "Items whose name, description or tags contain the query", body = ApiResponse<Vec<FurnitureItem>>),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn search_furniture_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<FurnitureItem>>>, ApiError> {
    let query: FurnitureSearchQuery =
        state.validator.validate(&FURNITURE_SEARCH, &query_value(params))?;
    Ok(ApiResponse::data(state.furniture.search(&query.q).await?))
}

/// GET /api/furniture/room/{roomType}
#[utoipa::path(
    get,
    path = "/api/furniture/room/{roomType}",
    tag = "furniture",
    params(("roomType" = String, Path, description = "Room type, e.g. living_room")),
    responses((status = 200, description = "Items for the room", body = ApiResponse<Vec<FurnitureItem>>))
)]
pub async fn by_room_handler(
    State(state): State<AppState>,
    Path(room_type): Path<String>,
) -> Result<Json<ApiResponse<Vec<FurnitureItem>>>, ApiError> {
    state.validator.validate_path_id(&room_type, "roomType")?;
    Ok(ApiResponse::data(state.furniture.by_room(&room_type).await?))
}

/// GET /api/furniture/{id}
#[utoipa::path(
    get,
    path = "/api/furniture/{id}",
    tag = "furniture",
    params(("id" = String, Path, description = "Furniture item id")),
    responses(
        (status = 200, description = "Catalog item", body = ApiResponse<FurnitureItem>),
        (status = 404, description = "Item not found")
    )
)]
pub async fn get_furniture_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FurnitureItem>>, ApiError> {
    state.validator.validate_path_id(&id, "id")?;
    Ok(ApiResponse::data(state.furniture.get(&id).await?))
}

/// POST /api/furniture
#[utoipa::path(
    post,
    path = "/api/furniture",
    tag = "furniture",
    security(("bearer_auth" = [])),
    request_body = NewFurnitureRequest,
    responses(
        (status = 201, description = "Item added to the catalog", body = ApiResponse<CreatedId>),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_furniture_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<ApiResponse<CreatedId>>), ApiError> {
    let request: NewFurnitureRequest = state.validator.validate(&FURNITURE_CREATE, &body)?;
    let id = state.furniture.create(&caller.uid, request).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("Furniture item created", CreatedId { id }),
    ))
}

/// GET /api/furniture/user/recently-viewed
#[utoipa::path(
    get,
    path = "/api/furniture/user/recently-viewed",
    tag = "furniture",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Most recently viewed items", body = ApiResponse<Vec<FurnitureItem>>))
)]
pub async fn recently_viewed_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
) -> Result<Json<ApiResponse<Vec<FurnitureItem>>>, ApiError> {
    Ok(ApiResponse::data(
        state.furniture.recently_viewed(&caller.uid).await?,
    ))
}

/// POST /api/furniture/user/track-view
#[utoipa::path(
    post,
    path = "/api/furniture/user/track-view",
    tag = "furniture",
    security(("bearer_auth" = [])),
    request_body = ItemRequest,
    responses(
        (status = 200, description = "View recorded", body = MessageResponse),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn track_view_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    JsonBody(body): JsonBody,
) -> Result<Json<MessageResponse>, ApiError> {
    let request: ItemRequest = state.validator.validate(&FURNITURE_TRACK_VIEW, &body)?;
    state
        .furniture
        .track_view(&caller.uid, &request.item_id)
        .await?;
    Ok(MessageResponse::new("View tracked"))
}
