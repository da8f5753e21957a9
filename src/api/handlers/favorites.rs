use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::errors::ApiError;
use crate::api::extract::JsonBody;
use crate::api::middleware::input_sanitization::rule_sets::FAVORITE_ADD;
use crate::api::response::{ApiResponse, MessageResponse};
use crate::api::router::AppState;
use crate::application::dto::ItemRequest;
use crate::domain::authorization::Identity;
use crate::domain::entities::FurnitureItem;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteStatus {
    pub is_favorite: bool,
}

/// GET /api/favorites
#[utoipa::path(
    get,
    path = "/api/favorites",
    tag = "favorites",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Favorited catalog items, newest first", body = ApiResponse<Vec<FurnitureItem>>))
)]
pub async fn list_favorites_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
) -> Result<Json<ApiResponse<Vec<FurnitureItem>>>, ApiError> {
    Ok(ApiResponse::data(state.favorites.list(&caller.uid).await?))
}

/// POST /api/favorites
#[utoipa::path(
    post,
    path = "/api/favorites",
    tag = "favorites",
    security(("bearer_auth" = [])),
    request_body = ItemRequest,
    responses(
        (status = 200, description = "Added to favorites", body = MessageResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn add_favorite_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    JsonBody(body): JsonBody,
) -> Result<Json<MessageResponse>, ApiError> {
    let request: ItemRequest = state.validator.validate(&FAVORITE_ADD, &body)?;
    state.favorites.add(&caller.uid, &request.item_id).await?;
    Ok(MessageResponse::new("Added to favorites"))
}

/// DELETE /api/favorites/{itemId}
#[utoipa::path(
    delete,
    path = "/api/favorites/{itemId}",
    tag = "favorites",
    security(("bearer_auth" = [])),
    params(("itemId" = String, Path, description = "Furniture item id")),
    responses((status = 200, description = "Removed from favorites", body = MessageResponse))
)]
pub async fn remove_favorite_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(item_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.validator.validate_path_id(&item_id, "itemId")?;
    state.favorites.remove(&caller.uid, &item_id).await?;
    Ok(MessageResponse::new("Removed from favorites"))
}

/// GET /api/favorites/check/{itemId}
#[utoipa::path(
    get,
    path = "/api/favorites/check/{itemId}",
    tag = "favorites",
    security(("bearer_auth" = [])),
    params(("itemId" = String, Path, description = "Furniture item id")),
    responses((status = 200, description = "Favorite flag", body = ApiResponse<FavoriteStatus>))
)]
pub async fn check_favorite_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    Path(item_id): Path<String>,
) -> Result<Json<ApiResponse<FavoriteStatus>>, ApiError> {
    state.validator.validate_path_id(&item_id, "itemId")?;
    let is_favorite = state.favorites.is_favorite(&caller.uid, &item_id).await?;
    Ok(ApiResponse::data(FavoriteStatus { is_favorite }))
}
