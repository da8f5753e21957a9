use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    response::Json,
    Extension,
};
use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::api::errors::ApiError;
use crate::api::extract::{query_value, JsonBody};
use crate::api::middleware::input_sanitization::rule_sets::{
    USER_BATCH, USER_BY_EMAIL, USER_SEARCH, USER_UPDATE_PREFERENCE, USER_UPDATE_PREFERENCES,
    USER_UPDATE_PROFILE,
};
use crate::api::response::{ApiResponse, MessageResponse};
use crate::api::router::AppState;
use crate::application::dto::{
    BatchUsersRequest, EmailQuery, UpdatePreferenceRequest, UpdateProfileRequest, UserSearchQuery,
};
use crate::domain::authorization::Identity;
use crate::domain::entities::{PublicProfile, UserProfile, UserStats};

#[derive(Serialize, ToSchema)]
pub struct ExistsResponse {
    pub exists: bool,
}

/// GET /api/users/profile
#[utoipa::path(
    get,
    path = "/api/users/profile",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's profile", body = ApiResponse<UserProfile>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_profile_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    Ok(ApiResponse::data(state.users.profile(&caller.uid).await?))
}

/// PUT /api/users/profile
#[utoipa::path(
    put,
    path = "/api/users/profile",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<UserProfile>),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_profile_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    JsonBody(body): JsonBody,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let request: UpdateProfileRequest = state.validator.validate(&USER_UPDATE_PROFILE, &body)?;
    let profile = state.users.update_profile(&caller.uid, request).await?;
    Ok(ApiResponse::with_message("Profile updated successfully", profile))
}

/// GET /api/users/preferences
#[utoipa::path(
    get,
    path = "/api/users/preferences",
    tag = "users",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Preference map"))
)]
pub async fn get_preferences_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
) -> Result<Json<ApiResponse<Map<String, Value>>>, ApiError> {
    Ok(ApiResponse::data(state.users.preferences(&caller.uid).await?))
}

/// PUT /api/users/preferences
/// Replaces the whole preference map
#[utoipa::path(
    put,
    path = "/api/users/preferences",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Preferences replaced"),
        (status = 400, description = "Body is not an object or is too large")
    )
)]
pub async fn replace_preferences_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    JsonBody(body): JsonBody,
) -> Result<Json<ApiResponse<Map<String, Value>>>, ApiError> {
    let preferences = match state.validator.validate_value(&USER_UPDATE_PREFERENCES, &body)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    state
        .users
        .replace_preferences(&caller.uid, preferences.clone())
        .await?;
    Ok(ApiResponse::with_message("Preferences updated successfully", preferences))
}

/// PATCH /api/users/preferences
/// Sets one key and keeps the others
#[utoipa::path(
    patch,
    path = "/api/users/preferences",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = UpdatePreferenceRequest,
    responses(
        (status = 200, description = "Preference set"),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn set_preference_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    JsonBody(body): JsonBody,
) -> Result<Json<ApiResponse<Map<String, Value>>>, ApiError> {
    let request: UpdatePreferenceRequest =
        state.validator.validate(&USER_UPDATE_PREFERENCE, &body)?;
    let preferences = state
        .users
        .set_preference(&caller.uid, &request.key, request.value)
        .await?;
    Ok(ApiResponse::with_message(
        format!("Preference '{}' updated successfully", request.key),
        preferences,
    ))
}

/// PUT /api/users/last-login
#[utoipa::path(
    put,
    path = "/api/users/last-login",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Timestamp recorded", body = MessageResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn last_login_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.users.touch_last_login(&caller.uid).await?;
    Ok(MessageResponse::new("Last login updated"))
}

/// GET /api/users/stats
#[utoipa::path(
    get,
    path = "/api/users/stats",
    tag = "users",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Owned document counts", body = ApiResponse<UserStats>))
)]
pub async fn stats_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
) -> Result<Json<ApiResponse<UserStats>>, ApiError> {
    Ok(ApiResponse::data(state.users.stats(&caller.uid).await?))
}

/// GET /api/users/search?query=..&limit=..
#[utoipa::path(
    get,
    path = "/api/users/search",
    tag = "users",
    security(("bearer_auth" = [])),
    params(UserSearchQuery),
    responses(
        (status = 200, description = "Users whose display name starts with the query", body = ApiResponse<Vec<PublicProfile>>),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<PublicProfile>>>, ApiError> {
    let query: UserSearchQuery = state.validator.validate(&USER_SEARCH, &query_value(params))?;
    let users = state.users.search(&query.query, query.limit).await?;
    Ok(ApiResponse::data(users))
}

/// GET /api/users/by-email?email=..
#[utoipa::path(
    get,
    path = "/api/users/by-email",
    tag = "users",
    security(("bearer_auth" = [])),
    params(EmailQuery),
    responses(
        (status = 200, description = "Matching user", body = ApiResponse<PublicProfile>),
        (status = 404, description = "User not found")
    )
)]
pub async fn by_email_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<PublicProfile>>, ApiError> {
    let query: EmailQuery = state.validator.validate(&USER_BY_EMAIL, &query_value(params))?;
    Ok(ApiResponse::data(state.users.by_email(&query.email).await?))
}

/// POST /api/users/batch
#[utoipa::path(
    post,
    path = "/api/users/batch",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = BatchUsersRequest,
    responses(
        (status = 200, description = "Known users among the ids", body = ApiResponse<Vec<PublicProfile>>),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn batch_handler(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<Json<ApiResponse<Vec<PublicProfile>>>, ApiError> {
    let request: BatchUsersRequest = state.validator.validate(&USER_BATCH, &body)?;
    Ok(ApiResponse::data(state.users.batch(request.user_ids).await?))
}

/// GET /api/users/{userId}/exists
#[utoipa::path(
    get,
    path = "/api/users/{userId}/exists",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("userId" = String, Path, description = "User id")),
    responses((status = 200, description = "Existence flag", body = ApiResponse<ExistsResponse>))
)]
pub async fn exists_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<ExistsResponse>>, ApiError> {
    state.validator.validate_path_id(&user_id, "userId")?;
    let exists = state.users.exists(&user_id).await?;
    Ok(ApiResponse::data(ExistsResponse { exists }))
}

/// GET /api/users/{userId}
/// Public fields only; email is withheld
#[utoipa::path(
    get,
    path = "/api/users/{userId}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("userId" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Public profile", body = ApiResponse<PublicProfile>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<PublicProfile>>, ApiError> {
    state.validator.validate_path_id(&user_id, "userId")?;
    Ok(ApiResponse::data(state.users.public_profile(&user_id).await?))
}

/// DELETE /api/users/account
#[utoipa::path(
    delete,
    path = "/api/users/account",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Account and owned documents removed", body = MessageResponse),
        (status = 500, description = "Cascade stopped part way")
    )
)]
pub async fn delete_account_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.accounts.delete_account(&caller.uid).await?;
    Ok(MessageResponse::new("Account deleted successfully"))
}
