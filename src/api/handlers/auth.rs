use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::errors::ApiError;
use crate::api::extract::JsonBody;
use crate::api::middleware::input_sanitization::rule_sets::{
    USER_CHANGE_PASSWORD, USER_FORGOT_PASSWORD, USER_LOGIN, USER_RESET_PASSWORD, USER_SIGNUP,
    USER_UPDATE_PROFILE,
};
use crate::api::response::{ApiResponse, MessageResponse};
use crate::api::router::AppState;
use crate::application::dto::{
    AuthSession, ChangePasswordRequest, EmailRequest, LoginRequest, ResetPasswordRequest,
    SignupRequest, UpdateProfileRequest,
};
use crate::domain::authorization::Identity;
use crate::domain::entities::UserProfile;

/// Reset link, only echoed back outside production
#[derive(Serialize, ToSchema)]
pub struct ResetLink {
    pub link: String,
}

/// POST /api/auth/signup
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<AuthSession>),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn signup_handler(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<ApiResponse<AuthSession>>), ApiError> {
    let request: SignupRequest = state.validator.validate(&USER_SIGNUP, &body)?;
    let session = state.accounts.signup(request).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("User registered successfully", session),
    ))
}

/// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<AuthSession>),
        (status = 401, description = "Invalid email or password"),
        (status = 403, description = "Account disabled")
    )
)]
pub async fn login_handler(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<Json<ApiResponse<AuthSession>>, ApiError> {
    let request: LoginRequest = state.validator.validate(&USER_LOGIN, &body)?;
    let session = state.accounts.login(request).await?;
    Ok(ApiResponse::with_message("Login successful", session))
}

/// POST /api/auth/logout
/// Tokens are stateless; the client drops its copy
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses((status = 200, description = "Logged out", body = MessageResponse))
)]
pub async fn logout_handler() -> Json<MessageResponse> {
    MessageResponse::new("Logged out successfully")
}

/// POST /api/auth/forgot-password
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    tag = "auth",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Reset link generated", body = ApiResponse<ResetLink>),
        (status = 404, description = "No user found with this email")
    )
)]
pub async fn forgot_password_handler(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<Json<ApiResponse<ResetLink>>, ApiError> {
    let request: EmailRequest = state.validator.validate(&USER_FORGOT_PASSWORD, &body)?;
    let link = state.accounts.forgot_password(&request.email).await?;

    let data = (!state.config.is_production()).then_some(ResetLink { link });
    Ok(Json(ApiResponse {
        success: true,
        message: Some("Password reset email sent".to_string()),
        data,
    }))
}

/// POST /api/auth/reset-password
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    tag = "auth",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Invalid or expired reset code")
    )
)]
pub async fn reset_password_handler(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<Json<MessageResponse>, ApiError> {
    let request: ResetPasswordRequest = state.validator.validate(&USER_RESET_PASSWORD, &body)?;
    state.accounts.reset_password(request).await?;
    Ok(MessageResponse::new("Password reset successfully"))
}

/// GET /api/auth/profile
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    tag = "auth",
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
    let profile = state.users.profile(&caller.uid).await?;
    Ok(ApiResponse::data(profile))
}

/// PUT /api/auth/profile
#[utoipa::path(
    put,
    path = "/api/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<UserProfile>),
        (status = 400, description = "Validation failed")
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

/// DELETE /api/auth/account
#[utoipa::path(
    delete,
    path = "/api/auth/account",
    tag = "auth",
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

/// POST /api/auth/change-password
#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn change_password_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Identity>,
    JsonBody(body): JsonBody,
) -> Result<Json<MessageResponse>, ApiError> {
    let request: ChangePasswordRequest = state.validator.validate(&USER_CHANGE_PASSWORD, &body)?;
    state
        .accounts
        .change_password(&caller.uid, &request.new_password)
        .await?;
    Ok(MessageResponse::new("Password changed successfully"))
}

/// GET /api/auth/verify-token
#[utoipa::path(
    get,
    path = "/api/auth/verify-token",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Token is valid", body = ApiResponse<Identity>),
        (status = 401, description = "Invalid or expired token")
    )
)]
pub async fn verify_token_handler(
    Extension(caller): Extension<Identity>,
) -> Json<ApiResponse<Identity>> {
    ApiResponse::with_message("Token is valid", caller)
}
