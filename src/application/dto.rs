//! Request and response shapes crossing the API boundary
//!
//! Request types are deserialized from bodies that already passed their
//! rule set, so they only describe shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};

use crate::domain::entities::{PlacedObject, Vector3Patch};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub oob_code: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub new_password: String,
}

/// Returned by signup and login
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub phone_number: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub preferences: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdatePreferenceRequest {
    pub key: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub value: Value,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchUsersRequest {
    pub user_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct UserSearchQuery {
    pub query: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct EmailQuery {
    pub email: String,
}

/// Project fields; all optional so the same shape serves create and update
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub room_type: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequest {
    pub item_id: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ShareProjectRequest {
    pub email: String,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DesignInput {
    pub project_id: Option<String>,
    pub name: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub canvas_data: Option<Map<String, Value>>,
    pub objects: Option<Vec<PlacedObject>>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddDesignObjectRequest {
    pub furniture_item_id: String,
    pub position: Option<Vector3Patch>,
    pub rotation: Option<Vector3Patch>,
    pub scale: Option<Vector3Patch>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewFurnitureRequest {
    pub name: String,
    pub description: String,
    pub category: String,
    pub room_type: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    pub model_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase")]
pub struct FurnitureListQuery {
    pub category: Option<String>,
    pub room_type: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct FurnitureSearchQuery {
    pub q: String,
}

/// Id of a freshly created document
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedId {
    pub id: String,
}
