use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Profile document kept under `users/{uid}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub preferences: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn new(
        uid: impl Into<String>,
        email: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            uid: uid.into(),
            email: email.into(),
            display_name: display_name.into(),
            phone_number: None,
            profile_image_url: None,
            preferences: Map::new(),
            created_at: now,
            updated_at: now,
            last_login: Some(now),
        }
    }

    /// Fields other users may see
    pub fn public(&self, include_email: bool) -> PublicProfile {
        PublicProfile {
            uid: self.uid.clone(),
            display_name: self.display_name.clone(),
            email: include_email.then(|| self.email.clone()),
            profile_image_url: self.profile_image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub uid: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub projects_count: usize,
    pub designs_count: usize,
    pub favorites_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_profile_hides_private_fields() {
        let mut profile = UserProfile::new("u1", "ann@example.com", "Ann");
        profile.phone_number = Some("+15551234567".to_string());

        let public = serde_json::to_value(profile.public(false)).unwrap();
        assert!(public.get("email").is_none());
        assert!(public.get("phoneNumber").is_none());
        assert_eq!(public["displayName"], "Ann");

        let with_email = profile.public(true);
        assert_eq!(with_email.email.as_deref(), Some("ann@example.com"));
    }
}
