use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Marker document in `users/{uid}/favorites/{itemId}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub item_id: String,
    pub created_at: DateTime<Utc>,
}

impl Favorite {
    pub fn new(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            created_at: Utc::now(),
        }
    }
}

/// View record in `users/{uid}/recently_viewed/{itemId}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentlyViewed {
    pub item_id: String,
    pub viewed_at: DateTime<Utc>,
}

impl RecentlyViewed {
    pub fn new(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            viewed_at: Utc::now(),
        }
    }
}
