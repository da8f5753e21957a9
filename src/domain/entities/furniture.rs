use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Catalog entry in `furniture_items`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FurnitureItem {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub room_type: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub model_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FurnitureItem {
    /// Case-insensitive substring match over name, description and category
    pub fn matches_text(&self, needle: &str) -> bool {
        let haystack = format!("{} {} {}", self.name, self.description, self.category)
            .to_lowercase();
        haystack.contains(&needle.to_lowercase())
    }

    pub fn price_in(&self, min: Option<f64>, max: Option<f64>) -> bool {
        min.is_none_or(|m| self.price >= m) && max.is_none_or(|m| self.price <= m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> FurnitureItem {
        let now = Utc::now();
        FurnitureItem {
            id: "f1".to_string(),
            name: "Oak Table".to_string(),
            description: "Solid dining table".to_string(),
            category: "tables".to_string(),
            room_type: Some("dining".to_string()),
            price: 320.0,
            tags: vec![],
            featured: false,
            model_url: None,
            thumbnail_url: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_text_match_is_case_insensitive() {
        assert!(item().matches_text("oak"));
        assert!(item().matches_text("DINING"));
        assert!(!item().matches_text("sofa"));
    }

    #[test]
    fn test_price_range() {
        assert!(item().price_in(None, None));
        assert!(item().price_in(Some(300.0), Some(320.0)));
        assert!(!item().price_in(Some(321.0), None));
        assert!(!item().price_in(None, Some(100.0)));
    }
}
