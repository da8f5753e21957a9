use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::info;

use super::{into_entities, load};
use crate::application::dto::UpdateProfileRequest;
use crate::application::errors::UseCaseError;
use crate::application::ports::{
    AccountUpdate, Direction, DocumentStore, FilterOp, IdentityProvider, Query,
};
use crate::domain::entities::{collections, PublicProfile, UserProfile, UserStats};

pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Upper bound of a prefix range over display names
const PREFIX_RANGE_END: char = '\u{f8ff}';

/// Profile documents and lookups of other users
pub struct UserUseCases {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl UserUseCases {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    async fn patch(&self, uid: &str, mut patch: Map<String, Value>) -> Result<(), UseCaseError> {
        patch.insert("updatedAt".to_string(), json!(Utc::now()));
        self.store.update(collections::USERS, uid, patch).await?;
        Ok(())
    }

    pub async fn profile(&self, uid: &str) -> Result<UserProfile, UseCaseError> {
        load(self.store.as_ref(), collections::USERS, uid, "User").await
    }

    /// Display name and photo are mirrored onto the identity record
    pub async fn update_profile(
        &self,
        uid: &str,
        request: UpdateProfileRequest,
    ) -> Result<UserProfile, UseCaseError> {
        let mut patch = Map::new();
        if let Some(name) = &request.display_name {
            patch.insert("displayName".to_string(), json!(name));
        }
        if let Some(url) = &request.profile_image_url {
            patch.insert("profileImageUrl".to_string(), json!(url));
        }
        if let Some(phone) = &request.phone_number {
            patch.insert("phoneNumber".to_string(), json!(phone));
        }
        if let Some(preferences) = request.preferences {
            patch.insert("preferences".to_string(), Value::Object(preferences));
        }
        self.patch(uid, patch).await?;

        if request.display_name.is_some() || request.profile_image_url.is_some() {
            self.identity
                .update_user(
                    uid,
                    AccountUpdate {
                        display_name: request.display_name,
                        photo_url: request.profile_image_url,
                        password: None,
                    },
                )
                .await?;
        }

        info!(user_id = %uid, "Profile updated");
        self.profile(uid).await
    }

    pub async fn preferences(&self, uid: &str) -> Result<Map<String, Value>, UseCaseError> {
        Ok(self.profile(uid).await?.preferences)
    }

    pub async fn replace_preferences(
        &self,
        uid: &str,
        preferences: Map<String, Value>,
    ) -> Result<(), UseCaseError> {
        let mut patch = Map::new();
        patch.insert("preferences".to_string(), Value::Object(preferences));
        self.patch(uid, patch).await
    }

    pub async fn set_preference(
        &self,
        uid: &str,
        key: &str,
        value: Value,
    ) -> Result<Map<String, Value>, UseCaseError> {
        let mut preferences = self.preferences(uid).await?;
        preferences.insert(key.to_string(), value);
        self.replace_preferences(uid, preferences.clone()).await?;
        Ok(preferences)
    }

    pub async fn touch_last_login(&self, uid: &str) -> Result<(), UseCaseError> {
        let mut patch = Map::new();
        patch.insert("lastLogin".to_string(), json!(Utc::now()));
        self.store.update(collections::USERS, uid, patch).await?;
        Ok(())
    }

    pub async fn stats(&self, uid: &str) -> Result<UserStats, UseCaseError> {
        let owned = Query::new().where_eq("userId", uid);
        let all = Query::new();
        let favorites = collections::favorites(uid);

        let (projects_count, designs_count, favorites_count) = tokio::try_join!(
            self.store.count(collections::PROJECTS, &owned),
            self.store.count(collections::DESIGNS, &owned),
            self.store.count(&favorites, &all),
        )?;

        Ok(UserStats {
            projects_count,
            designs_count,
            favorites_count,
        })
    }

    /// Case-sensitive display-name prefix search
    pub async fn search(
        &self,
        prefix: &str,
        limit: Option<usize>,
    ) -> Result<Vec<PublicProfile>, UseCaseError> {
        let prefix = prefix.trim();
        let upper = format!("{}{}", prefix, PREFIX_RANGE_END);
        let query = Query::new()
            .filter("displayName", FilterOp::Gte, prefix)
            .filter("displayName", FilterOp::Lte, upper)
            .order_by("displayName", Direction::Asc)
            .limit(limit.unwrap_or(DEFAULT_SEARCH_LIMIT));

        let users: Vec<UserProfile> =
            into_entities(self.store.query(collections::USERS, &query).await?)?;
        Ok(users.iter().map(|u| u.public(true)).collect())
    }

    pub async fn by_email(&self, email: &str) -> Result<PublicProfile, UseCaseError> {
        let query = Query::new()
            .where_eq("email", email.trim().to_lowercase())
            .limit(1);
        let users: Vec<UserProfile> =
            into_entities(self.store.query(collections::USERS, &query).await?)?;
        users
            .first()
            .map(|u| u.public(true))
            .ok_or_else(|| UseCaseError::not_found("User"))
    }

    /// Unknown ids are left out of the result
    pub async fn batch(&self, user_ids: Vec<String>) -> Result<Vec<PublicProfile>, UseCaseError> {
        let query = Query::new().id_in(user_ids);
        let users: Vec<UserProfile> =
            into_entities(self.store.query(collections::USERS, &query).await?)?;
        Ok(users.iter().map(|u| u.public(true)).collect())
    }

    pub async fn exists(&self, uid: &str) -> Result<bool, UseCaseError> {
        Ok(self.store.get(collections::USERS, uid).await?.is_some())
    }

    pub async fn public_profile(&self, uid: &str) -> Result<PublicProfile, UseCaseError> {
        Ok(self.profile(uid).await?.public(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        to_document_data, Document, Filter, MockDocumentStore, MockIdentityProvider, StoreError,
    };

    fn profile_doc(uid: &str) -> Document {
        let mut profile = UserProfile::new(uid, format!("{}@example.com", uid), "Dana");
        profile.preferences.insert("theme".to_string(), json!("dark"));
        Document::new(uid, to_document_data(&profile).unwrap())
    }

    fn use_cases(store: MockDocumentStore, identity: MockIdentityProvider) -> UserUseCases {
        UserUseCases::new(Arc::new(store), Arc::new(identity))
    }

    #[tokio::test]
    async fn test_missing_profile() {
        let mut store = MockDocumentStore::new();
        store.expect_get().returning(|_, _| Ok(None));

        let err = use_cases(store, MockIdentityProvider::new())
            .profile("u1")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "User not found");
    }

    #[tokio::test]
    async fn test_update_profile_mirrors_display_name() {
        let mut store = MockDocumentStore::new();
        store
            .expect_update()
            .withf(|collection, uid, patch| {
                collection == collections::USERS
                    && uid == "u1"
                    && patch["displayName"] == json!("Eve")
                    && patch.contains_key("updatedAt")
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        store
            .expect_get()
            .returning(|_, id| Ok(Some(profile_doc(id))));

        let mut identity = MockIdentityProvider::new();
        identity
            .expect_update_user()
            .withf(|uid, update| uid == "u1" && update.display_name.as_deref() == Some("Eve"))
            .times(1)
            .returning(|_, _| Ok(()));

        use_cases(store, identity)
            .update_profile(
                "u1",
                UpdateProfileRequest {
                    display_name: Some("Eve".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_preferences_only_skips_identity() {
        let mut store = MockDocumentStore::new();
        store.expect_update().returning(|_, _, _| Ok(()));
        store
            .expect_get()
            .returning(|_, id| Ok(Some(profile_doc(id))));

        let mut identity = MockIdentityProvider::new();
        identity.expect_update_user().never();

        let mut preferences = Map::new();
        preferences.insert("units".to_string(), json!("metric"));
        use_cases(store, identity)
            .update_profile(
                "u1",
                UpdateProfileRequest {
                    preferences: Some(preferences),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_set_preference_keeps_other_keys() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get()
            .returning(|_, id| Ok(Some(profile_doc(id))));
        store
            .expect_update()
            .withf(|_, _, patch| {
                patch["preferences"] == json!({"theme": "dark", "units": "imperial"})
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let preferences = use_cases(store, MockIdentityProvider::new())
            .set_preference("u1", "units", json!("imperial"))
            .await
            .unwrap();
        assert_eq!(preferences.len(), 2);
    }

    #[tokio::test]
    async fn test_update_on_missing_user_is_not_found() {
        let mut store = MockDocumentStore::new();
        store
            .expect_update()
            .returning(|c, id, _| Err(StoreError::not_found(c, id)));

        let err = use_cases(store, MockIdentityProvider::new())
            .replace_preferences("ghost", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, UseCaseError::Store(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_stats_counts_three_collections() {
        let mut store = MockDocumentStore::new();
        store.expect_count().returning(|collection, _| {
            Ok(match collection {
                "projects" => 2,
                "designs" => 3,
                _ => 4,
            })
        });

        let stats = use_cases(store, MockIdentityProvider::new())
            .stats("u1")
            .await
            .unwrap();
        assert_eq!(
            stats,
            UserStats {
                projects_count: 2,
                designs_count: 3,
                favorites_count: 4
            }
        );
    }

    #[tokio::test]
    async fn test_search_uses_prefix_range() {
        let mut store = MockDocumentStore::new();
        store
            .expect_query()
            .withf(|_, query| {
                query.limit == Some(DEFAULT_SEARCH_LIMIT)
                    && query.filters.contains(&Filter::Field {
                        field: "displayName".to_string(),
                        op: FilterOp::Lte,
                        value: json!("Da\u{f8ff}"),
                    })
            })
            .returning(|_, _| Ok(vec![profile_doc("u2")]));

        let found = use_cases(store, MockIdentityProvider::new())
            .search(" Da ", None)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email.as_deref(), Some("u2@example.com"));
    }

    #[tokio::test]
    async fn test_public_profile_hides_email() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get()
            .returning(|_, id| Ok(Some(profile_doc(id))));

        let profile = use_cases(store, MockIdentityProvider::new())
            .public_profile("u1")
            .await
            .unwrap();
        assert!(profile.email.is_none());
    }
}
