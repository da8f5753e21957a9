use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{error, info, warn};

use crate::application::dto::{AuthSession, LoginRequest, ResetPasswordRequest, SignupRequest};
use crate::application::errors::UseCaseError;
use crate::application::ports::{
    to_document_data, AccountUpdate, DocumentStore, IdentityProvider, IdentityRecord, NewAccount,
    Query, StoreError, WriteMode,
};
use crate::domain::entities::{collections, UserProfile};

/// Signup, login, password flows and account removal
pub struct AccountUseCases {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl AccountUseCases {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    async fn session(&self, record: IdentityRecord) -> Result<AuthSession, UseCaseError> {
        let issued = self.identity.issue_token(&record).await?;
        Ok(AuthSession {
            uid: record.uid,
            email: record.email,
            display_name: record.display_name,
            token: issued.token,
            expires_at: issued.expires_at,
        })
    }

    /// Creates the identity record and its `users` profile document
    pub async fn signup(&self, request: SignupRequest) -> Result<AuthSession, UseCaseError> {
        let record = self
            .identity
            .create_user(NewAccount {
                email: request.email,
                password: request.password,
                display_name: request.display_name,
            })
            .await?;

        let profile = UserProfile::new(&record.uid, &record.email, &record.display_name);
        self.store
            .set(
                collections::USERS,
                &record.uid,
                to_document_data(&profile)?,
                WriteMode::Replace,
            )
            .await?;

        info!(user_id = %record.uid, email = %record.email, "User signed up");
        self.session(record).await
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthSession, UseCaseError> {
        let record = self
            .identity
            .authenticate(&request.email, &request.password)
            .await?;

        let mut patch = serde_json::Map::new();
        patch.insert(
            "lastLogin".to_string(),
            serde_json::json!(chrono::Utc::now()),
        );
        match self.store.update(collections::USERS, &record.uid, patch).await {
            Ok(()) => {}
            Err(StoreError::NotFound { .. }) => {
                warn!(user_id = %record.uid, "Login for account without a profile document");
            }
            Err(e) => return Err(e.into()),
        }

        info!(user_id = %record.uid, "User logged in");
        self.session(record).await
    }

    /// Returns the reset link for delivery to the user
    pub async fn forgot_password(&self, email: &str) -> Result<String, UseCaseError> {
        let link = self.identity.generate_password_reset_link(email).await?;
        info!(email = %email, "Password reset link generated");
        Ok(link)
    }

    pub async fn reset_password(&self, request: ResetPasswordRequest) -> Result<(), UseCaseError> {
        let email = self
            .identity
            .confirm_password_reset(&request.oob_code, &request.new_password)
            .await?;
        info!(email = %email, "Password reset");
        Ok(())
    }

    pub async fn change_password(&self, uid: &str, new_password: &str) -> Result<(), UseCaseError> {
        self.identity
            .update_user(
                uid,
                AccountUpdate {
                    password: Some(new_password.to_string()),
                    ..Default::default()
                },
            )
            .await?;
        info!(user_id = %uid, "Password changed");
        Ok(())
    }

    /// Delete every document matched by `query`, concurrently
    async fn delete_matching(
        &self,
        phase: &str,
        collection: &str,
        query: Query,
    ) -> Result<usize, UseCaseError> {
        let docs = self.store.query(collection, &query).await?;
        let deletions = docs
            .iter()
            .map(|doc| self.store.delete(collection, &doc.id));

        match try_join_all(deletions).await {
            Ok(removed) => {
                info!(phase, collection, removed = removed.len(), "Cascade phase complete");
                Ok(removed.len())
            }
            Err(e) => {
                error!(phase, collection, error = %e, "Cascade phase failed; account partially deleted");
                Err(e.into())
            }
        }
    }

    /// Removes projects, designs, favorites, view history, the profile and
    /// finally the identity record. Phases run in order; there is no rollback.
    pub async fn delete_account(&self, uid: &str) -> Result<(), UseCaseError> {
        let owned = Query::new().where_eq("userId", uid);

        self.delete_matching("projects", collections::PROJECTS, owned.clone())
            .await?;
        self.delete_matching("designs", collections::DESIGNS, owned)
            .await?;
        self.delete_matching("favorites", &collections::favorites(uid), Query::new())
            .await?;
        self.delete_matching(
            "recently_viewed",
            &collections::recently_viewed(uid),
            Query::new(),
        )
        .await?;

        self.store.delete(collections::USERS, uid).await?;
        self.identity.delete_user(uid).await?;

        info!(user_id = %uid, "Account deleted");
        Ok(())
    }
}
