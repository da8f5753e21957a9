use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::document_store::StoreError;
use crate::domain::authorization::Identity;

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Email already in use")]
    EmailAlreadyExists,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account disabled")]
    AccountDisabled,

    #[error("No user found: {0}")]
    UserNotFound(String),

    #[error("Invalid or expired reset code")]
    InvalidResetCode,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Credential record held by the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub photo_url: Option<String>,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

/// Fields left `None` are not changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountUpdate {
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Port for account management and bearer token verification
#[cfg_attr(test, automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify_token(&self, token: &str) -> Result<Identity, IdentityError>;

    async fn issue_token(&self, record: &IdentityRecord) -> Result<IssuedToken, IdentityError>;

    async fn create_user(&self, account: NewAccount) -> Result<IdentityRecord, IdentityError>;

    async fn authenticate(&self, email: &str, password: &str)
        -> Result<IdentityRecord, IdentityError>;

    async fn update_user(&self, uid: &str, update: AccountUpdate) -> Result<(), IdentityError>;

    async fn delete_user(&self, uid: &str) -> Result<(), IdentityError>;

    /// Returns a link carrying a single-use reset code
    async fn generate_password_reset_link(&self, email: &str) -> Result<String, IdentityError>;

    /// Consumes the reset code and returns the account email
    async fn confirm_password_reset(
        &self,
        code: &str,
        new_password: &str,
    ) -> Result<String, IdentityError>;
}
