use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::password::{digest_code, generate_reset_code, hash_password, verify_password};
use crate::application::ports::{
    to_document_data, AccountUpdate, DocumentStore, IdentityError, IdentityProvider,
    IdentityRecord, IssuedToken, NewAccount, Query, WriteMode,
};
use crate::domain::authorization::Identity;
use crate::domain::entities::collections;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    #[serde(default)]
    name: Option<String>,
    iat: i64,
    exp: i64,
}

/// Stored under `auth_accounts/{uid}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthAccount {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    id: String,
    email: String,
    display_name: String,
    password_hash: String,
    #[serde(default)]
    photo_url: Option<String>,
    #[serde(default)]
    disabled: bool,
    created_at: DateTime<Utc>,
}

impl AuthAccount {
    fn record(&self) -> IdentityRecord {
        IdentityRecord {
            uid: self.id.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            photo_url: self.photo_url.clone(),
            disabled: self.disabled,
        }
    }
}

/// Stored under `password_resets/{sha256(code)}`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordReset {
    uid: String,
    email: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct IdentitySettings {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub password_reset_url: String,
    pub password_reset_ttl: Duration,
}

/// HS256 bearer tokens over credential records kept in the document store
pub struct JwtIdentityProvider {
    store: Arc<dyn DocumentStore>,
    settings: IdentitySettings,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtIdentityProvider {
    pub fn new(store: Arc<dyn DocumentStore>, settings: IdentitySettings) -> Self {
        let encoding_key = EncodingKey::from_secret(settings.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(settings.jwt_secret.as_bytes());
        Self {
            store,
            settings,
            encoding_key,
            decoding_key,
        }
    }

    async fn account(&self, uid: &str) -> Result<Option<AuthAccount>, IdentityError> {
        match self.store.get(collections::AUTH_ACCOUNTS, uid).await? {
            Some(doc) => Ok(Some(doc.into_entity()?)),
            None => Ok(None),
        }
    }

    async fn account_by_email(&self, email: &str) -> Result<Option<AuthAccount>, IdentityError> {
        let query = Query::new().where_eq("email", email.to_lowercase()).limit(1);
        let docs = self.store.query(collections::AUTH_ACCOUNTS, &query).await?;
        match docs.into_iter().next() {
            Some(doc) => Ok(Some(doc.into_entity()?)),
            None => Ok(None),
        }
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, IdentityError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => IdentityError::TokenExpired,
                _ => IdentityError::InvalidToken(e.to_string()),
            })
    }

    /// Sign a token with explicit timestamps
    fn sign(&self, record: &IdentityRecord, issued_at: DateTime<Utc>) -> Result<IssuedToken, IdentityError> {
        let expires_at = issued_at + self.settings.token_ttl;
        let claims = Claims {
            sub: record.uid.clone(),
            email: record.email.clone(),
            name: Some(record.display_name.clone()),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| IdentityError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn verify_token(&self, token: &str) -> Result<Identity, IdentityError> {
        let claims = self.decode_claims(token)?;

        let account = self
            .account(&claims.sub)
            .await?
            .ok_or_else(|| IdentityError::InvalidToken("account no longer exists".to_string()))?;
        if account.disabled {
            return Err(IdentityError::AccountDisabled);
        }

        let mut identity = Identity::new(claims.sub, claims.email);
        identity.name = claims.name;
        Ok(identity)
    }

    async fn issue_token(&self, record: &IdentityRecord) -> Result<IssuedToken, IdentityError> {
        self.sign(record, Utc::now())
    }

    async fn create_user(&self, account: NewAccount) -> Result<IdentityRecord, IdentityError> {
        let email = account.email.trim().to_lowercase();
        if self.account_by_email(&email).await?.is_some() {
            return Err(IdentityError::EmailAlreadyExists);
        }

        let uid = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        let stored = AuthAccount {
            id: uid.clone(),
            email,
            display_name: account.display_name,
            password_hash: hash_password(&account.password)?,
            photo_url: None,
            disabled: false,
            created_at: now,
        };

        // The email claim is the uniqueness gate; only one signup can win it
        let mut claim = serde_json::Map::new();
        claim.insert("uid".to_string(), json!(uid));
        claim.insert("createdAt".to_string(), json!(now));
        if !self
            .store
            .create(collections::AUTH_EMAILS, &stored.email, claim)
            .await?
        {
            debug!(uid = %uid, "Email already claimed");
            return Err(IdentityError::EmailAlreadyExists);
        }

        let written = self
            .store
            .set(
                collections::AUTH_ACCOUNTS,
                &uid,
                to_document_data(&stored)?,
                WriteMode::Replace,
            )
            .await;
        if let Err(err) = written {
            let released = self
                .store
                .delete(collections::AUTH_EMAILS, &stored.email)
                .await;
            if let Err(release) = released {
                warn!(uid = %uid, error = %release, "Failed to release email claim");
            }
            return Err(err.into());
        }

        info!(uid = %uid, "Identity account created");
        Ok(stored.record())
    }

    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IdentityRecord, IdentityError> {
        let account = self
            .account_by_email(email)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;

        if !verify_password(password, &account.password_hash) {
            debug!(uid = %account.id, "Password mismatch");
            return Err(IdentityError::InvalidCredentials);
        }
        if account.disabled {
            return Err(IdentityError::AccountDisabled);
        }

        Ok(account.record())
    }

    async fn update_user(&self, uid: &str, update: AccountUpdate) -> Result<(), IdentityError> {
        if self.account(uid).await?.is_none() {
            return Err(IdentityError::UserNotFound(uid.to_string()));
        }

        let mut patch = serde_json::Map::new();
        if let Some(name) = update.display_name {
            patch.insert("displayName".to_string(), json!(name));
        }
        if let Some(photo) = update.photo_url {
            patch.insert("photoUrl".to_string(), json!(photo));
        }
        if let Some(password) = update.password {
            patch.insert("passwordHash".to_string(), json!(hash_password(&password)?));
        }
        if patch.is_empty() {
            return Ok(());
        }

        self.store
            .update(collections::AUTH_ACCOUNTS, uid, patch)
            .await?;
        Ok(())
    }

    async fn delete_user(&self, uid: &str) -> Result<(), IdentityError> {
        let account = self
            .account(uid)
            .await?
            .ok_or_else(|| IdentityError::UserNotFound(uid.to_string()))?;

        if !self.store.delete(collections::AUTH_ACCOUNTS, uid).await? {
            return Err(IdentityError::UserNotFound(uid.to_string()));
        }
        self.store
            .delete(collections::AUTH_EMAILS, &account.email)
            .await?;
        info!(uid = %uid, "Identity account deleted");
        Ok(())
    }

    async fn generate_password_reset_link(&self, email: &str) -> Result<String, IdentityError> {
        let account = self
            .account_by_email(email)
            .await?
            .ok_or_else(|| IdentityError::UserNotFound(email.to_string()))?;

        let code = generate_reset_code();
        let reset = PasswordReset {
            uid: account.id.clone(),
            email: account.email.clone(),
            expires_at: Utc::now() + self.settings.password_reset_ttl,
        };

        self.store
            .set(
                collections::PASSWORD_RESETS,
                &digest_code(&code),
                to_document_data(&reset)?,
                WriteMode::Replace,
            )
            .await?;

        let separator = if self.settings.password_reset_url.contains('?') {
            '&'
        } else {
            '?'
        };
        Ok(format!(
            "{}{}oobCode={}",
            self.settings.password_reset_url, separator, code
        ))
    }

    async fn confirm_password_reset(
        &self,
        code: &str,
        new_password: &str,
    ) -> Result<String, IdentityError> {
        let key = digest_code(code);
        let reset: PasswordReset = match self.store.get(collections::PASSWORD_RESETS, &key).await? {
            Some(doc) => doc.into_entity()?,
            None => return Err(IdentityError::InvalidResetCode),
        };

        // Single use, even when expired
        self.store.delete(collections::PASSWORD_RESETS, &key).await?;
        if reset.expires_at < Utc::now() {
            return Err(IdentityError::InvalidResetCode);
        }

        self.update_user(
            &reset.uid,
            AccountUpdate {
                password: Some(new_password.to_string()),
                ..Default::default()
            },
        )
        .await?;

        Ok(reset.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::MemoryDocumentStore;

    fn provider() -> (Arc<MemoryDocumentStore>, JwtIdentityProvider) {
        let store = Arc::new(MemoryDocumentStore::new());
        let provider = JwtIdentityProvider::new(
            store.clone(),
            IdentitySettings {
                jwt_secret: "test-secret-with-enough-length".to_string(),
                token_ttl: Duration::hours(1),
                password_reset_url: "https://app.example.com/reset".to_string(),
                password_reset_ttl: Duration::minutes(30),
            },
        );
        (store, provider)
    }

    fn account(email: &str) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            password: "secret123".to_string(),
            display_name: "Ann".to_string(),
        }
    }

    #[tokio::test]
    async fn test_signup_then_login_then_verify() {
        let (_, provider) = provider();
        let created = provider.create_user(account("Ann@Example.com")).await.unwrap();
        assert_eq!(created.email, "ann@example.com");

        let record = provider
            .authenticate("ann@example.com", "secret123")
            .await
            .unwrap();
        let token = provider.issue_token(&record).await.unwrap();

        let identity = provider.verify_token(&token.token).await.unwrap();
        assert_eq!(identity.uid, created.uid);
        assert_eq!(identity.name.as_deref(), Some("Ann"));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let (_, provider) = provider();
        provider.create_user(account("a@example.com")).await.unwrap();
        let err = provider
            .create_user(account("A@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::EmailAlreadyExists));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_signups_for_one_email_create_one_account() {
        let (store, provider) = provider();
        let provider = Arc::new(provider);

        let emails = [
            "race@example.com",
            "Race@example.com",
            " race@example.com",
            "RACE@EXAMPLE.COM",
        ];
        let handles: Vec<_> = emails
            .into_iter()
            .map(|email| {
                let provider = provider.clone();
                tokio::spawn(async move { provider.create_user(account(email)).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(err) => assert!(matches!(err, IdentityError::EmailAlreadyExists)),
            }
        }
        assert_eq!(created, 1);

        let accounts = store
            .query(
                collections::AUTH_ACCOUNTS,
                &Query::new().where_eq("email", "race@example.com"),
            )
            .await
            .unwrap();
        assert_eq!(accounts.len(), 1);
    }

    #[tokio::test]
    async fn test_deleted_account_frees_its_email() {
        let (store, provider) = provider();
        let record = provider.create_user(account("a@example.com")).await.unwrap();
        provider.delete_user(&record.uid).await.unwrap();
        assert!(store
            .get(collections::AUTH_EMAILS, "a@example.com")
            .await
            .unwrap()
            .is_none());

        let again = provider.create_user(account("a@example.com")).await.unwrap();
        assert_ne!(again.uid, record.uid);
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        let (_, provider) = provider();
        provider.create_user(account("a@example.com")).await.unwrap();
        let err = provider
            .authenticate("a@example.com", "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let (_, provider) = provider();
        let record = provider.create_user(account("a@example.com")).await.unwrap();
        let issued = provider
            .sign(&record, Utc::now() - Duration::hours(2))
            .unwrap();

        let err = provider.verify_token(&issued.token).await.unwrap_err();
        assert!(matches!(err, IdentityError::TokenExpired));
    }

    #[tokio::test]
    async fn test_tampered_token_is_rejected() {
        let (_, provider) = provider();
        let err = provider.verify_token("not.a.jwt").await.unwrap_err();
        assert!(matches!(err, IdentityError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn test_token_of_deleted_account_is_rejected() {
        let (_, provider) = provider();
        let record = provider.create_user(account("a@example.com")).await.unwrap();
        let token = provider.issue_token(&record).await.unwrap();
        provider.delete_user(&record.uid).await.unwrap();

        assert!(provider.verify_token(&token.token).await.is_err());
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let (store, provider) = provider();
        provider.create_user(account("a@example.com")).await.unwrap();

        let link = provider
            .generate_password_reset_link("a@example.com")
            .await
            .unwrap();
        let code = link.split("oobCode=").nth(1).unwrap().to_string();
        assert!(link.starts_with("https://app.example.com/reset?oobCode="));

        let email = provider
            .confirm_password_reset(&code, "brand-new-pass")
            .await
            .unwrap();
        assert_eq!(email, "a@example.com");
        assert!(provider
            .authenticate("a@example.com", "brand-new-pass")
            .await
            .is_ok());

        // Codes are single use
        let err = provider
            .confirm_password_reset(&code, "again")
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::InvalidResetCode));
        assert!(store
            .get(collections::PASSWORD_RESETS, &digest_code(&code))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_reset_for_unknown_email() {
        let (_, provider) = provider();
        let err = provider
            .generate_password_reset_link("ghost@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::UserNotFound(_)));
    }
}
