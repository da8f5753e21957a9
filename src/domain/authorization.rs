use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Verified caller attached to a request by the auth gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Identity {
    pub uid: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn owns(&self, owner_id: &str) -> bool {
        self.uid == owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_ownership() {
        let identity = Identity::new("u1", "ann@example.com").with_name("Ann");
        assert!(identity.owns("u1"));
        assert!(!identity.owns("u2"));
        assert_eq!(identity.name.as_deref(), Some("Ann"));
    }

    #[test]
    fn test_identity_omits_missing_name() {
        let value = serde_json::to_value(Identity::new("u1", "a@example.com")).unwrap();
        assert!(value.get("name").is_none());
    }
}
