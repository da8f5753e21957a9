use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::errors::DomainError;

/// Role granted to a collaborator when a project is shared
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CollaboratorRole {
    #[default]
    Viewer,
    Editor,
    Admin,
}

impl CollaboratorRole {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "viewer" => Some(Self::Viewer),
            "editor" => Some(Self::Editor),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// How a given user relates to a project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectAccess {
    Owner,
    Collaborator(CollaboratorRole),
    None,
}

/// A room planning project owned by one user and shared with others
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub room_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub collaborators: Vec<String>,
    #[serde(default)]
    pub collaborator_roles: BTreeMap<String, CollaboratorRole>,
    #[serde(default)]
    pub items: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            user_id: user_id.into(),
            name: name.into(),
            description: String::new(),
            room_type: None,
            tags: Vec::new(),
            is_public: false,
            collaborators: Vec::new(),
            collaborator_roles: BTreeMap::new(),
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn access_for(&self, uid: &str) -> ProjectAccess {
        if self.user_id == uid {
            return ProjectAccess::Owner;
        }
        if self.collaborators.iter().any(|c| c == uid) {
            let role = self.collaborator_roles.get(uid).copied().unwrap_or_default();
            return ProjectAccess::Collaborator(role);
        }
        ProjectAccess::None
    }

    pub fn is_owner(&self, uid: &str) -> bool {
        self.user_id == uid
    }

    /// Owner or collaborator
    pub fn ensure_member(&self, uid: &str) -> Result<(), DomainError> {
        match self.access_for(uid) {
            ProjectAccess::None => Err(DomainError::AccessDenied),
            _ => Ok(()),
        }
    }

    pub fn ensure_owner(&self, uid: &str) -> Result<(), DomainError> {
        if self.is_owner(uid) {
            Ok(())
        } else {
            Err(DomainError::AccessDenied)
        }
    }

    /// Returns `false` when the item was already listed
    pub fn add_item(&mut self, item_id: &str) -> bool {
        if self.items.iter().any(|i| i == item_id) {
            return false;
        }
        self.items.push(item_id.to_string());
        self.touch();
        true
    }

    pub fn remove_item(&mut self, item_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i != item_id);
        self.touch();
        before != self.items.len()
    }

    /// Adds or re-roles a collaborator; the owner cannot be added
    pub fn share_with(
        &mut self,
        collaborator_id: &str,
        role: CollaboratorRole,
    ) -> Result<(), DomainError> {
        if self.is_owner(collaborator_id) {
            return Err(DomainError::ShareWithOwner);
        }
        if !self.collaborators.iter().any(|c| c == collaborator_id) {
            self.collaborators.push(collaborator_id.to_string());
        }
        self.collaborator_roles
            .insert(collaborator_id.to_string(), role);
        self.touch();
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> Project {
        Project::new("owner", "Living room")
    }

    #[test]
    fn test_access_levels() {
        let mut p = project();
        p.share_with("friend", CollaboratorRole::Editor).unwrap();

        assert_eq!(p.access_for("owner"), ProjectAccess::Owner);
        assert_eq!(
            p.access_for("friend"),
            ProjectAccess::Collaborator(CollaboratorRole::Editor)
        );
        assert_eq!(p.access_for("stranger"), ProjectAccess::None);

        assert!(p.ensure_member("friend").is_ok());
        assert!(p.ensure_owner("friend").is_err());
        assert_eq!(p.ensure_member("stranger"), Err(DomainError::AccessDenied));
    }

    #[test]
    fn test_collaborator_without_role_defaults_to_viewer() {
        let mut p = project();
        p.collaborators.push("legacy".to_string());
        assert_eq!(
            p.access_for("legacy"),
            ProjectAccess::Collaborator(CollaboratorRole::Viewer)
        );
    }

    #[test]
    fn test_sharing_twice_keeps_one_entry() {
        let mut p = project();
        p.share_with("friend", CollaboratorRole::Viewer).unwrap();
        p.share_with("friend", CollaboratorRole::Admin).unwrap();

        assert_eq!(p.collaborators, vec!["friend"]);
        assert_eq!(p.collaborator_roles["friend"], CollaboratorRole::Admin);
        assert!(p.share_with("owner", CollaboratorRole::Viewer).is_err());
    }

    #[test]
    fn test_items_are_deduplicated() {
        let mut p = project();
        assert!(p.add_item("chair"));
        assert!(!p.add_item("chair"));
        assert!(p.remove_item("chair"));
        assert!(!p.remove_item("chair"));
        assert!(p.items.is_empty());
    }

    #[test]
    fn test_document_shape_is_camel_case() {
        let value = serde_json::to_value(project()).unwrap();
        assert!(value.get("userId").is_some());
        assert!(value.get("collaboratorRoles").is_some());
        assert!(value.get("id").is_none());
    }
}
