use std::sync::Arc;

use futures::future::try_join_all;
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use super::furniture::resolve_items;
use super::{into_entities, load};
use crate::application::dto::{ProjectInput, ShareProjectRequest};
use crate::application::errors::UseCaseError;
use crate::application::ports::{to_document_data, Direction, DocumentStore, Query};
use crate::domain::entities::{
    collections, CollaboratorRole, FurnitureItem, Project, UserProfile,
};
use crate::domain::errors::DomainError;

/// Collaborator as listed on a project
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub uid: String,
    pub display_name: String,
    pub email: String,
    pub photo_url: Option<String>,
}

/// Project CRUD, item lists and sharing
pub struct ProjectUseCases {
    store: Arc<dyn DocumentStore>,
}

impl ProjectUseCases {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    async fn load(&self, project_id: &str) -> Result<Project, UseCaseError> {
        load(self.store.as_ref(), collections::PROJECTS, project_id, "Project").await
    }

    /// Writes only `fields` and `updatedAt`; other fields keep their stored values
    async fn patch(
        &self,
        project_id: &str,
        project: &Project,
        fields: &[&str],
    ) -> Result<(), UseCaseError> {
        let mut data = to_document_data(project)?;
        let patch = fields
            .iter()
            .copied()
            .chain(["updatedAt"])
            .filter_map(|field| data.remove_entry(field))
            .collect();
        self.store
            .update(collections::PROJECTS, project_id, patch)
            .await?;
        Ok(())
    }

    /// Projects owned by `uid`, newest first
    pub async fn list(&self, uid: &str) -> Result<Vec<Project>, UseCaseError> {
        let query = Query::new()
            .where_eq("userId", uid)
            .order_by("createdAt", Direction::Desc);
        into_entities(self.store.query(collections::PROJECTS, &query).await?)
    }

    pub async fn get(&self, uid: &str, project_id: &str) -> Result<Project, UseCaseError> {
        let project = self.load(project_id).await?;
        project.ensure_member(uid)?;
        Ok(project)
    }

    /// Returns the new project id
    pub async fn create(&self, uid: &str, input: ProjectInput) -> Result<String, UseCaseError> {
        let name = input
            .name
            .clone()
            .ok_or_else(|| UseCaseError::InvalidRequest("name is required".to_string()))?;

        let mut project = Project::new(uid, name);
        apply_input(&mut project, input);

        let id = self
            .store
            .add(collections::PROJECTS, to_document_data(&project)?)
            .await?;
        info!(project_id = %id, user_id = %uid, "Project created");
        Ok(id)
    }

    pub async fn update(
        &self,
        uid: &str,
        project_id: &str,
        input: ProjectInput,
    ) -> Result<Project, UseCaseError> {
        let mut project = self.load(project_id).await?;
        project.ensure_owner(uid)?;

        let fields = changed_fields(&input);
        apply_input(&mut project, input);
        project.touch();
        self.patch(project_id, &project, &fields).await?;
        Ok(project)
    }

    pub async fn delete(&self, uid: &str, project_id: &str) -> Result<(), UseCaseError> {
        let project = self.load(project_id).await?;
        project.ensure_owner(uid)?;

        self.store.delete(collections::PROJECTS, project_id).await?;
        info!(project_id = %project_id, user_id = %uid, "Project deleted");
        Ok(())
    }

    /// Furniture items referenced by the project; dangling ids are skipped
    pub async fn items(
        &self,
        uid: &str,
        project_id: &str,
    ) -> Result<Vec<FurnitureItem>, UseCaseError> {
        let project = self.get(uid, project_id).await?;
        resolve_items(self.store.as_ref(), &project.items).await
    }

    pub async fn add_item(
        &self,
        uid: &str,
        project_id: &str,
        item_id: &str,
    ) -> Result<Project, UseCaseError> {
        let mut project = self.get(uid, project_id).await?;
        if project.add_item(item_id) {
            self.patch(project_id, &project, &["items"]).await?;
        }
        Ok(project)
    }

    pub async fn remove_item(
        &self,
        uid: &str,
        project_id: &str,
        item_id: &str,
    ) -> Result<Project, UseCaseError> {
        let mut project = self.get(uid, project_id).await?;
        if project.remove_item(item_id) {
            self.patch(project_id, &project, &["items"]).await?;
        }
        Ok(project)
    }

    /// Share with the user registered under `email`; owner only
    pub async fn share(
        &self,
        uid: &str,
        project_id: &str,
        request: ShareProjectRequest,
    ) -> Result<Project, UseCaseError> {
        let mut project = self.load(project_id).await?;
        if !project.is_owner(uid) {
            return Err(DomainError::OwnerOnly {
                action: "share project",
            }
            .into());
        }

        let role = match request.role.as_deref() {
            Some(raw) => CollaboratorRole::parse(raw).ok_or_else(|| {
                UseCaseError::InvalidRequest(format!("Unknown collaborator role: {}", raw))
            })?,
            None => CollaboratorRole::default(),
        };

        let query = Query::new()
            .where_eq("email", request.email.trim().to_lowercase())
            .limit(1);
        let collaborator = self
            .store
            .query(collections::USERS, &query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| UseCaseError::not_found("User"))?;

        project.share_with(&collaborator.id, role)?;
        self.patch(
            project_id,
            &project,
            &["collaborators", "collaboratorRoles"],
        )
        .await?;

        info!(
            project_id = %project_id,
            collaborator = %collaborator.id,
            role = ?role,
            "Project shared"
        );
        Ok(project)
    }

    pub async fn collaborators(
        &self,
        uid: &str,
        project_id: &str,
    ) -> Result<Vec<Collaborator>, UseCaseError> {
        let project = self.get(uid, project_id).await?;

        let lookups = project
            .collaborators
            .iter()
            .map(|id| self.store.get(collections::USERS, id));
        let docs = try_join_all(lookups).await?;

        docs.into_iter()
            .flatten()
            .map(|doc| -> Result<Collaborator, UseCaseError> {
                let profile: UserProfile = doc.into_entity()?;
                Ok(Collaborator {
                    uid: profile.uid,
                    display_name: profile.display_name,
                    email: profile.email,
                    photo_url: profile.profile_image_url,
                })
            })
            .collect()
    }
}

/// Stored field names an update touches
fn changed_fields(input: &ProjectInput) -> Vec<&'static str> {
    [
        ("name", input.name.is_some()),
        ("description", input.description.is_some()),
        ("roomType", input.room_type.is_some()),
        ("tags", input.tags.is_some()),
        ("isPublic", input.is_public.is_some()),
    ]
    .into_iter()
    .filter_map(|(field, present)| present.then_some(field))
    .collect()
}

fn apply_input(project: &mut Project, input: ProjectInput) {
    if let Some(name) = input.name {
        project.name = name;
    }
    if let Some(description) = input.description {
        project.description = description;
    }
    if input.room_type.is_some() {
        project.room_type = input.room_type;
    }
    if let Some(tags) = input.tags {
        project.tags = tags;
    }
    if let Some(is_public) = input.is_public {
        project.is_public = is_public;
    }
}
