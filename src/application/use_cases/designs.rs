use std::sync::Arc;

use tracing::info;

use super::{into_entities, load};
use crate::application::dto::{AddDesignObjectRequest, DesignInput};
use crate::application::errors::UseCaseError;
use crate::application::ports::{to_document_data, Direction, DocumentStore, Query, WriteMode};
use crate::domain::entities::{
    collections, Design, PlacedObject, Project, TransformPatch,
};

/// Design CRUD and placed-object editing
pub struct DesignUseCases {
    store: Arc<dyn DocumentStore>,
}

impl DesignUseCases {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    async fn load(&self, design_id: &str) -> Result<Design, UseCaseError> {
        load(self.store.as_ref(), collections::DESIGNS, design_id, "Design").await
    }

    async fn load_owned(&self, uid: &str, design_id: &str) -> Result<Design, UseCaseError> {
        let design = self.load(design_id).await?;
        design.ensure_owner(uid)?;
        Ok(design)
    }

    async fn save(&self, design: &Design) -> Result<(), UseCaseError> {
        self.store
            .set(
                collections::DESIGNS,
                &design.id,
                to_document_data(design)?,
                WriteMode::Replace,
            )
            .await?;
        Ok(())
    }

    async fn project_for_member(
        &self,
        uid: &str,
        project_id: &str,
    ) -> Result<Project, UseCaseError> {
        let project: Project =
            load(self.store.as_ref(), collections::PROJECTS, project_id, "Project").await?;
        project.ensure_member(uid)?;
        Ok(project)
    }

    pub async fn list(&self, uid: &str) -> Result<Vec<Design>, UseCaseError> {
        let query = Query::new()
            .where_eq("userId", uid)
            .order_by("createdAt", Direction::Desc);
        into_entities(self.store.query(collections::DESIGNS, &query).await?)
    }

    /// All designs of a project the caller can see, whoever created them
    pub async fn by_project(
        &self,
        uid: &str,
        project_id: &str,
    ) -> Result<Vec<Design>, UseCaseError> {
        self.project_for_member(uid, project_id).await?;

        let query = Query::new()
            .where_eq("projectId", project_id)
            .order_by("createdAt", Direction::Desc);
        into_entities(self.store.query(collections::DESIGNS, &query).await?)
    }

    pub async fn get(&self, uid: &str, design_id: &str) -> Result<Design, UseCaseError> {
        self.load_owned(uid, design_id).await
    }

    /// Returns the new design id
    pub async fn create(&self, uid: &str, input: DesignInput) -> Result<String, UseCaseError> {
        let project_id = input
            .project_id
            .clone()
            .ok_or_else(|| UseCaseError::InvalidRequest("projectId is required".to_string()))?;
        let name = input
            .name
            .clone()
            .ok_or_else(|| UseCaseError::InvalidRequest("name is required".to_string()))?;

        self.project_for_member(uid, &project_id).await?;

        let mut design = Design::new(uid, project_id, name);
        apply_input(&mut design, input);

        let id = self
            .store
            .add(collections::DESIGNS, to_document_data(&design)?)
            .await?;
        info!(design_id = %id, project_id = %design.project_id, "Design created");
        Ok(id)
    }

    pub async fn update(
        &self,
        uid: &str,
        design_id: &str,
        input: DesignInput,
    ) -> Result<Design, UseCaseError> {
        let mut design = self.load_owned(uid, design_id).await?;
        // A design never moves between projects
        apply_input(
            &mut design,
            DesignInput {
                project_id: None,
                ..input
            },
        );
        design.touch();
        self.save(&design).await?;
        Ok(design)
    }

    pub async fn delete(&self, uid: &str, design_id: &str) -> Result<(), UseCaseError> {
        self.load_owned(uid, design_id).await?;
        self.store.delete(collections::DESIGNS, design_id).await?;
        info!(design_id = %design_id, user_id = %uid, "Design deleted");
        Ok(())
    }

    pub async fn add_object(
        &self,
        uid: &str,
        design_id: &str,
        request: AddDesignObjectRequest,
    ) -> Result<PlacedObject, UseCaseError> {
        let mut design = self.load_owned(uid, design_id).await?;

        let mut object = PlacedObject::new(request.furniture_item_id);
        if let Some(position) = &request.position {
            object.position.apply(position);
        }
        if let Some(rotation) = &request.rotation {
            object.rotation.apply(rotation);
        }
        if let Some(scale) = &request.scale {
            object.scale.apply(scale);
        }

        design.add_object(object.clone());
        self.save(&design).await?;
        Ok(object)
    }

    pub async fn update_object(
        &self,
        uid: &str,
        design_id: &str,
        object_id: &str,
        patch: TransformPatch,
    ) -> Result<PlacedObject, UseCaseError> {
        let mut design = self.load_owned(uid, design_id).await?;
        let updated = design.update_object(object_id, &patch)?;
        self.save(&design).await?;
        Ok(updated)
    }

    pub async fn remove_object(
        &self,
        uid: &str,
        design_id: &str,
        object_id: &str,
    ) -> Result<(), UseCaseError> {
        let mut design = self.load_owned(uid, design_id).await?;
        design.remove_object(object_id)?;
        self.save(&design).await?;
        Ok(())
    }
}

fn apply_input(design: &mut Design, input: DesignInput) {
    if let Some(project_id) = input.project_id {
        design.project_id = project_id;
    }
    if let Some(name) = input.name {
        design.name = name;
    }
    if input.canvas_data.is_some() {
        design.canvas_data = input.canvas_data;
    }
    if let Some(objects) = input.objects {
        design.objects = objects;
        design.assign_object_ids();
    }
    if input.image_url.is_some() {
        design.image_url = input.image_url;
    }
}
