use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Vector3 {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const ONE: Vector3 = Vector3 {
        x: 1.0,
        y: 1.0,
        z: 1.0,
    };

    /// Overwrite only the axes present in `patch`
    pub fn apply(&mut self, patch: &Vector3Patch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(z) = patch.z {
            self.z = z;
        }
    }
}

impl Default for Vector3 {
    fn default() -> Self {
        Self::ZERO
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, ToSchema)]
pub struct Vector3Patch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

fn unit_scale() -> Vector3 {
    Vector3::ONE
}

/// A furniture item placed in a design's scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlacedObject {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub furniture_item_id: String,
    #[serde(default)]
    pub position: Vector3,
    #[serde(default)]
    pub rotation: Vector3,
    #[serde(default = "unit_scale")]
    pub scale: Vector3,
}

impl PlacedObject {
    pub fn new(furniture_item_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            furniture_item_id: furniture_item_id.into(),
            position: Vector3::ZERO,
            rotation: Vector3::ZERO,
            scale: Vector3::ONE,
        }
    }
}

/// Partial update of a placed object's transform
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct TransformPatch {
    pub position: Option<Vector3Patch>,
    pub rotation: Option<Vector3Patch>,
    pub scale: Option<Vector3Patch>,
}

/// A saved scene inside a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Design {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub user_id: String,
    pub project_id: String,
    pub name: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub canvas_data: Option<Map<String, Value>>,
    #[serde(default)]
    pub objects: Vec<PlacedObject>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Design {
    pub fn new(
        user_id: impl Into<String>,
        project_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            user_id: user_id.into(),
            project_id: project_id.into(),
            name: name.into(),
            canvas_data: None,
            objects: Vec::new(),
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn ensure_owner(&self, uid: &str) -> Result<(), DomainError> {
        if self.user_id == uid {
            Ok(())
        } else {
            Err(DomainError::AccessDenied)
        }
    }

    /// Objects submitted without an id get a fresh one
    pub fn assign_object_ids(&mut self) {
        for object in &mut self.objects {
            if object.id.trim().is_empty() {
                object.id = Uuid::new_v4().to_string();
            }
        }
    }

    pub fn add_object(&mut self, object: PlacedObject) {
        self.objects.push(object);
        self.touch();
    }

    pub fn update_object(
        &mut self,
        object_id: &str,
        patch: &TransformPatch,
    ) -> Result<PlacedObject, DomainError> {
        let object = self
            .objects
            .iter_mut()
            .find(|o| o.id == object_id)
            .ok_or_else(|| DomainError::ObjectNotFound(object_id.to_string()))?;

        if let Some(position) = &patch.position {
            object.position.apply(position);
        }
        if let Some(rotation) = &patch.rotation {
            object.rotation.apply(rotation);
        }
        if let Some(scale) = &patch.scale {
            object.scale.apply(scale);
        }

        let updated = object.clone();
        self.touch();
        Ok(updated)
    }

    pub fn remove_object(&mut self, object_id: &str) -> Result<(), DomainError> {
        let before = self.objects.len();
        self.objects.retain(|o| o.id != object_id);
        if before == self.objects.len() {
            return Err(DomainError::ObjectNotFound(object_id.to_string()));
        }
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
    use serde_json::json;

    #[test]
    fn test_placed_object_defaults() {
        let object: PlacedObject =
            serde_json::from_value(json!({"furnitureItemId": "sofa", "position": {"x": 2}}))
                .unwrap();

        assert_eq!(object.position, Vector3 { x: 2.0, y: 0.0, z: 0.0 });
        assert_eq!(object.scale, Vector3::ONE);
        assert!(object.id.is_empty());
    }

    #[test]
    fn test_update_object_applies_partial_axes() {
        let mut design = Design::new("u1", "p1", "Bedroom");
        let object = PlacedObject::new("bed");
        let id = object.id.clone();
        design.add_object(object);

        let patch = TransformPatch {
            position: Some(Vector3Patch {
                x: Some(4.0),
                y: None,
                z: Some(-1.5),
            }),
            ..Default::default()
        };
        let updated = design.update_object(&id, &patch).unwrap();

        assert_eq!(updated.position, Vector3 { x: 4.0, y: 0.0, z: -1.5 });
        assert_eq!(updated.scale, Vector3::ONE);
    }

    #[test]
    fn test_unknown_object_is_reported() {
        let mut design = Design::new("u1", "p1", "Bedroom");
        assert!(matches!(
            design.remove_object("missing"),
            Err(DomainError::ObjectNotFound(_))
        ));
        assert!(design
            .update_object("missing", &TransformPatch::default())
            .is_err());
    }

    #[test]
    fn test_assign_object_ids_fills_blanks_only() {
        let mut design = Design::new("u1", "p1", "Bedroom");
        design.objects = vec![
            PlacedObject {
                id: "keep".to_string(),
                ..PlacedObject::new("a")
            },
            PlacedObject {
                id: String::new(),
                ..PlacedObject::new("b")
            },
        ];
        design.assign_object_ids();

        assert_eq!(design.objects[0].id, "keep");
        assert!(!design.objects[1].id.is_empty());
    }

    #[test]
    fn test_only_owner_passes() {
        let design = Design::new("u1", "p1", "Bedroom");
        assert!(design.ensure_owner("u1").is_ok());
        assert_eq!(design.ensure_owner("u2"), Err(DomainError::AccessDenied));
    }
}
