use std::sync::Arc;

use tracing::debug;

use super::furniture::resolve_items;
use super::into_entities;
use crate::application::errors::UseCaseError;
use crate::application::ports::{to_document_data, Direction, DocumentStore, Query, WriteMode};
use crate::domain::entities::{collections, Favorite, FurnitureItem};

pub struct FavoriteUseCases {
    store: Arc<dyn DocumentStore>,
}

impl FavoriteUseCases {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Favorited items, most recently added first
    pub async fn list(&self, uid: &str) -> Result<Vec<FurnitureItem>, UseCaseError> {
        let query = Query::new().order_by("createdAt", Direction::Desc);
        let favorites: Vec<Favorite> =
            into_entities(self.store.query(&collections::favorites(uid), &query).await?)?;

        let ids: Vec<String> = favorites.into_iter().map(|f| f.item_id).collect();
        resolve_items(self.store.as_ref(), &ids).await
    }

    pub async fn add(&self, uid: &str, item_id: &str) -> Result<(), UseCaseError> {
        if self
            .store
            .get(collections::FURNITURE_ITEMS, item_id)
            .await?
            .is_none()
        {
            return Err(UseCaseError::not_found("Item"));
        }

        self.store
            .set(
                &collections::favorites(uid),
                item_id,
                to_document_data(&Favorite::new(item_id))?,
                WriteMode::Replace,
            )
            .await?;
        debug!(user_id = %uid, item_id = %item_id, "Favorite added");
        Ok(())
    }

    /// Removing an item that is not a favorite is not an error
    pub async fn remove(&self, uid: &str, item_id: &str) -> Result<(), UseCaseError> {
        self.store
            .delete(&collections::favorites(uid), item_id)
            .await?;
        Ok(())
    }

    pub async fn is_favorite(&self, uid: &str, item_id: &str) -> Result<bool, UseCaseError> {
        Ok(self
            .store
            .get(&collections::favorites(uid), item_id)
            .await?
            .is_some())
    }
}
