use std::sync::Arc;

use chrono::Utc;
use futures::future::try_join_all;
use tracing::{debug, info};

use super::{into_entities, load};
use crate::application::dto::{FurnitureListQuery, NewFurnitureRequest};
use crate::application::errors::UseCaseError;
use crate::application::ports::{to_document_data, Direction, DocumentStore, Query, WriteMode};
use crate::domain::entities::{collections, FurnitureItem, RecentlyViewed};

pub const FEATURED_LIMIT: usize = 10;
pub const RECENTLY_VIEWED_LIMIT: usize = 10;

/// Fetch catalog items in the given order, skipping ids with no document
pub(crate) async fn resolve_items(
    store: &dyn DocumentStore,
    item_ids: &[String],
) -> Result<Vec<FurnitureItem>, UseCaseError> {
    let lookups = item_ids
        .iter()
        .map(|id| store.get(collections::FURNITURE_ITEMS, id));
    let docs = try_join_all(lookups).await?;
    into_entities(docs.into_iter().flatten().collect())
}

/// Catalog browsing and per-user view history
pub struct FurnitureUseCases {
    store: Arc<dyn DocumentStore>,
}

impl FurnitureUseCases {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Equality filters go to the store; the price range is applied here
    pub async fn list(&self, filter: FurnitureListQuery) -> Result<Vec<FurnitureItem>, UseCaseError> {
        let mut query = Query::new();
        if let Some(category) = filter.category.filter(|c| !c.is_empty()) {
            query = query.where_eq("category", category);
        }
        if let Some(room_type) = filter.room_type.filter(|r| !r.is_empty()) {
            query = query.where_eq("roomType", room_type);
        }

        let items: Vec<FurnitureItem> =
            into_entities(self.store.query(collections::FURNITURE_ITEMS, &query).await?)?;
        Ok(items
            .into_iter()
            .filter(|item| item.price_in(filter.min_price, filter.max_price))
            .collect())
    }

    pub async fn featured(&self) -> Result<Vec<FurnitureItem>, UseCaseError> {
        let query = Query::new()
            .where_eq("featured", true)
            .limit(FEATURED_LIMIT);
        into_entities(self.store.query(collections::FURNITURE_ITEMS, &query).await?)
    }

    pub async fn search(&self, needle: &str) -> Result<Vec<FurnitureItem>, UseCaseError> {
        let items: Vec<FurnitureItem> = into_entities(
            self.store
                .query(collections::FURNITURE_ITEMS, &Query::new())
                .await?,
        )?;
        let matches: Vec<FurnitureItem> = items
            .into_iter()
            .filter(|item| item.matches_text(needle))
            .collect();
        debug!(query = %needle, hits = matches.len(), "Furniture search");
        Ok(matches)
    }

    pub async fn by_room(&self, room_type: &str) -> Result<Vec<FurnitureItem>, UseCaseError> {
        let query = Query::new().where_eq("roomType", room_type);
        into_entities(self.store.query(collections::FURNITURE_ITEMS, &query).await?)
    }

    pub async fn get(&self, item_id: &str) -> Result<FurnitureItem, UseCaseError> {
        load(self.store.as_ref(), collections::FURNITURE_ITEMS, item_id, "Item").await
    }

    /// Adds a catalog entry and returns its id
    pub async fn create(
        &self,
        uid: &str,
        request: NewFurnitureRequest,
    ) -> Result<String, UseCaseError> {
        let now = Utc::now();
        let item = FurnitureItem {
            id: String::new(),
            name: request.name,
            description: request.description,
            category: request.category,
            room_type: request.room_type,
            price: request.price,
            tags: request.tags,
            featured: request.featured,
            model_url: request.model_url,
            thumbnail_url: request.thumbnail_url,
            created_by: Some(uid.to_string()),
            created_at: now,
            updated_at: now,
        };

        let id = self
            .store
            .add(collections::FURNITURE_ITEMS, to_document_data(&item)?)
            .await?;
        info!(item_id = %id, created_by = %uid, "Furniture item created");
        Ok(id)
    }

    /// Last viewed items, most recent first
    pub async fn recently_viewed(&self, uid: &str) -> Result<Vec<FurnitureItem>, UseCaseError> {
        let query = Query::new()
            .order_by("viewedAt", Direction::Desc)
            .limit(RECENTLY_VIEWED_LIMIT);
        let views: Vec<RecentlyViewed> = into_entities(
            self.store
                .query(&collections::recently_viewed(uid), &query)
                .await?,
        )?;

        let ids: Vec<String> = views.into_iter().map(|v| v.item_id).collect();
        resolve_items(self.store.as_ref(), &ids).await
    }

    /// Viewing the same item again only refreshes its timestamp
    pub async fn track_view(&self, uid: &str, item_id: &str) -> Result<(), UseCaseError> {
        self.store
            .set(
                &collections::recently_viewed(uid),
                item_id,
                to_document_data(&RecentlyViewed::new(item_id))?,
                WriteMode::Merge,
            )
            .await?;
        Ok(())
    }
}
