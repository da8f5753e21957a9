mod accounts;
mod designs;
mod favorites;
mod furniture;
mod projects;
mod users;

pub use accounts::AccountUseCases;
pub use designs::DesignUseCases;
pub use favorites::FavoriteUseCases;
pub use furniture::{FurnitureUseCases, FEATURED_LIMIT, RECENTLY_VIEWED_LIMIT};
pub use projects::{Collaborator, ProjectUseCases};
pub use users::{UserUseCases, DEFAULT_SEARCH_LIMIT};

use serde::de::DeserializeOwned;

use crate::application::errors::UseCaseError;
use crate::application::ports::{Document, DocumentStore};

/// Load a document as an entity, or `"<what> not found"`
pub(crate) async fn load<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
    what: &str,
) -> Result<T, UseCaseError> {
    match store.get(collection, id).await? {
        Some(doc) => Ok(doc.into_entity()?),
        None => Err(UseCaseError::not_found(what)),
    }
}

pub(crate) fn into_entities<T: DeserializeOwned>(
    docs: Vec<Document>,
) -> Result<Vec<T>, UseCaseError> {
    docs.into_iter()
        .map(|doc| doc.into_entity().map_err(UseCaseError::from))
        .collect()
}
