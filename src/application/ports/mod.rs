mod document_store;
mod identity_provider;

pub use document_store::{
    to_document_data, Direction, Document, DocumentStore, Filter, FilterOp, Query, StoreError,
    WriteMode,
};
pub use identity_provider::{
    AccountUpdate, IdentityError, IdentityProvider, IdentityRecord, IssuedToken, NewAccount,
};

#[cfg(test)]
pub use document_store::MockDocumentStore;
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
