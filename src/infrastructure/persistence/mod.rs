mod memory_document_store;
mod postgres_document_store;
mod query_builder;

pub use memory_document_store::MemoryDocumentStore;
pub use postgres_document_store::PostgresDocumentStore;
pub use query_builder::DocumentSql;
