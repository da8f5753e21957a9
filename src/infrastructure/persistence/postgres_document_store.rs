use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::query_builder::DocumentSql;
use crate::application::ports::{Document, DocumentStore, Query, StoreError, WriteMode};

/// Documents stored as JSONB rows keyed by `(collection, id)`
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the documents table and its index when missing
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(DocumentSql::CREATE_TABLE)
            .execute(&self.pool)
            .await?;
        sqlx::query(DocumentSql::CREATE_DATA_INDEX)
            .execute(&self.pool)
            .await?;
        info!("Document schema ready");
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    data: Value,
}

impl DocumentRow {
    fn into_document(self) -> Result<Document, StoreError> {
        match self.data {
            Value::Object(map) => Ok(Document::new(self.id, map)),
            other => Err(StoreError::Internal(format!(
                "document {} holds a non-object value: {}",
                self.id, other
            ))),
        }
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, data FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(DocumentRow::into_document).transpose()
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
        mode: WriteMode,
    ) -> Result<(), StoreError> {
        let on_conflict = match mode {
            WriteMode::Replace => "data = EXCLUDED.data",
            WriteMode::Merge => "data = documents.data || EXCLUDED.data",
        };
        let sql = format!(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO UPDATE SET
                {},
                updated_at = now()
            "#,
            on_conflict
        );

        sqlx::query(&sql)
            .bind(collection)
            .bind(id)
            .bind(Value::Object(data))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET data = data || $3, updated_at = now()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Value::Object(patch))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(collection, id));
        }
        Ok(())
    }

    async fn create(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO NOTHING
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Value::Object(data))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn add(&self, collection: &str, data: Map<String, Value>) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        sqlx::query("INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(&id)
            .bind(Value::Object(data))
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let mut builder = DocumentSql::scoped(DocumentSql::SELECT, collection);
        DocumentSql::push_filters(&mut builder, query);
        DocumentSql::push_order_and_limit(&mut builder, query);

        let rows = builder
            .build_query_as::<DocumentRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(DocumentRow::into_document).collect()
    }

    async fn count(&self, collection: &str, query: &Query) -> Result<usize, StoreError> {
        let mut builder = DocumentSql::scoped(DocumentSql::COUNT, collection);
        DocumentSql::push_filters(&mut builder, query);

        let count: i64 = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(usize::try_from(count).unwrap_or_default())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
