use sqlx::{Postgres, QueryBuilder};

use crate::application::ports::{Direction, Filter, FilterOp, Query};

/// SQL fragments for the JSONB documents table
pub struct DocumentSql;

impl DocumentSql {
    pub const CREATE_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            data JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            PRIMARY KEY (collection, id)
        )
    "#;

    pub const CREATE_DATA_INDEX: &'static str = r#"
        CREATE INDEX IF NOT EXISTS documents_data_idx
        ON documents USING GIN (data jsonb_path_ops)
    "#;

    pub const SELECT: &'static str = "SELECT id, data FROM documents WHERE collection = ";

    pub const COUNT: &'static str = "SELECT COUNT(*) FROM documents WHERE collection = ";

    fn operator(op: FilterOp) -> &'static str {
        match op {
            FilterOp::Eq => "=",
            FilterOp::Gt => ">",
            FilterOp::Gte => ">=",
            FilterOp::Lt => "<",
            FilterOp::Lte => "<=",
        }
    }

    /// Start a statement scoped to one collection
    pub fn scoped<'a>(base: &str, collection: &'a str) -> QueryBuilder<'a, Postgres> {
        let mut builder = QueryBuilder::new(base);
        builder.push_bind(collection);
        builder
    }

    /// Append `AND` conditions for every filter in `query`
    pub fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, query: &'a Query) {
        for filter in &query.filters {
            match filter {
                Filter::Field { field, op, value } => {
                    builder.push(" AND data -> ");
                    builder.push_bind(field.as_str());
                    builder.push(format!(" {} ", Self::operator(*op)));
                    builder.push_bind(value);
                }
                Filter::IdIn(ids) => {
                    builder.push(" AND id = ANY(");
                    builder.push_bind(ids.as_slice());
                    builder.push(")");
                }
            }
        }
    }

    /// Append `ORDER BY` and `LIMIT` clauses
    pub fn push_order_and_limit<'a>(builder: &mut QueryBuilder<'a, Postgres>, query: &'a Query) {
        if let Some((field, direction)) = &query.order_by {
            builder.push(" ORDER BY data -> ");
            builder.push_bind(field.as_str());
            builder.push(match direction {
                Direction::Asc => " ASC",
                Direction::Desc => " DESC",
            });
        } else {
            builder.push(" ORDER BY id ASC");
        }

        if let Some(limit) = query.limit {
            builder.push(" LIMIT ");
            builder.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_with_filters_and_order() {
        let query = Query::new()
            .where_eq("userId", "u1")
            .filter("price", FilterOp::Lte, 100)
            .id_in(vec!["a".into()])
            .order_by("createdAt", Direction::Desc)
            .limit(5);

        let mut builder = DocumentSql::scoped(DocumentSql::SELECT, "projects");
        DocumentSql::push_filters(&mut builder, &query);
        DocumentSql::push_order_and_limit(&mut builder, &query);

        assert_eq!(
            builder.sql(),
            "SELECT id, data FROM documents WHERE collection = $1 \
             AND data -> $2 = $3 AND data -> $4 <= $5 AND id = ANY($6) \
             ORDER BY data -> $7 DESC LIMIT $8"
        );
    }

    #[test]
    fn test_unordered_queries_sort_by_id() {
        let query = Query::new();
        let mut builder = DocumentSql::scoped(DocumentSql::SELECT, "users");
        DocumentSql::push_order_and_limit(&mut builder, &query);
        assert!(builder.sql().ends_with("ORDER BY id ASC"));
    }
}
