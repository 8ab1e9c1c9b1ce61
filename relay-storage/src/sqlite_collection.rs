//! SQLite-backed [`Collection`]: one table per collection, documents stored as JSON text.
//!
//! The `id` column is declared without a type so each key keeps the storage class it
//! was bound with: integer keys order numerically, hex object ids lexically.

use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::{Row, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::collection::{
    Collection, Document, Filter, FilterValue, FindOptions, Key, UpsertOutcome,
};
use crate::error::{Result, StorageError};

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

#[derive(Clone)]
pub struct SqliteCollection {
    pool: SqlitePool,
    name: String,
}

impl SqliteCollection {
    /// Opens the collection `name`, creating its table if it does not exist yet.
    pub async fn open(pool: SqlitePool, name: &str) -> Result<Self> {
        if !is_valid_name(name) {
            return Err(StorageError::Config(format!(
                "Invalid collection name: {:?}",
                name
            )));
        }

        sqlx::query(&format!(
            r#"CREATE TABLE IF NOT EXISTS "{}" (id PRIMARY KEY NOT NULL, body TEXT NOT NULL)"#,
            name
        ))
        .execute(&pool)
        .await?;

        info!(collection = name, "Collection ready");
        Ok(Self {
            pool,
            name: name.to_string(),
        })
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn where_clause(filter: &Filter) -> String {
    if filter.conditions().is_empty() {
        return String::new();
    }
    let parts = vec!["json_extract(body, ?) = ?"; filter.conditions().len()];
    format!(" WHERE {}", parts.join(" AND "))
}

fn bind_key<'q>(query: SqliteQuery<'q>, key: &Key) -> SqliteQuery<'q> {
    match key {
        Key::Int(v) => query.bind(*v),
        Key::Text(v) => query.bind(v.clone()),
    }
}

fn bind_filter<'q>(mut query: SqliteQuery<'q>, filter: &Filter) -> SqliteQuery<'q> {
    for (field, value) in filter.conditions() {
        query = query.bind(format!("$.{}", field));
        query = match value {
            FilterValue::Bool(v) => query.bind(*v),
            FilterValue::Int(v) => query.bind(*v),
            FilterValue::Text(v) => query.bind(v.clone()),
        };
    }
    query
}

fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl Collection for SqliteCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find_one(&self, key: &Key) -> Result<Option<Document>> {
        let sql = format!(r#"SELECT body FROM "{}" WHERE id = ?"#, self.name);
        let row = bind_key(sqlx::query(&sql), key)
            .fetch_optional(&self.pool)
            .await?;

        debug!(collection = %self.name, key = %key, found = row.is_some(), "find_one");
        match row {
            Some(row) => {
                let body: String = row.try_get(0)?;
                Ok(Some(serde_json::from_str(&body)?))
            }
            None => Ok(None),
        }
    }

    async fn find(&self, filter: &Filter, options: FindOptions) -> Result<Vec<Document>> {
        let sql = format!(
            r#"SELECT body FROM "{}"{} ORDER BY id ASC LIMIT ? OFFSET ?"#,
            self.name,
            where_clause(filter)
        );
        let limit = options.limit.map(to_sql_int).unwrap_or(-1);
        let rows = bind_filter(sqlx::query(&sql), filter)
            .bind(limit)
            .bind(to_sql_int(options.skip))
            .fetch_all(&self.pool)
            .await?;

        debug!(
            collection = %self.name,
            skip = options.skip,
            limit = ?options.limit,
            returned = rows.len(),
            "find"
        );
        rows.iter()
            .map(|row| -> Result<Document> {
                let body: String = row.try_get(0)?;
                Ok(serde_json::from_str(&body)?)
            })
            .collect()
    }

    async fn count(&self, filter: &Filter) -> Result<u64> {
        let sql = format!(
            r#"SELECT COUNT(*) FROM "{}"{}"#,
            self.name,
            where_clause(filter)
        );
        let row = bind_filter(sqlx::query(&sql), filter)
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.try_get(0)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn insert(&self, key: &Key, document: &Document) -> Result<()> {
        let sql = format!(r#"INSERT INTO "{}" (id, body) VALUES (?, ?)"#, self.name);
        let result = bind_key(sqlx::query(&sql), key)
            .bind(document.to_string())
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => {
                info!(collection = %self.name, key = %key, "Inserted document");
                Ok(())
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(
                StorageError::AlreadyExists(format!("{}/{}", self.name, key)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn upsert(&self, key: &Key, document: &Document) -> Result<UpsertOutcome> {
        let body = document.to_string();
        let mut tx = self.pool.begin().await?;

        let insert = format!(
            r#"INSERT OR IGNORE INTO "{}" (id, body) VALUES (?, ?)"#,
            self.name
        );
        let inserted = bind_key(sqlx::query(&insert), key)
            .bind(body.clone())
            .execute(&mut *tx)
            .await?
            .rows_affected()
            == 1;

        if !inserted {
            let update = format!(r#"UPDATE "{}" SET body = ? WHERE id = ?"#, self.name);
            bind_key(sqlx::query(&update).bind(body), key)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        let outcome = if inserted {
            UpsertOutcome::Inserted
        } else {
            UpsertOutcome::Replaced
        };
        info!(collection = %self.name, key = %key, outcome = ?outcome, "Upserted document");
        Ok(outcome)
    }

    async fn delete(&self, key: &Key) -> Result<bool> {
        let sql = format!(r#"DELETE FROM "{}" WHERE id = ?"#, self.name);
        let result = bind_key(sqlx::query(&sql), key)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        info!(collection = %self.name, key = %key, deleted, "Deleted document");
        Ok(deleted)
    }
}
