//! libSQL backend — async `Database` trait implementation.
//!
//! Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, Value, params};
use tracing::{debug, info};

use crate::error::DatabaseError;
use crate::items::model::{TABLE_NAME, TodoItem, TodoItemCreation, TodoItemUpdate};
use crate::items::status::ItemStatus;
use crate::store::migrations;
use crate::store::traits::Database;

/// Connection string selecting a private in-memory database.
pub const MEMORY: &str = ":memory:";

const ITEM_COLUMNS: &str = "id, title, description, status, created_at, updated_at";

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open the database named by a connection string and run migrations.
    ///
    /// `:memory:` selects an in-memory database; anything else is a file path.
    pub async fn open(conn_str: &str) -> Result<Self, DatabaseError> {
        if conn_str == MEMORY {
            Self::new_memory().await
        } else {
            Self::new_local(Path::new(conn_str)).await
        }
    }

    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db)?;
        backend.run_migrations().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(MEMORY)
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let backend = Self::from_database(db)?;
        backend.run_migrations().await?;
        Ok(backend)
    }

    fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    /// Get the connection.
    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    // SQLite datetime() output, with or without fractional seconds
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(ndt.and_utc());
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(ndt.and_utc());
    }
    Err(DatabaseError::Decode(format!("timestamp: {s}")))
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

/// Read a text column. NULL reads as an empty string; blobs must be UTF-8.
fn text_column(row: &libsql::Row, idx: i32, name: &str) -> Result<String, DatabaseError> {
    match column_value(row, idx, name)? {
        Value::Text(text) => Ok(text),
        Value::Null => Ok(String::new()),
        Value::Blob(bytes) => String::from_utf8(bytes)
            .map_err(|e| DatabaseError::Decode(format!("{name}: {e}"))),
        other => Err(DatabaseError::Decode(format!("{name}: {other:?}"))),
    }
}

fn column_value(row: &libsql::Row, idx: i32, name: &str) -> Result<Value, DatabaseError> {
    row.get_value(idx)
        .map_err(|e| DatabaseError::Query(format!("todo_item.{name}: {e}")))
}

/// Map a libsql Row to a TodoItem.
///
/// Column order matches ITEM_COLUMNS:
/// 0:id, 1:title, 2:description, 3:status, 4:created_at, 5:updated_at
fn row_to_item(row: &libsql::Row) -> Result<TodoItem, DatabaseError> {
    let id: i64 = row
        .get(0)
        .map_err(|e| DatabaseError::Query(format!("todo_item.id: {e}")))?;
    let title = text_column(row, 1, "title")?;
    let description = text_column(row, 2, "description")?;
    let status = ItemStatus::from_sql(column_value(row, 3, "status")?)?;
    let created_at = parse_datetime(&text_column(row, 4, "created_at")?)?;
    let updated_at = match column_value(row, 5, "updated_at")? {
        Value::Null => None,
        Value::Text(text) => Some(parse_datetime(&text)?),
        other => return Err(DatabaseError::Decode(format!("updated_at: {other:?}"))),
    };

    Ok(TodoItem {
        id,
        title,
        description,
        status,
        created_at,
        updated_at,
    })
}

/// Build `UPDATE todo_items SET a = ?1, b = ?2, updated_at = ?n WHERE id = ?n+1`.
fn update_statement(columns: &[&str]) -> String {
    let mut sets: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{column} = ?{}", i + 1))
        .collect();
    sets.push(format!("updated_at = ?{}", columns.len() + 1));
    format!(
        "UPDATE {TABLE_NAME} SET {} WHERE id = ?{}",
        sets.join(", "),
        columns.len() + 2
    )
}

#[async_trait]
impl Database for LibSqlBackend {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    async fn create_item(&self, item: &TodoItemCreation) -> Result<i64, DatabaseError> {
        let conn = self.conn();
        // Without a status the column default applies.
        let mut rows = match item.status {
            Some(status) => {
                conn.query(
                    &format!(
                        "INSERT INTO {TABLE_NAME} (title, description, status, created_at)
                         VALUES (?1, ?2, ?3, ?4) RETURNING id"
                    ),
                    params![
                        item.title.as_str(),
                        item.description.as_str(),
                        status.to_sql(),
                        now(),
                    ],
                )
                .await
            }
            None => {
                conn.query(
                    &format!(
                        "INSERT INTO {TABLE_NAME} (title, description, created_at)
                         VALUES (?1, ?2, ?3) RETURNING id"
                    ),
                    params![item.title.as_str(), item.description.as_str(), now()],
                )
                .await
            }
        }
        .map_err(|e| DatabaseError::from_write("create_item", e))?;

        let row = rows
            .next()
            .await
            .map_err(|e| DatabaseError::from_write("create_item", e))?
            .ok_or_else(|| DatabaseError::Query("create_item: no id returned".into()))?;
        let id: i64 = row
            .get(0)
            .map_err(|e| DatabaseError::Query(format!("create_item id: {e}")))?;
        debug!(id, "Todo item created");
        Ok(id)
    }

    async fn get_item(&self, id: i64) -> Result<TodoItem, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {ITEM_COLUMNS} FROM {TABLE_NAME} WHERE id = ?1"),
                params![id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_item: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => row_to_item(&row),
            Ok(None) => Err(DatabaseError::NotFound {
                entity: "todo_item".into(),
                id: id.to_string(),
            }),
            Err(e) => Err(DatabaseError::Query(format!("get_item row: {e}"))),
        }
    }

    async fn count_items(&self) -> Result<i64, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT COUNT(*) FROM {TABLE_NAME} WHERE status <> ?1"),
                params![ItemStatus::Deleted.to_sql()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("count_items: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => row
                .get::<i64>(0)
                .map_err(|e| DatabaseError::Query(format!("count_items value: {e}"))),
            Ok(None) => Ok(0),
            Err(e) => Err(DatabaseError::Query(format!("count_items row: {e}"))),
        }
    }

    async fn list_items(&self, offset: i64, limit: i64) -> Result<Vec<TodoItem>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {ITEM_COLUMNS} FROM {TABLE_NAME} WHERE status <> ?1
                     ORDER BY id DESC LIMIT ?2 OFFSET ?3"
                ),
                params![ItemStatus::Deleted.to_sql(), limit, offset],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_items: {e}")))?;

        let mut items = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("list_items row: {e}")))?
        {
            items.push(row_to_item(&row)?);
        }
        Ok(items)
    }

    async fn update_item(&self, id: i64, update: &TodoItemUpdate) -> Result<u64, DatabaseError> {
        let assignments = update.assignments();
        if assignments.is_empty() {
            debug!(id, "Empty update, nothing written");
            return Ok(0);
        }

        let columns: Vec<&str> = assignments.iter().map(|(column, _)| *column).collect();
        let mut values: Vec<Value> = assignments.into_iter().map(|(_, value)| value).collect();
        values.push(Value::Text(now()));
        values.push(Value::Integer(id));

        let affected = self
            .conn()
            .execute(&update_statement(&columns), libsql::params_from_iter(values))
            .await
            .map_err(|e| DatabaseError::from_write("update_item", e))?;
        debug!(id, affected, "Todo item updated");
        Ok(affected)
    }

    async fn soft_delete_item(&self, id: i64) -> Result<u64, DatabaseError> {
        let affected = self
            .conn()
            .execute(
                &format!("UPDATE {TABLE_NAME} SET status = ?1, updated_at = ?2 WHERE id = ?3"),
                params![ItemStatus::Deleted.to_sql(), now(), id],
            )
            .await
            .map_err(|e| DatabaseError::from_write("soft_delete_item", e))?;
        debug!(id, affected, "Todo item soft-deleted");
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> LibSqlBackend {
        LibSqlBackend::new_memory().await.unwrap()
    }

    fn creation(title: &str, description: &str) -> TodoItemCreation {
        TodoItemCreation {
            title: title.into(),
            description: description.into(),
            status: None,
        }
    }

    #[test]
    fn update_statement_numbers_placeholders() {
        assert_eq!(
            update_statement(&["title", "status"]),
            "UPDATE todo_items SET title = ?1, status = ?2, updated_at = ?3 WHERE id = ?4"
        );
    }

    #[test]
    fn parses_both_timestamp_formats() {
        assert!(parse_datetime("2024-01-08T16:53:54.942405Z").is_ok());
        assert!(parse_datetime("2024-01-08 16:53:54").is_ok());
        assert!(parse_datetime("yesterday").is_err());
    }

    #[tokio::test]
    async fn create_and_get() {
        let db = test_db().await;
        let id = db.create_item(&creation("A", "B")).await.unwrap();
        assert!(id > 0);

        let item = db.get_item(id).await.unwrap();
        assert_eq!(item.id, id);
        assert_eq!(item.title, "A");
        assert_eq!(item.description, "B");
        assert_eq!(item.status, ItemStatus::Doing);
        assert!(item.updated_at.is_none());
    }

    #[tokio::test]
    async fn create_with_explicit_status() {
        let db = test_db().await;
        let mut data = creation("A", "B");
        data.status = Some(ItemStatus::Done);
        let id = db.create_item(&data).await.unwrap();
        assert_eq!(db.get_item(id).await.unwrap().status, ItemStatus::Done);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let db = test_db().await;
        let err = db.get_item(42).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[tokio::test]
    async fn ids_are_sequential() {
        let db = test_db().await;
        let first = db.create_item(&creation("1", "")).await.unwrap();
        let second = db.create_item(&creation("2", "")).await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn partial_update_touches_only_present_fields() {
        let db = test_db().await;
        let id = db.create_item(&creation("A", "B")).await.unwrap();

        let update = TodoItemUpdate {
            status: Some(ItemStatus::Done),
            ..Default::default()
        };
        assert_eq!(db.update_item(id, &update).await.unwrap(), 1);

        let item = db.get_item(id).await.unwrap();
        assert_eq!(item.status, ItemStatus::Done);
        assert_eq!(item.title, "A");
        assert_eq!(item.description, "B");
        assert!(item.updated_at.is_some());
    }

    #[tokio::test]
    async fn update_missing_row_affects_nothing() {
        let db = test_db().await;
        let update = TodoItemUpdate {
            title: Some("x".into()),
            ..Default::default()
        };
        assert_eq!(db.update_item(999, &update).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_update_writes_nothing() {
        let db = test_db().await;
        let id = db.create_item(&creation("A", "B")).await.unwrap();
        assert_eq!(
            db.update_item(id, &TodoItemUpdate::default()).await.unwrap(),
            0
        );
        assert!(db.get_item(id).await.unwrap().updated_at.is_none());
    }

    #[tokio::test]
    async fn soft_delete_hides_from_list_but_not_get() {
        let db = test_db().await;
        let keep = db.create_item(&creation("keep", "")).await.unwrap();
        let gone = db.create_item(&creation("gone", "")).await.unwrap();

        assert_eq!(db.soft_delete_item(gone).await.unwrap(), 1);

        let item = db.get_item(gone).await.unwrap();
        assert_eq!(item.status, ItemStatus::Deleted);
        assert!(item.updated_at.is_some());

        assert_eq!(db.count_items().await.unwrap(), 1);
        let listed = db.list_items(0, 10).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, keep);
    }

    #[tokio::test]
    async fn list_pages_newest_id_first() {
        let db = test_db().await;
        for n in 0..15 {
            db.create_item(&creation(&format!("item {n}"), "")).await.unwrap();
        }

        assert_eq!(db.count_items().await.unwrap(), 15);

        let first: Vec<i64> = db
            .list_items(0, 10)
            .await
            .unwrap()
            .iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(first, (6..=15).rev().collect::<Vec<_>>());

        let second: Vec<i64> = db
            .list_items(10, 10)
            .await
            .unwrap()
            .iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(second, vec![5, 4, 3, 2, 1]);
    }

    #[tokio::test]
    async fn unknown_stored_status_is_a_decode_error() {
        let db = test_db().await;
        // Scratch table has no CHECK constraint on status.
        db.conn()
            .execute(
                "CREATE TABLE scratch AS SELECT 1 AS id, 'x' AS title, '' AS description, \
                 'Archived' AS status, '2024-01-01 00:00:00' AS created_at, NULL AS updated_at",
                (),
            )
            .await
            .unwrap();
        let mut rows = db
            .conn()
            .query(&format!("SELECT {ITEM_COLUMNS} FROM scratch"), ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        let err = row_to_item(&row).unwrap_err();
        assert!(matches!(err, DatabaseError::Decode(_)));
    }

    #[tokio::test]
    async fn open_file_database() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("todo.db");
        let db = LibSqlBackend::open(path.to_str().unwrap()).await.unwrap();
        let id = db.create_item(&creation("on disk", "")).await.unwrap();
        drop(db);

        assert!(path.exists());
        let reopened = LibSqlBackend::open(path.to_str().unwrap()).await.unwrap();
        assert_eq!(reopened.get_item(id).await.unwrap().title, "on disk");
    }
}
