//! `Database` trait — the single async interface handlers persist through.

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::items::model::{TodoItem, TodoItemCreation, TodoItemUpdate};

/// Backend-agnostic storage for to-do items.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    /// Insert a new item. Returns the assigned id.
    async fn create_item(&self, item: &TodoItemCreation) -> Result<i64, DatabaseError>;

    /// Get an item by id, whatever its status.
    ///
    /// A missing row is [`DatabaseError::NotFound`].
    async fn get_item(&self, id: i64) -> Result<TodoItem, DatabaseError>;

    /// Count items that are not soft-deleted.
    async fn count_items(&self) -> Result<i64, DatabaseError>;

    /// Items that are not soft-deleted, newest id first.
    async fn list_items(&self, offset: i64, limit: i64) -> Result<Vec<TodoItem>, DatabaseError>;

    /// Write the fields present in `update` to the row with `id`.
    /// Returns the number of rows touched; zero is not an error.
    async fn update_item(&self, id: i64, update: &TodoItemUpdate) -> Result<u64, DatabaseError>;

    /// Mark the row with `id` as `Deleted`. Returns the number of rows touched.
    async fn soft_delete_item(&self, id: i64) -> Result<u64, DatabaseError>;
}
