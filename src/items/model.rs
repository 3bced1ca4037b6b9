//! Todo item data model — the stored record and its request payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::ItemStatus;

/// Table backing every view of an item.
pub const TABLE_NAME: &str = "todo_items";

/// A single to-do item as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Auto-assigned row id.
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: ItemStatus,
    /// Set once, at insert.
    pub created_at: DateTime<Utc>,
    /// `None` until the first update or delete.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `POST /v1/items`.
///
/// Missing text fields decode as empty strings. A missing `status` leaves the
/// column default (`Doing`) in effect.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TodoItemCreation {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Option<ItemStatus>,
}

/// Body of `PATCH /v1/items/{id}`. Only fields present in the body are written.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TodoItemUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<ItemStatus>,
}

impl TodoItemUpdate {
    /// True when the body carried no fields at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.status.is_none()
    }

    /// Column/value pairs for the fields that are present, in a fixed order.
    pub fn assignments(&self) -> Vec<(&'static str, libsql::Value)> {
        let mut out = Vec::new();
        if let Some(title) = &self.title {
            out.push(("title", libsql::Value::Text(title.clone())));
        }
        if let Some(description) = &self.description {
            out.push(("description", libsql::Value::Text(description.clone())));
        }
        if let Some(status) = self.status {
            out.push(("status", status.to_sql()));
        }
        out
    }
}
