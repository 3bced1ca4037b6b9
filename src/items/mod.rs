//! To-do items — status codec, data model, and HTTP handlers.

pub mod model;
pub mod routes;
pub mod status;

pub use model::{TodoItem, TodoItemCreation, TodoItemUpdate};
pub use status::ItemStatus;
