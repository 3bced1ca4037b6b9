//! Todo Service — CRUD over HTTP for a single to-do item resource.

pub mod common;
pub mod config;
pub mod error;
pub mod items;
pub mod server;
pub mod store;
