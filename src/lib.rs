//! Terminal task manager built around a debounced task search.
//!
//! Tasks and categories live in JSON files under the data directory; the
//! search engine in [`search`] filters the task list by a text query and by
//! status, priority, category and due-date window.

pub mod auth;
pub mod categories;
pub mod chat;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod search;
pub mod storage;
pub mod tasks;
pub mod theme;
pub mod tui;
pub mod validation;
