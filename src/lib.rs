//! Blog post API library.
//!
//! A JSON service for creating, reading, updating, deleting, voting on,
//! filtering and paginating blog posts, with nested CRUD for comments.

pub mod config;
pub mod db;
pub mod pagination;
pub mod validate;
pub mod web;
