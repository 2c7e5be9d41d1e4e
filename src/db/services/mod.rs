//! The `services` module provides a high-level API for interacting with the
//! database. It encapsulates the data access patterns, allowing the rest of
//! the application (the HTTP handlers) to work with domain models without
//! needing to know about the underlying schema or queries.
//!
//! Every query here that touches a user-owned row carries the owner filter;
//! a row belonging to another user is reported exactly like a missing row.

pub mod recipe_service;
pub mod tag_service;
pub mod user_service;

pub use recipe_service::*;
pub use tag_service::*;
pub use user_service::*;
