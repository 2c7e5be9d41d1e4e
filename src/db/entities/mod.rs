//! SeaORM entities mapping to the database tables.
//!
//! Each entity lives in its own module (`user.rs`, `tag.rs`, `recipe.rs`,
//! `recipe_tag.rs`).

pub mod recipe;
pub mod recipe_tag;
pub mod tag;
pub mod user;
