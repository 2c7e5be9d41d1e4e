use serde::{Deserialize, Serialize};

use crate::db::entities::{recipe, tag, user};

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub name: String,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        UserResponse {
            id: model.id,
            email: model.email,
            name: model.name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i32,
    pub email: String,
}

// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (email)
    pub user_id: i32,
    pub exp: usize, // Expiration time (timestamp)
}

/// Authenticated user details, passed to handlers as a request extension.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TagResponse {
    pub id: i32,
    pub name: String,
}

impl From<tag::Model> for TagResponse {
    fn from(model: tag::Model) -> Self {
        TagResponse {
            id: model.id,
            name: model.name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub time_minutes: i32,
    pub price: f64,
    pub link: Option<String>,
    pub tags: Vec<TagResponse>,
}

impl RecipeResponse {
    pub fn from_model(model: recipe::Model, tags: Vec<tag::Model>) -> Self {
        RecipeResponse {
            id: model.id,
            title: model.title,
            description: model.description,
            time_minutes: model.time_minutes,
            price: model.price,
            link: model.link,
            tags: tags.into_iter().map(TagResponse::from).collect(),
        }
    }
}
