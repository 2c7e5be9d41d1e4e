use axum::{
    Json,
    extract::{Extension, State},
};
use bcrypt::{DEFAULT_COST, hash};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::entities::user;
use crate::db::services::user_service;
use crate::web::error::FieldErrors;
use crate::web::models::{AuthenticatedUser, UserResponse};
use crate::web::{AppError, AppState};

// --- Request/Response Structs ---

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    name: Option<String>,
    password: Option<String>,
}

impl UpdateProfileRequest {
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &self.name {
            if name.is_empty() {
                errors.push("name", "This field may not be blank.");
            }
        }
        if let Some(password) = &self.password {
            if password.len() < 8 {
                errors.push("password", "Ensure this field has at least 8 characters.");
            }
        }
        errors.into_result()
    }
}

// --- Route Handlers ---

pub async fn me(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<UserResponse>, AppError> {
    let user_model = user_service::find_user_by_id(&app_state.db_pool, authenticated_user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;
    Ok(Json(UserResponse::from(user_model)))
}

pub async fn update_me(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    payload.validate()?;

    let user_model = user_service::find_user_by_id(&app_state.db_pool, authenticated_user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

    let mut active: user::ActiveModel = user_model.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(password) = payload.password {
        let password_hash = hash(&password, DEFAULT_COST)
            .map_err(|e| AppError::PasswordHashingError(e.to_string()))?;
        active.password_hash = Set(password_hash);
    }
    active.updated_at = Set(Utc::now());
    let updated = active.update(&app_state.db_pool).await?;

    Ok(Json(UserResponse::from(updated)))
}
