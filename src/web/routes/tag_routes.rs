use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::services::tag_service;
use crate::web::error::FieldErrors;
use crate::web::models::{AuthenticatedUser, TagResponse};
use crate::web::{AppError, AppState};

// --- Request/Response Structs ---

#[derive(Deserialize)]
pub struct CreateTagRequest {
    name: Option<String>,
}

impl CreateTagRequest {
    /// Full-payload validation, shared by create and put: `name` must be
    /// present and non-empty.
    fn into_name(self) -> Result<String, AppError> {
        let mut errors = FieldErrors::new();
        let name = errors.require_string(self.name, "name");
        errors.into_result()?;
        Ok(name)
    }
}

#[derive(Deserialize)]
pub struct UpdateTagRequest {
    name: Option<String>,
}

impl UpdateTagRequest {
    /// Partial-payload validation: only fields that are present are checked.
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &self.name {
            if name.is_empty() {
                errors.push("name", "This field may not be blank.");
            }
        }
        errors.into_result()
    }
}

// --- Route Handlers ---

async fn create_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<TagResponse>), AppError> {
    let name = payload.into_name()?;
    let tag_model =
        tag_service::create_tag(&app_state.db_pool, authenticated_user.id, &name).await?;
    Ok((StatusCode::CREATED, Json(TagResponse::from(tag_model))))
}

async fn list_tags_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<TagResponse>>, AppError> {
    let tags = tag_service::list_tags(&app_state.db_pool, authenticated_user.id).await?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

async fn get_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<i32>,
) -> Result<Json<TagResponse>, AppError> {
    let tag_model = tag_service::get_tag(&app_state.db_pool, tag_id, authenticated_user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tag not found.".to_string()))?;
    Ok(Json(TagResponse::from(tag_model)))
}

async fn patch_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<i32>,
    Json(payload): Json<UpdateTagRequest>,
) -> Result<Json<TagResponse>, AppError> {
    payload.validate()?;
    let updated = tag_service::update_tag(
        &app_state.db_pool,
        tag_id,
        authenticated_user.id,
        payload.name.as_deref(),
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Tag not found.".to_string()))?;
    Ok(Json(TagResponse::from(updated)))
}

async fn put_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<i32>,
    Json(payload): Json<CreateTagRequest>,
) -> Result<Json<TagResponse>, AppError> {
    let name = payload.into_name()?;
    let updated = tag_service::update_tag(
        &app_state.db_pool,
        tag_id,
        authenticated_user.id,
        Some(name.as_str()),
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Tag not found.".to_string()))?;
    Ok(Json(TagResponse::from(updated)))
}

async fn delete_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let rows_affected =
        tag_service::delete_tag(&app_state.db_pool, tag_id, authenticated_user.id).await?;

    if rows_affected > 0 {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Tag not found.".to_string()))
    }
}

// --- Router ---

pub fn create_tags_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_tags_handler).post(create_tag_handler))
        .route(
            "/{tag_id}",
            get(get_tag_handler)
                .patch(patch_tag_handler)
                .put(put_tag_handler)
                .delete(delete_tag_handler),
        )
}
