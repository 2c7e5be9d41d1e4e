use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::db::entities::tag;
use crate::db::services::{recipe_service, tag_service};
use crate::db::services::recipe_service::{NewRecipe, RecipeChanges};
use crate::web::error::FieldErrors;
use crate::web::models::{AuthenticatedUser, RecipeResponse};
use crate::web::{AppError, AppState};

// --- Request/Response Structs ---

#[derive(Deserialize)]
pub struct CreateRecipeRequest {
    title: Option<String>,
    description: Option<String>,
    time_minutes: Option<i32>,
    price: Option<f64>,
    link: Option<String>,
    tags: Option<Vec<i32>>,
}

impl CreateRecipeRequest {
    /// Full-payload validation, shared by create and put: required fields
    /// must be present and valid; absent optional fields reset to empty.
    fn into_new_recipe(self) -> Result<NewRecipe, AppError> {
        let mut errors = FieldErrors::new();

        let title = errors.require_string(self.title, "title");

        let time_minutes = match self.time_minutes {
            Some(v) if v >= 0 => v,
            Some(_) => {
                errors.push("time_minutes", "Ensure this value is greater than or equal to 0.");
                0
            }
            None => {
                errors.push("time_minutes", "This field is required.");
                0
            }
        };

        let price = match self.price {
            Some(v) if v >= 0.0 => v,
            Some(_) => {
                errors.push("price", "Ensure this value is greater than or equal to 0.");
                0.0
            }
            None => {
                errors.push("price", "This field is required.");
                0.0
            }
        };

        errors.into_result()?;

        Ok(NewRecipe {
            title,
            description: self.description,
            time_minutes,
            price,
            link: self.link,
            tag_ids: dedupe_ids(self.tags.unwrap_or_default()),
        })
    }
}

#[derive(Deserialize)]
pub struct UpdateRecipeRequest {
    title: Option<String>,
    description: Option<String>,
    time_minutes: Option<i32>,
    price: Option<f64>,
    link: Option<String>,
    tags: Option<Vec<i32>>,
}

impl UpdateRecipeRequest {
    /// Partial-payload validation: only fields that are present are checked.
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        if let Some(title) = &self.title {
            if title.is_empty() {
                errors.push("title", "This field may not be blank.");
            }
        }
        if let Some(time_minutes) = self.time_minutes {
            if time_minutes < 0 {
                errors.push("time_minutes", "Ensure this value is greater than or equal to 0.");
            }
        }
        if let Some(price) = self.price {
            if price < 0.0 {
                errors.push("price", "Ensure this value is greater than or equal to 0.");
            }
        }
        errors.into_result()
    }
}

fn dedupe_ids(mut ids: Vec<i32>) -> Vec<i32> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Resolves `tag_ids` to the caller's tag rows. A tag id that does not
/// resolve to a row owned by the caller is a validation failure on the
/// `tags` field, not a 404.
async fn resolve_tags(
    app_state: &AppState,
    user_id: i32,
    tag_ids: &[i32],
) -> Result<Vec<tag::Model>, AppError> {
    if tag_ids.is_empty() {
        return Ok(Vec::new());
    }

    let owned = tag_service::find_owned_tags(&app_state.db_pool, user_id, tag_ids).await?;
    let owned_ids: HashSet<i32> = owned.iter().map(|t| t.id).collect();

    let mut errors = FieldErrors::new();
    for tag_id in tag_ids {
        if !owned_ids.contains(tag_id) {
            errors.push("tags", &format!("Invalid tag id {tag_id}."));
        }
    }
    errors.into_result()?;

    Ok(owned)
}

// --- Route Handlers ---

async fn create_recipe_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<RecipeResponse>), AppError> {
    let data = payload.into_new_recipe()?;
    let tag_models = resolve_tags(&app_state, authenticated_user.id, &data.tag_ids).await?;

    let recipe_model =
        recipe_service::create_recipe(&app_state.db_pool, authenticated_user.id, data).await?;

    Ok((
        StatusCode::CREATED,
        Json(RecipeResponse::from_model(recipe_model, tag_models)),
    ))
}

async fn list_recipes_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<RecipeResponse>>, AppError> {
    let recipes =
        recipe_service::list_recipes_with_tags(&app_state.db_pool, authenticated_user.id).await?;
    Ok(Json(
        recipes
            .into_iter()
            .map(|(model, tags)| RecipeResponse::from_model(model, tags))
            .collect(),
    ))
}

async fn get_recipe_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(recipe_id): Path<i32>,
) -> Result<Json<RecipeResponse>, AppError> {
    let (model, tags) =
        recipe_service::get_recipe_with_tags(&app_state.db_pool, recipe_id, authenticated_user.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Recipe not found.".to_string()))?;
    Ok(Json(RecipeResponse::from_model(model, tags)))
}

async fn patch_recipe_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(recipe_id): Path<i32>,
    Json(payload): Json<UpdateRecipeRequest>,
) -> Result<Json<RecipeResponse>, AppError> {
    payload.validate()?;

    let tag_ids = payload.tags.map(dedupe_ids);
    if let Some(tag_ids) = &tag_ids {
        resolve_tags(&app_state, authenticated_user.id, tag_ids).await?;
    }

    let changes = RecipeChanges {
        title: payload.title,
        description: payload.description.map(Some),
        time_minutes: payload.time_minutes,
        price: payload.price,
        link: payload.link.map(Some),
        tag_ids,
    };

    let model = recipe_service::update_recipe(
        &app_state.db_pool,
        recipe_id,
        authenticated_user.id,
        changes,
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Recipe not found.".to_string()))?;

    let tags = recipe_service::get_recipe_with_tags(
        &app_state.db_pool,
        model.id,
        authenticated_user.id,
    )
    .await?
    .map(|(_, tags)| tags)
    .unwrap_or_default();

    Ok(Json(RecipeResponse::from_model(model, tags)))
}

async fn put_recipe_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(recipe_id): Path<i32>,
    Json(payload): Json<CreateRecipeRequest>,
) -> Result<Json<RecipeResponse>, AppError> {
    let data = payload.into_new_recipe()?;
    let tag_models = resolve_tags(&app_state, authenticated_user.id, &data.tag_ids).await?;

    // Full update: absent optional fields are cleared, the link set is
    // replaced wholesale.
    let changes = RecipeChanges {
        title: Some(data.title),
        description: Some(data.description),
        time_minutes: Some(data.time_minutes),
        price: Some(data.price),
        link: Some(data.link),
        tag_ids: Some(data.tag_ids),
    };

    let model = recipe_service::update_recipe(
        &app_state.db_pool,
        recipe_id,
        authenticated_user.id,
        changes,
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Recipe not found.".to_string()))?;

    Ok(Json(RecipeResponse::from_model(model, tag_models)))
}

async fn delete_recipe_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(recipe_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let rows_affected =
        recipe_service::delete_recipe(&app_state.db_pool, recipe_id, authenticated_user.id)
            .await?;

    if rows_affected > 0 {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Recipe not found.".to_string()))
    }
}

// --- Router ---

pub fn create_recipes_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_recipes_handler).post(create_recipe_handler))
        .route(
            "/{recipe_id}",
            get(get_recipe_handler)
                .patch(patch_recipe_handler)
                .put(put_recipe_handler)
                .delete(delete_recipe_handler),
        )
}
