use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, LoaderTrait,
    ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::db::entities::{recipe, recipe_tag, tag};

// --- Recipe Service Functions ---

/// Fields accepted when creating a recipe. The owner is supplied separately
/// from the caller's identity, never from the payload.
pub struct NewRecipe {
    pub title: String,
    pub description: Option<String>,
    pub time_minutes: i32,
    pub price: f64,
    pub link: Option<String>,
    pub tag_ids: Vec<i32>,
}

/// Field-by-field changes for an update. `None` leaves the stored value
/// untouched; the double options distinguish "leave alone" from "clear".
/// `tag_ids: Some(..)` replaces the full link set.
#[derive(Default)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub time_minutes: Option<i32>,
    pub price: Option<f64>,
    pub link: Option<Option<String>>,
    pub tag_ids: Option<Vec<i32>>,
}

/// Creates a recipe and its tag links in one transaction.
pub async fn create_recipe(
    db: &DatabaseConnection,
    user_id: i32,
    data: NewRecipe,
) -> Result<recipe::Model, DbErr> {
    let txn = db.begin().await?;
    let now = Utc::now();

    let model = recipe::ActiveModel {
        user_id: Set(user_id),
        title: Set(data.title),
        description: Set(data.description),
        time_minutes: Set(data.time_minutes),
        price: Set(data.price),
        link: Set(data.link),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if !data.tag_ids.is_empty() {
        let links = data.tag_ids.iter().map(|tag_id| recipe_tag::ActiveModel {
            recipe_id: Set(model.id),
            tag_id: Set(*tag_id),
        });
        recipe_tag::Entity::insert_many(links).exec(&txn).await?;
    }

    txn.commit().await?;
    Ok(model)
}

/// Retrieves all recipes for a user, most recent first, with their tags.
pub async fn list_recipes_with_tags(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<(recipe::Model, Vec<tag::Model>)>, DbErr> {
    let recipes = recipe::Entity::find()
        .filter(recipe::Column::UserId.eq(user_id))
        .order_by_desc(recipe::Column::Id)
        .all(db)
        .await?;

    let mut tags = recipes
        .load_many_to_many(tag::Entity, recipe_tag::Entity, db)
        .await?;
    for tag_group in &mut tags {
        tag_group.sort_by(|a, b| b.name.cmp(&a.name));
    }

    Ok(recipes.into_iter().zip(tags).collect())
}

/// Looks up a single recipe with its tags. `None` covers both a missing row
/// and a row owned by someone else.
pub async fn get_recipe_with_tags(
    db: &DatabaseConnection,
    recipe_id: i32,
    user_id: i32,
) -> Result<Option<(recipe::Model, Vec<tag::Model>)>, DbErr> {
    let Some(model) = recipe::Entity::find_by_id(recipe_id)
        .filter(recipe::Column::UserId.eq(user_id))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let tags = model
        .find_related(tag::Entity)
        .order_by_desc(tag::Column::Name)
        .all(db)
        .await?;

    Ok(Some((model, tags)))
}

/// Applies `changes` to a recipe in one transaction. Returns `None` when the
/// recipe does not exist for this user; no write happens in that case.
pub async fn update_recipe(
    db: &DatabaseConnection,
    recipe_id: i32,
    user_id: i32,
    changes: RecipeChanges,
) -> Result<Option<recipe::Model>, DbErr> {
    let txn = db.begin().await?;

    let Some(existing) = recipe::Entity::find_by_id(recipe_id)
        .filter(recipe::Column::UserId.eq(user_id))
        .one(&txn)
        .await?
    else {
        txn.rollback().await?;
        return Ok(None);
    };

    let mut active: recipe::ActiveModel = existing.into();
    if let Some(title) = changes.title {
        active.title = Set(title);
    }
    if let Some(description) = changes.description {
        active.description = Set(description);
    }
    if let Some(time_minutes) = changes.time_minutes {
        active.time_minutes = Set(time_minutes);
    }
    if let Some(price) = changes.price {
        active.price = Set(price);
    }
    if let Some(link) = changes.link {
        active.link = Set(link);
    }
    active.updated_at = Set(Utc::now());
    let model = active.update(&txn).await?;

    if let Some(tag_ids) = changes.tag_ids {
        recipe_tag::Entity::delete_many()
            .filter(recipe_tag::Column::RecipeId.eq(model.id))
            .exec(&txn)
            .await?;
        if !tag_ids.is_empty() {
            let links = tag_ids.iter().map(|tag_id| recipe_tag::ActiveModel {
                recipe_id: Set(model.id),
                tag_id: Set(*tag_id),
            });
            recipe_tag::Entity::insert_many(links).exec(&txn).await?;
        }
    }

    txn.commit().await?;
    Ok(Some(model))
}

/// Deletes a recipe together with its tag links. Returns the number of
/// recipe rows removed; 0 covers both a missing row and a foreign owner.
pub async fn delete_recipe(
    db: &DatabaseConnection,
    recipe_id: i32,
    user_id: i32,
) -> Result<u64, DbErr> {
    let txn = db.begin().await?;

    let Some(existing) = recipe::Entity::find_by_id(recipe_id)
        .filter(recipe::Column::UserId.eq(user_id))
        .one(&txn)
        .await?
    else {
        txn.rollback().await?;
        return Ok(0);
    };

    recipe_tag::Entity::delete_many()
        .filter(recipe_tag::Column::RecipeId.eq(existing.id))
        .exec(&txn)
        .await?;

    let rows_affected = recipe::Entity::delete_by_id(existing.id)
        .exec(&txn)
        .await?
        .rows_affected;

    txn.commit().await?;
    Ok(rows_affected)
}
