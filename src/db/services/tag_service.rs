use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::db::entities::{recipe_tag, tag};

// --- Tag Service Functions ---

/// Creates a new tag owned by `user_id`.
pub async fn create_tag(
    db: &DatabaseConnection,
    user_id: i32,
    name: &str,
) -> Result<tag::Model, DbErr> {
    let now = Utc::now();
    tag::ActiveModel {
        user_id: Set(user_id),
        name: Set(name.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Retrieves all tags for a user, ordered by name descending.
pub async fn list_tags(db: &DatabaseConnection, user_id: i32) -> Result<Vec<tag::Model>, DbErr> {
    tag::Entity::find()
        .filter(tag::Column::UserId.eq(user_id))
        .order_by_desc(tag::Column::Name)
        .all(db)
        .await
}

/// Looks up a single tag. `None` covers both a missing row and a row owned
/// by someone else.
pub async fn get_tag(
    db: &DatabaseConnection,
    tag_id: i32,
    user_id: i32,
) -> Result<Option<tag::Model>, DbErr> {
    tag::Entity::find_by_id(tag_id)
        .filter(tag::Column::UserId.eq(user_id))
        .one(db)
        .await
}

/// Resolves the subset of `tag_ids` that are owned by `user_id`, ordered by
/// name descending.
pub async fn find_owned_tags(
    db: &DatabaseConnection,
    user_id: i32,
    tag_ids: &[i32],
) -> Result<Vec<tag::Model>, DbErr> {
    tag::Entity::find()
        .filter(tag::Column::UserId.eq(user_id))
        .filter(tag::Column::Id.is_in(tag_ids.iter().copied()))
        .order_by_desc(tag::Column::Name)
        .all(db)
        .await
}

/// Updates a tag's fields. A `None` name leaves the stored value untouched.
/// Returns `None` when the tag does not exist for this user.
pub async fn update_tag(
    db: &DatabaseConnection,
    tag_id: i32,
    user_id: i32,
    name: Option<&str>,
) -> Result<Option<tag::Model>, DbErr> {
    let Some(existing) = get_tag(db, tag_id, user_id).await? else {
        return Ok(None);
    };

    let mut active: tag::ActiveModel = existing.into();
    if let Some(name) = name {
        active.name = Set(name.to_string());
    }
    active.updated_at = Set(Utc::now());

    active.update(db).await.map(Some)
}

/// Deletes a tag together with its recipe links. Returns the number of tag
/// rows removed; 0 covers both a missing row and a foreign owner.
pub async fn delete_tag(db: &DatabaseConnection, tag_id: i32, user_id: i32) -> Result<u64, DbErr> {
    let txn = db.begin().await?;

    let Some(existing) = tag::Entity::find_by_id(tag_id)
        .filter(tag::Column::UserId.eq(user_id))
        .one(&txn)
        .await?
    else {
        txn.rollback().await?;
        return Ok(0);
    };

    recipe_tag::Entity::delete_many()
        .filter(recipe_tag::Column::TagId.eq(existing.id))
        .exec(&txn)
        .await?;

    let rows_affected = tag::Entity::delete_by_id(existing.id)
        .exec(&txn)
        .await?
        .rows_affected;

    txn.commit().await?;
    Ok(rows_affected)
}
