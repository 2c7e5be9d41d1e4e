pub mod entities;
pub mod services;

use sea_orm::{ConnectionTrait, DbErr, Schema};

/// Creates the application tables if they do not exist yet.
///
/// Schema bootstrap is derived from the entity definitions at startup; there
/// is no separate migrations tool. Parent tables must be created before the
/// tables referencing them.
pub async fn create_tables<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    for mut stmt in [
        schema.create_table_from_entity(entities::user::Entity),
        schema.create_table_from_entity(entities::tag::Entity),
        schema.create_table_from_entity(entities::recipe::Entity),
        schema.create_table_from_entity(entities::recipe_tag::Entity),
    ] {
        stmt.if_not_exists();
        db.execute(backend.build(&stmt)).await?;
    }

    Ok(())
}
