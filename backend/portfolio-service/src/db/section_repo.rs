/// Section repository - database operations for the section hierarchy
use crate::error::Result;
use crate::models::Section;
use sqlx::PgPool;

pub async fn list_sections(pool: &PgPool) -> Result<Vec<Section>> {
    let sections = sqlx::query_as::<_, Section>(
        "SELECT id, name, path, parent_id FROM sections ORDER BY path",
    )
    .fetch_all(pool)
    .await?;

    Ok(sections)
}

pub async fn find_by_path(pool: &PgPool, path: &str) -> Result<Option<Section>> {
    let section = sqlx::query_as::<_, Section>(
        "SELECT id, name, path, parent_id FROM sections WHERE path = $1",
    )
    .bind(path)
    .fetch_optional(pool)
    .await?;

    Ok(section)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Section>> {
    let section =
        sqlx::query_as::<_, Section>("SELECT id, name, path, parent_id FROM sections WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(section)
}

/// Direct children only, ordered by name
pub async fn list_children(pool: &PgPool, parent_id: i32) -> Result<Vec<Section>> {
    let sections = sqlx::query_as::<_, Section>(
        "SELECT id, name, path, parent_id FROM sections WHERE parent_id = $1 ORDER BY name",
    )
    .bind(parent_id)
    .fetch_all(pool)
    .await?;

    Ok(sections)
}
