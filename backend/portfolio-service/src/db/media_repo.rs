/// Media repository - database operations for uploaded media
use crate::error::Result;
use crate::models::{Media, MediaFilter, NewMedia};
use sqlx::{PgPool, Postgres, QueryBuilder};

const MEDIA_COLUMNS: &str =
    "id, s3_key, section_id, tags, type, width, height, uploaded_by, uploaded_at";

/// Media whose key lives under `<path>/`
pub async fn list_by_key_prefix(pool: &PgPool, path: &str) -> Result<Vec<Media>> {
    let pattern = format!("{}/%", escape_like(path.trim_end_matches('/')));

    let media = sqlx::query_as::<_, Media>(&format!(
        r"SELECT {MEDIA_COLUMNS} FROM media WHERE s3_key LIKE $1 ESCAPE '\' ORDER BY id"
    ))
    .bind(pattern)
    .fetch_all(pool)
    .await?;

    Ok(media)
}

pub async fn list_by_section_id(pool: &PgPool, section_id: i32) -> Result<Vec<Media>> {
    let media = sqlx::query_as::<_, Media>(&format!(
        "SELECT {MEDIA_COLUMNS} FROM media WHERE section_id = $1 ORDER BY id"
    ))
    .bind(section_id)
    .fetch_all(pool)
    .await?;

    Ok(media)
}

/// Media of the section at `filter.section_path`, filtered and ordered
pub async fn list_by_section_path(pool: &PgPool, filter: &MediaFilter) -> Result<Vec<Media>> {
    let mut query = section_media_query(filter);
    let media = query
        .build_query_as::<Media>()
        .fetch_all(pool)
        .await?;

    Ok(media)
}

pub(crate) fn section_media_query(filter: &MediaFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!(
        "SELECT {MEDIA_COLUMNS} FROM media WHERE section_id = (SELECT id FROM sections WHERE path = "
    ));
    query.push_bind(filter.section_path.clone()).push(")");

    if let Some(file_type) = &filter.file_type {
        query.push(" AND type = ").push_bind(file_type.clone());
    }
    if !filter.tags.is_empty() {
        query.push(" AND tags && ").push_bind(filter.tags.clone());
    }

    // order_clause only yields whitelisted column names
    query.push(" ORDER BY ").push(filter.order_clause());
    query
}

pub async fn list_by_uploader(pool: &PgPool, user_id: i32) -> Result<Vec<Media>> {
    let media = sqlx::query_as::<_, Media>(&format!(
        "SELECT {MEDIA_COLUMNS} FROM media WHERE uploaded_by = $1 ORDER BY uploaded_at DESC, id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(media)
}

/// Insert every item or none of them.
///
/// `section_id` is resolved from each item's `section_path`; an unknown path
/// stores NULL. Items without `uploaded_by` are attributed to `default_uploader`.
pub async fn insert_many(
    pool: &PgPool,
    items: &[NewMedia],
    default_uploader: i32,
) -> Result<Vec<Media>> {
    let mut tx = pool.begin().await?;
    let mut saved = Vec::with_capacity(items.len());

    for item in items {
        let media = sqlx::query_as::<_, Media>(&format!(
            r#"
            INSERT INTO media (s3_key, section_id, tags, type, width, height, uploaded_by)
            VALUES ($1, (SELECT id FROM sections WHERE path = $2), $3, $4, $5, $6, $7)
            RETURNING {MEDIA_COLUMNS}
            "#
        ))
        .bind(&item.s3_key)
        .bind(item.section_path.as_deref().map(|p| p.trim_matches('/')))
        .bind(item.normalized_tags())
        .bind(item.media_type.as_str())
        .bind(item.width)
        .bind(item.height)
        .bind(item.uploaded_by.unwrap_or(default_uploader))
        .fetch_one(tx.as_mut())
        .await?;

        saved.push(media);
    }

    tx.commit().await?;
    Ok(saved)
}

/// Storage keys of the given media ids; unknown ids are ignored
pub async fn keys_for_ids(pool: &PgPool, ids: &[i32]) -> Result<Vec<String>> {
    let keys = sqlx::query_scalar::<_, String>("SELECT s3_key FROM media WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;

    Ok(keys)
}

/// Returns the number of rows removed
pub async fn delete_by_ids(pool: &PgPool, ids: &[i32]) -> Result<u64> {
    let result = sqlx::query("DELETE FROM media WHERE id = ANY($1)")
        .bind(ids)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Escape `LIKE` wildcards so the input matches literally
pub(crate) fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MediaQuery, SortField, SortOrder};

    fn filter() -> MediaFilter {
        MediaFilter::from_query(&MediaQuery {
            section_path: Some("travel/japan".to_string()),
            ..MediaQuery::default()
        })
        .unwrap()
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("travel/japan"), "travel/japan");
        assert_eq!(escape_like("100%_real"), r"100\%\_real");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
    }

    #[test]
    fn test_section_query_defaults_to_random() {
        let query = section_media_query(&filter());
        let sql = query.sql();
        assert!(sql.contains("WHERE path = $1)"));
        assert!(sql.ends_with("ORDER BY RANDOM()"));
        assert!(!sql.contains("tags &&"));
    }

    #[test]
    fn test_section_query_with_filters() {
        let mut filter = filter();
        filter.file_type = Some("image".to_string());
        filter.tags = vec!["sunset".to_string(), "beach".to_string()];
        filter.sort = SortField::Width;
        filter.order = SortOrder::Desc;

        let query = section_media_query(&filter);
        let sql = query.sql();
        assert!(sql.contains("AND type = $2"));
        assert!(sql.contains("AND tags && $3"));
        assert!(sql.ends_with("ORDER BY width DESC"));
    }
}
