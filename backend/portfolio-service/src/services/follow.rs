use crate::error::Result;
use crate::models::UserRef;
use sqlx::PgPool;

/// Follower relationships between users
#[derive(Clone)]
pub struct FollowService {
    pub pool: PgPool,
}

impl FollowService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Idempotent create follow; returns true if a new row was inserted.
    pub async fn create_follow(&self, follower_id: i32, followee_id: i32) -> Result<bool> {
        let inserted = sqlx::query_as::<_, (i32,)>(
            r#"
            INSERT INTO follows (follower_id, followee_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (follower_id, followee_id) DO NOTHING
            RETURNING follower_id
            "#,
        )
        .bind(follower_id)
        .bind(followee_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(inserted.is_some())
    }

    /// Idempotent delete; returns true if a row was removed.
    pub async fn delete_follow(&self, follower_id: i32, followee_id: i32) -> Result<bool> {
        let affected = sqlx::query(
            r#"
            DELETE FROM follows
            WHERE follower_id = $1 AND followee_id = $2
            "#,
        )
        .bind(follower_id)
        .bind(followee_id)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(affected > 0)
    }

    /// Users following `user_id`, oldest relationship first
    pub async fn followers(&self, user_id: i32) -> Result<Vec<UserRef>> {
        let users = sqlx::query_as::<_, UserRef>(
            r#"
            SELECT u.id, u.username
            FROM follows f
            JOIN users u ON u.id = f.follower_id
            WHERE f.followee_id = $1
            ORDER BY f.created_at, u.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Users `user_id` follows
    pub async fn following(&self, user_id: i32) -> Result<Vec<UserRef>> {
        let users = sqlx::query_as::<_, UserRef>(
            r#"
            SELECT u.id, u.username
            FROM follows f
            JOIN users u ON u.id = f.followee_id
            WHERE f.follower_id = $1
            ORDER BY f.created_at, u.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
