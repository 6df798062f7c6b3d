use anyhow::Context;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::reputation::service::recompute_score;
use crate::users::repo::User;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Rating {
    pub id: Uuid,
    pub ratee_id: Uuid,
    pub rater_id: Uuid,
    pub score: i32,
    pub created_at: OffsetDateTime,
}

pub async fn list_for_ratee(db: &PgPool, ratee_id: Uuid) -> anyhow::Result<Vec<Rating>> {
    let rows = sqlx::query_as::<_, Rating>(
        r#"
        SELECT id, ratee_id, rater_id, score, created_at
          FROM ratings
         WHERE ratee_id = $1
         ORDER BY created_at ASC
        "#,
    )
    .bind(ratee_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Insert the rating and refresh the ratee's derived seller_score in one
/// transaction. The user row is locked first so two concurrent submissions
/// cannot both compute a mean from the same stale rating list.
pub async fn submit(db: &PgPool, ratee_id: Uuid, rater_id: Uuid, score: i32) -> anyhow::Result<f64> {
    let mut tx = db.begin().await.context("begin tx")?;

    sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(ratee_id)
        .fetch_one(&mut *tx)
        .await
        .context("lock ratee row")?;

    sqlx::query(
        r#"
        INSERT INTO ratings (ratee_id, rater_id, score)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(ratee_id)
    .bind(rater_id)
    .bind(score)
    .execute(&mut *tx)
    .await
    .context("insert rating")?;

    let scores: Vec<(i32,)> =
        sqlx::query_as("SELECT score FROM ratings WHERE ratee_id = $1 ORDER BY created_at ASC")
            .bind(ratee_id)
            .fetch_all(&mut *tx)
            .await
            .context("read rating list")?;
    let scores: Vec<i32> = scores.into_iter().map(|(s,)| s).collect();
    let new_score = recompute_score(&scores);

    sqlx::query("UPDATE users SET seller_score = $2 WHERE id = $1")
        .bind(ratee_id)
        .bind(new_score)
        .execute(&mut *tx)
        .await
        .context("update seller_score")?;

    tx.commit().await.context("commit tx")?;
    Ok(new_score)
}

/// True when the error chain bottoms out in a Postgres unique violation,
/// i.e. a raced duplicate rating caught by the (ratee_id, rater_id) index.
pub fn is_unique_violation(e: &anyhow::Error) -> bool {
    e.chain()
        .filter_map(|cause| cause.downcast_ref::<sqlx::Error>())
        .filter_map(|sqlx_err| sqlx_err.as_database_error())
        .any(|db_err| db_err.code().as_deref() == Some("23505"))
}

pub async fn list_top(db: &PgPool, exclude_role: &str, limit: i64) -> anyhow::Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, fullname, phone_number,
               country, state, city, address, postal_code, role, seller_score,
               profile_picture, is_verified, is_banned,
               verification_code, verification_code_expires, created_at
          FROM users
         WHERE role <> $1 AND is_banned = FALSE
         ORDER BY seller_score DESC, created_at ASC
         LIMIT $2
        "#,
    )
    .bind(exclude_role)
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(users)
}
