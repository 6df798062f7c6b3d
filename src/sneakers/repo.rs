use anyhow::Context;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Sneaker {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub brand: String,
    pub model: String,
    pub size: f64,
    pub price: f64,
    pub condition: String,
    pub description: Option<String>,
    pub status: String,
    pub created_at: OffsetDateTime,
}

/// Feed row: the listing joined with the seller's public reputation fields.
#[derive(Debug, Clone, FromRow)]
pub struct MarketRow {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub brand: String,
    pub model: String,
    pub size: f64,
    pub price: f64,
    pub condition: String,
    pub description: Option<String>,
    pub status: String,
    pub created_at: OffsetDateTime,
    pub seller_username: String,
    pub seller_score: f64,
}

#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: Option<String>,
    pub text: String,
    pub created_at: OffsetDateTime,
}

pub struct NewSneaker<'a> {
    pub seller_id: Uuid,
    pub brand: &'a str,
    pub model: &'a str,
    pub size: f64,
    pub price: f64,
    pub condition: &'a str,
    pub description: Option<&'a str>,
}

pub async fn insert_tx(
    tx: &mut Transaction<'_, Postgres>,
    new: &NewSneaker<'_>,
) -> anyhow::Result<Sneaker> {
    let sneaker = sqlx::query_as::<_, Sneaker>(
        r#"
        INSERT INTO sneakers (seller_id, brand, model, size, price, condition, description)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, seller_id, brand, model, size, price, condition,
                  description, status, created_at
        "#,
    )
    .bind(new.seller_id)
    .bind(new.brand)
    .bind(new.model)
    .bind(new.size)
    .bind(new.price)
    .bind(new.condition)
    .bind(new.description)
    .fetch_one(&mut **tx)
    .await
    .context("insert sneaker")?;
    Ok(sneaker)
}

pub async fn insert_image_tx(
    tx: &mut Transaction<'_, Postgres>,
    image_id: Uuid,
    sneaker_id: Uuid,
    s3_key: &str,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO sneaker_images (id, sneaker_id, s3_key)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(image_id)
    .bind(sneaker_id)
    .bind(s3_key)
    .execute(&mut **tx)
    .await
    .context("insert sneaker image")?;
    Ok(())
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Sneaker>> {
    let sneaker = sqlx::query_as::<_, Sneaker>(
        r#"
        SELECT id, seller_id, brand, model, size, price, condition,
               description, status, created_at
          FROM sneakers
         WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(sneaker)
}

/// Market feed, newest first. `q` is a case-insensitive substring match on
/// brand or model; `status` narrows to one listing state.
pub async fn list_market(
    db: &PgPool,
    q: Option<&str>,
    status: Option<&str>,
) -> anyhow::Result<Vec<MarketRow>> {
    let pattern = q.map(|s| format!("%{}%", s));
    let rows = sqlx::query_as::<_, MarketRow>(
        r#"
        SELECT s.id, s.seller_id, s.brand, s.model, s.size, s.price, s.condition,
               s.description, s.status, s.created_at,
               u.username AS seller_username, u.seller_score
          FROM sneakers s
          JOIN users u ON u.id = s.seller_id
         WHERE ($1::TEXT IS NULL OR s.brand ILIKE $1 OR s.model ILIKE $1)
           AND ($2::TEXT IS NULL OR s.status = $2)
         ORDER BY s.created_at DESC
        "#,
    )
    .bind(pattern)
    .bind(status)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn list_image_keys(db: &PgPool, sneaker_id: Uuid) -> anyhow::Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT s3_key
          FROM sneaker_images
         WHERE sneaker_id = $1
         ORDER BY created_at ASC
        "#,
    )
    .bind(sneaker_id)
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(|(k,)| k).collect())
}

pub async fn list_image_keys_many(
    db: &PgPool,
    sneaker_ids: &[Uuid],
) -> anyhow::Result<Vec<(Uuid, String)>> {
    let rows: Vec<(Uuid, String)> = sqlx::query_as(
        r#"
        SELECT sneaker_id, s3_key
          FROM sneaker_images
         WHERE sneaker_id = ANY($1)
         ORDER BY created_at ASC
        "#,
    )
    .bind(sneaker_ids)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM sneakers WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn update_status(db: &PgPool, id: Uuid, status: &str) -> anyhow::Result<Option<Sneaker>> {
    let sneaker = sqlx::query_as::<_, Sneaker>(
        r#"
        UPDATE sneakers
           SET status = $2
         WHERE id = $1
        RETURNING id, seller_id, brand, model, size, price, condition,
                  description, status, created_at
        "#,
    )
    .bind(id)
    .bind(status)
    .fetch_optional(db)
    .await?;
    Ok(sneaker)
}

pub async fn insert_comment(
    db: &PgPool,
    sneaker_id: Uuid,
    user_id: Uuid,
    text: &str,
) -> anyhow::Result<CommentRow> {
    let id: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO sneaker_comments (sneaker_id, user_id, text)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(sneaker_id)
    .bind(user_id)
    .bind(text)
    .fetch_one(db)
    .await?;

    let row = sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT c.id, c.user_id, u.username, c.text, c.created_at
          FROM sneaker_comments c
          LEFT JOIN users u ON u.id = c.user_id
         WHERE c.id = $1
        "#,
    )
    .bind(id.0)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn list_comments(db: &PgPool, sneaker_id: Uuid) -> anyhow::Result<Vec<CommentRow>> {
    let rows = sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT c.id, c.user_id, u.username, c.text, c.created_at
          FROM sneaker_comments c
          LEFT JOIN users u ON u.id = c.user_id
         WHERE c.sneaker_id = $1
         ORDER BY c.created_at ASC
        "#,
    )
    .bind(sneaker_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
