use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// A message is immutable once created; there are no update operations.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    pub sneaker_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
}

pub async fn insert(
    db: &PgPool,
    sender_id: Uuid,
    recipient_id: Uuid,
    content: &str,
    sneaker_id: Option<Uuid>,
) -> anyhow::Result<Message> {
    let message = sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages (sender_id, recipient_id, content, sneaker_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, sender_id, recipient_id, content, sneaker_id, created_at
        "#,
    )
    .bind(sender_id)
    .bind(recipient_id)
    .bind(content)
    .bind(sneaker_id)
    .fetch_one(db)
    .await?;
    Ok(message)
}

/// Every message the user sent or received, oldest first. The id is the
/// deterministic secondary sort key for equal timestamps.
pub async fn list_involving(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Message>> {
    let rows = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, sender_id, recipient_id, content, sneaker_id, created_at
          FROM messages
         WHERE sender_id = $1 OR recipient_id = $1
         ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// The full two-party thread in either direction, oldest first.
pub async fn thread_between(db: &PgPool, a: Uuid, b: Uuid) -> anyhow::Result<Vec<Message>> {
    let rows = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, sender_id, recipient_id, content, sneaker_id, created_at
          FROM messages
         WHERE (sender_id = $1 AND recipient_id = $2)
            OR (sender_id = $2 AND recipient_id = $1)
         ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(a)
    .bind(b)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
