use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo::User;

pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub fullname: &'a str,
    pub phone_number: &'a str,
    pub country: &'a str,
    pub state: &'a str,
    pub city: &'a str,
    pub address: &'a str,
    pub postal_code: &'a str,
    pub verification_code: &'a str,
    pub verification_code_expires: OffsetDateTime,
}

/// Create an unverified user with a pending verification code.
pub async fn create_user(db: &PgPool, new: &NewUser<'_>) -> anyhow::Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (
            username, email, password_hash, fullname, phone_number,
            country, state, city, address, postal_code,
            verification_code, verification_code_expires
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING id, username, email, password_hash, fullname, phone_number,
                  country, state, city, address, postal_code, role, seller_score,
                  profile_picture, is_verified, is_banned,
                  verification_code, verification_code_expires, created_at
        "#,
    )
    .bind(new.username)
    .bind(new.email)
    .bind(new.password_hash)
    .bind(new.fullname)
    .bind(new.phone_number)
    .bind(new.country)
    .bind(new.state)
    .bind(new.city)
    .bind(new.address)
    .bind(new.postal_code)
    .bind(new.verification_code)
    .bind(new.verification_code_expires)
    .fetch_one(db)
    .await?;
    Ok(user)
}

pub async fn set_verification_code(
    db: &PgPool,
    user_id: Uuid,
    code: &str,
    expires: OffsetDateTime,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE users
           SET verification_code = $2, verification_code_expires = $3
         WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(code)
    .bind(expires)
    .execute(db)
    .await?;
    Ok(())
}

/// Mark the account verified and clear the pending code.
pub async fn mark_verified(db: &PgPool, user_id: Uuid) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE users
           SET is_verified = TRUE,
               verification_code = NULL,
               verification_code_expires = NULL
         WHERE id = $1
        "#,
    )
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(())
}

/// Replace the password hash and clear the reset code in one statement.
pub async fn update_password(db: &PgPool, user_id: Uuid, password_hash: &str) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE users
           SET password_hash = $2,
               verification_code = NULL,
               verification_code_expires = NULL
         WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(password_hash)
    .execute(db)
    .await?;
    Ok(())
}
