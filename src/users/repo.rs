use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Account role. Stored as lowercase text in the `users.role` column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Moderator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Moderator => "moderator",
        }
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s {
            "admin" => Role::Admin,
            "moderator" => Role::Moderator,
            _ => Role::User,
        }
    }
}

/// Full user record. Password hash and verification fields never serialize.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub fullname: String,
    pub phone_number: String,
    pub country: String,
    pub state: String,
    pub city: String,
    pub address: String,
    pub postal_code: String,
    pub role: String,
    pub seller_score: f64,
    pub profile_picture: Option<String>,
    pub is_verified: bool,
    pub is_banned: bool,
    #[serde(skip_serializing)]
    pub verification_code: Option<String>,
    #[serde(skip_serializing)]
    pub verification_code_expires: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

impl User {
    pub fn role(&self) -> Role {
        Role::from(self.role.as_str())
    }
}

const USER_COLUMNS: &str = r#"
    id, username, email, password_hash, fullname, phone_number,
    country, state, city, address, postal_code, role, seller_score,
    profile_picture, is_verified, is_banned,
    verification_code, verification_code_expires, created_at
"#;

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
    ))
    .bind(username)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn find_by_ids(db: &PgPool, ids: &[Uuid]) -> anyhow::Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"
    ))
    .bind(ids)
    .fetch_all(db)
    .await?;
    Ok(users)
}

pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"
    ))
    .fetch_all(db)
    .await?;
    Ok(users)
}

pub struct ProfileUpdate {
    pub fullname: String,
    pub phone_number: String,
    pub country: String,
    pub state: String,
    pub city: String,
    pub address: String,
    pub postal_code: String,
    pub profile_picture: Option<String>,
}

pub async fn update_profile(
    db: &PgPool,
    user_id: Uuid,
    update: &ProfileUpdate,
) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
           SET fullname = $2,
               phone_number = $3,
               country = $4,
               state = $5,
               city = $6,
               address = $7,
               postal_code = $8,
               profile_picture = COALESCE($9, profile_picture)
         WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(&update.fullname)
    .bind(&update.phone_number)
    .bind(&update.country)
    .bind(&update.state)
    .bind(&update.city)
    .bind(&update.address)
    .bind(&update.postal_code)
    .bind(&update.profile_picture)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn set_banned(db: &PgPool, user_id: Uuid, banned: bool) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET is_banned = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
    ))
    .bind(user_id)
    .bind(banned)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_known_values_and_defaults_to_user() {
        assert_eq!(Role::from("admin"), Role::Admin);
        assert_eq!(Role::from("moderator"), Role::Moderator);
        assert_eq!(Role::from("user"), Role::User);
        assert_eq!(Role::from("garbage"), Role::User);
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::User, Role::Admin, Role::Moderator] {
            assert_eq!(Role::from(role.as_str()), role);
        }
    }

    #[test]
    fn sensitive_fields_never_serialize() {
        let user = User {
            id: Uuid::new_v4(),
            username: "kicks".into(),
            email: "kicks@example.com".into(),
            password_hash: "argon2-hash".into(),
            fullname: "Kicks Seller".into(),
            phone_number: "123".into(),
            country: "NL".into(),
            state: "NH".into(),
            city: "Amsterdam".into(),
            address: "Main 1".into(),
            postal_code: "1000AA".into(),
            role: "user".into(),
            seller_score: 4.5,
            profile_picture: None,
            is_verified: true,
            is_banned: false,
            verification_code: Some("123456".into()),
            verification_code_expires: None,
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2-hash"));
        assert!(!json.contains("123456"));
        assert!(json.contains("kicks@example.com"));
    }
}
