use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo::Role;

/// Profile fields safe to show to other users. This is the only user shape
/// that ever leaves the service on behalf of someone else.
#[derive(Debug, Clone, Serialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub username: String,
    pub fullname: String,
    pub seller_score: f64,
    pub profile_picture: Option<String>,
}

/// The caller's own profile.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub phone_number: String,
    pub country: String,
    pub state: String,
    pub city: String,
    pub address: String,
    pub postal_code: String,
    pub role: Role,
    pub seller_score: f64,
    pub profile_picture: Option<String>,
    pub is_verified: bool,
    pub created_at: OffsetDateTime,
}

/// Row in the admin user listing.
#[derive(Debug, Serialize)]
pub struct AdminUserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub role: Role,
    pub seller_score: f64,
    pub is_verified: bool,
    pub is_banned: bool,
    pub created_at: OffsetDateTime,
}
