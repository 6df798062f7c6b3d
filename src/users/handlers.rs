use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    routing::{get, put},
    Json, Router,
};
use uuid::Uuid;

use crate::{
    auth::jwt::{AdminUser, AuthUser},
    error::ApiError,
    state::AppState,
    storage::ext_from_mime,
    users::{
        dto::{AdminUserRow, ProfileResponse},
        repo::{self, ProfileUpdate, User},
        services::profile_response,
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/profile", get(get_profile).put(update_profile))
        .route("/users", get(list_users))
        .route("/users/:id/ban", put(ban_user))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024))
}

fn admin_row(user: &User) -> AdminUserRow {
    AdminUserRow {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        fullname: user.fullname.clone(),
        role: user.role(),
        seller_score: user.seller_score,
        is_verified: user.is_verified,
        is_banned: user.is_banned,
        created_at: user.created_at,
    }
}

#[tracing::instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = repo::find_by_id(&state.db, auth.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;
    Ok(Json(profile_response(&state, &user).await))
}

/// Multipart profile update: text fields plus an optional `profilePicture`
/// file. Fields that are not sent keep their current value.
#[tracing::instrument(skip(state, auth, mp), fields(user_id = %auth.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    mut mp: Multipart,
) -> Result<Json<ProfileResponse>, ApiError> {
    let current = repo::find_by_id(&state.db, auth.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    let mut update = ProfileUpdate {
        fullname: current.fullname.clone(),
        phone_number: current.phone_number.clone(),
        country: current.country.clone(),
        state: current.state.clone(),
        city: current.city.clone(),
        address: current.address.clone(),
        postal_code: current.postal_code.clone(),
        profile_picture: None,
    };

    while let Ok(Some(field)) = mp.next_field().await {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("profilePicture") => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".into());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(format!("bad upload: {e}")))?;
                if data.is_empty() {
                    continue;
                }
                let ext = ext_from_mime(&content_type)
                    .ok_or_else(|| ApiError::Validation("unsupported image type".into()))?;
                let key = format!("profiles/{}/{}.{}", auth.id, Uuid::new_v4(), ext);
                state.storage.put_object(&key, data, &content_type).await?;
                update.profile_picture = Some(key);
            }
            Some(text_field) => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Validation(format!("bad field: {e}")))?;
                match text_field {
                    "fullname" => update.fullname = value,
                    "phoneNumber" => update.phone_number = value,
                    "country" => update.country = value,
                    "state" => update.state = value,
                    "city" => update.city = value,
                    "address" => update.address = value,
                    "postalCode" => update.postal_code = value,
                    _ => {}
                }
            }
            None => {}
        }
    }

    if update.fullname.trim().is_empty() {
        return Err(ApiError::Validation("fullname must not be empty".into()));
    }

    let old_picture = current.profile_picture.clone();
    let user = repo::update_profile(&state.db, auth.id, &update)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    // Replaced picture is removed best-effort.
    if update.profile_picture.is_some() {
        if let Some(old_key) = old_picture {
            if let Err(e) = state.storage.delete_object(&old_key).await {
                tracing::warn!(error = %e, key = %old_key, "delete old profile picture failed");
            }
        }
    }

    Ok(Json(profile_response(&state, &user).await))
}

#[tracing::instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<AdminUserRow>>, ApiError> {
    let users = repo::list_all(&state.db).await?;
    Ok(Json(users.iter().map(admin_row).collect()))
}

/// Toggle the ban flag on a user. Admin only; an admin cannot ban themselves.
#[tracing::instrument(skip(state, admin))]
pub async fn ban_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AdminUserRow>, ApiError> {
    if admin.0.id == id {
        return Err(ApiError::SelfAction("cannot ban yourself".into()));
    }

    let target = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    let updated = repo::set_banned(&state.db, id, !target.is_banned)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    tracing::info!(target = %id, banned = updated.is_banned, "ban flag toggled");
    Ok(Json(admin_row(&updated)))
}
