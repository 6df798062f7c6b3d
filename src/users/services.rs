use tracing::warn;

use crate::state::AppState;
use crate::users::dto::{ProfileResponse, PublicProfile};
use crate::users::repo::User;

const PICTURE_URL_TTL_SECS: u64 = 30 * 60;

/// Presign the stored picture key for client display. A presign failure
/// degrades to no picture rather than failing the surrounding read.
pub(crate) async fn presign_picture(state: &AppState, key: Option<&str>) -> Option<String> {
    let key = key?;
    match state.storage.presign_get(key, PICTURE_URL_TTL_SECS).await {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(error = %e, %key, "presign profile picture failed");
            None
        }
    }
}

pub(crate) async fn public_profile(state: &AppState, user: &User) -> PublicProfile {
    PublicProfile {
        id: user.id,
        username: user.username.clone(),
        fullname: user.fullname.clone(),
        seller_score: user.seller_score,
        profile_picture: presign_picture(state, user.profile_picture.as_deref()).await,
    }
}

pub(crate) async fn profile_response(state: &AppState, user: &User) -> ProfileResponse {
    ProfileResponse {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        fullname: user.fullname.clone(),
        phone_number: user.phone_number.clone(),
        country: user.country.clone(),
        state: user.state.clone(),
        city: user.city.clone(),
        address: user.address.clone(),
        postal_code: user.postal_code.clone(),
        role: user.role(),
        seller_score: user.seller_score,
        profile_picture: presign_picture(state, user.profile_picture.as_deref()).await,
        is_verified: user.is_verified,
        created_at: user.created_at,
    }
}
