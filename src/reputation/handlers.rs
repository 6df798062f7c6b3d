use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    reputation::{
        repo,
        service::{already_rated, score_in_range},
    },
    state::AppState,
    users::{dto::PublicProfile, repo as users_repo, services::public_profile},
};

const TOP_SELLERS_LIMIT: i64 = 5;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/rate", post(rate_user))
        .route("/users/top-sellers", get(top_sellers))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRequest {
    pub target_user_id: Uuid,
    pub score: i32,
}

#[derive(Debug, Serialize)]
pub struct RateResponse {
    pub seller_score: f64,
}

#[instrument(skip(state, auth), fields(rater = %auth.id))]
pub async fn rate_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<RateRequest>,
) -> Result<Json<RateResponse>, ApiError> {
    if !score_in_range(payload.score) {
        return Err(ApiError::Validation("score must be between 1 and 5".into()));
    }
    if payload.target_user_id == auth.id {
        return Err(ApiError::SelfAction("cannot rate yourself".into()));
    }

    if users_repo::find_by_id(&state.db, payload.target_user_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("user not found".into()));
    }

    let ratings = repo::list_for_ratee(&state.db, payload.target_user_id).await?;
    if already_rated(&ratings, auth.id) {
        warn!(ratee = %payload.target_user_id, "duplicate rating rejected");
        return Err(ApiError::DuplicateAction(
            "you have already rated this user".into(),
        ));
    }

    let seller_score =
        match repo::submit(&state.db, payload.target_user_id, auth.id, payload.score).await {
            Ok(score) => score,
            // Raced duplicate: the scan above passed but the unique index lost.
            Err(e) if repo::is_unique_violation(&e) => {
                return Err(ApiError::DuplicateAction(
                    "you have already rated this user".into(),
                ))
            }
            Err(e) => return Err(ApiError::Dependency(e)),
        };

    info!(ratee = %payload.target_user_id, score = payload.score, seller_score, "rating recorded");
    Ok(Json(RateResponse { seller_score }))
}

#[instrument(skip(state, _auth))]
pub async fn top_sellers(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<PublicProfile>>, ApiError> {
    let users = repo::list_top(&state.db, "admin", TOP_SELLERS_LIMIT).await?;
    let mut out = Vec::with_capacity(users.len());
    for user in &users {
        out.push(public_profile(&state, user).await);
    }
    Ok(Json(out))
}
