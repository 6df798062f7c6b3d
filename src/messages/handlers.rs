use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    messages::{
        dto::{ConversationSummary, SendMessageRequest},
        repo,
        service::group_conversations,
    },
    state::AppState,
    users::{repo as users_repo, services::public_profile},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/messages", post(send_message).get(get_inbox))
        .route("/messages/:other_user_id", get(get_thread))
}

#[instrument(skip(state, auth, payload), fields(sender = %auth.id))]
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<repo::Message>), ApiError> {
    let content = payload.content.trim();
    if content.is_empty() {
        return Err(ApiError::Validation("message content is empty".into()));
    }

    if users_repo::find_by_id(&state.db, payload.recipient_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("recipient not found".into()));
    }

    let message = repo::insert(
        &state.db,
        auth.id,
        payload.recipient_id,
        content,
        payload.sneaker_id,
    )
    .await?;

    info!(message_id = %message.id, recipient = %message.recipient_id, "message sent");
    Ok((StatusCode::CREATED, Json(message)))
}

/// Inbox: one entry per counterpart, annotated with the latest message.
/// Pure read; a counterpart whose account no longer resolves is reported
/// with a null contact instead of failing the whole listing.
#[instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn get_inbox(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ConversationSummary>>, ApiError> {
    let messages = repo::list_involving(&state.db, auth.id).await?;
    let grouped = group_conversations(auth.id, messages);

    let counterpart_ids: Vec<Uuid> = grouped.iter().map(|(id, _)| *id).collect();
    let contacts: HashMap<Uuid, users_repo::User> =
        users_repo::find_by_ids(&state.db, &counterpart_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

    let mut out = Vec::with_capacity(grouped.len());
    for (counterpart_id, last_message) in grouped {
        let contact = match contacts.get(&counterpart_id) {
            Some(user) => Some(public_profile(&state, user).await),
            None => None,
        };
        out.push(ConversationSummary {
            counterpart_id,
            contact,
            last_message,
        });
    }
    Ok(Json(out))
}

#[instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn get_thread(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(other_user_id): Path<Uuid>,
) -> Result<Json<Vec<repo::Message>>, ApiError> {
    let messages = repo::thread_between(&state.db, auth.id, other_user_id).await?;
    Ok(Json(messages))
}
