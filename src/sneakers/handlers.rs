use std::collections::HashMap;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    sneakers::{
        dto::{
            is_valid_condition, is_valid_status, CommentRequest, CommentView, MarketQuery,
            SellerSummary, SneakerDetails, SneakerListItem, StatusUpdateRequest,
        },
        images::{self, UploadItem},
        repo::{self, CommentRow, NewSneaker},
    },
    state::AppState,
    users::repo::Role,
};

const MAX_IMAGES: usize = 5;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/sneakers", get(list_market))
        .route("/sneakers/:id", get(get_sneaker))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/sneakers", post(create_sneaker))
        .route("/sneakers/:id", delete(delete_sneaker))
        .route("/sneakers/:id/comments", post(add_comment))
        .route("/sneakers/:id/status", put(update_status))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024))
}

fn comment_view(row: CommentRow) -> CommentView {
    CommentView {
        id: row.id,
        user_id: row.user_id,
        username: row.username,
        text: row.text,
        created_at: row.created_at,
    }
}

#[instrument(skip(state))]
pub async fn list_market(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> Result<Json<Vec<SneakerListItem>>, ApiError> {
    if let Some(status) = query.status.as_deref() {
        if !is_valid_status(status) {
            return Err(ApiError::Validation("unknown status filter".into()));
        }
    }

    let rows = repo::list_market(
        &state.db,
        query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        query.status.as_deref(),
    )
    .await?;

    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let mut keys_by_sneaker: HashMap<Uuid, Vec<String>> = HashMap::new();
    for (sneaker_id, key) in repo::list_image_keys_many(&state.db, &ids).await? {
        keys_by_sneaker.entry(sneaker_id).or_default().push(key);
    }

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        let keys = keys_by_sneaker.remove(&row.id).unwrap_or_default();
        let image_urls = images::presign_many(&state, keys).await?;
        items.push(SneakerListItem {
            id: row.id,
            brand: row.brand,
            model: row.model,
            size: row.size,
            price: row.price,
            condition: row.condition,
            status: row.status,
            seller: SellerSummary {
                id: row.seller_id,
                username: row.seller_username,
                seller_score: row.seller_score,
            },
            images: image_urls,
            created_at: row.created_at,
        });
    }
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn get_sneaker(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SneakerDetails>, ApiError> {
    let sneaker = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("sneaker not found".into()))?;

    let seller = crate::users::repo::find_by_id(&state.db, sneaker.seller_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("seller not found".into()))?;

    let keys = repo::list_image_keys(&state.db, sneaker.id).await?;
    let image_urls = images::presign_many(&state, keys).await?;
    let comments = repo::list_comments(&state.db, sneaker.id).await?;

    Ok(Json(SneakerDetails {
        id: sneaker.id,
        brand: sneaker.brand,
        model: sneaker.model,
        size: sneaker.size,
        price: sneaker.price,
        condition: sneaker.condition,
        description: sneaker.description,
        status: sneaker.status,
        seller: SellerSummary {
            id: seller.id,
            username: seller.username,
            seller_score: seller.seller_score,
        },
        images: image_urls,
        comments: comments.into_iter().map(comment_view).collect(),
        created_at: sneaker.created_at,
    }))
}

/// Multipart listing creation: text fields plus up to five `images` files.
#[instrument(skip(state, auth, mp), fields(seller = %auth.id))]
pub async fn create_sneaker(
    State(state): State<AppState>,
    auth: AuthUser,
    mut mp: Multipart,
) -> Result<(StatusCode, Json<repo::Sneaker>), ApiError> {
    let mut brand = String::new();
    let mut model = String::new();
    let mut size: Option<f64> = None;
    let mut price: Option<f64> = None;
    let mut condition = String::new();
    let mut description: Option<String> = None;
    let mut files: Vec<UploadItem> = Vec::new();

    while let Ok(Some(field)) = mp.next_field().await {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("images") | Some("images[]") => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".into());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(format!("bad upload: {e}")))?;
                if !data.is_empty() {
                    files.push(UploadItem {
                        body: data,
                        content_type,
                    });
                }
            }
            Some(text_field) => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Validation(format!("bad field: {e}")))?;
                match text_field {
                    "brand" => brand = value.trim().to_string(),
                    "model" => model = value.trim().to_string(),
                    "size" => {
                        size = Some(value.trim().parse::<f64>().map_err(|_| {
                            ApiError::Validation("size must be a number".into())
                        })?)
                    }
                    "price" => {
                        price = Some(value.trim().parse::<f64>().map_err(|_| {
                            ApiError::Validation("price must be a number".into())
                        })?)
                    }
                    "condition" => condition = value.trim().to_string(),
                    "description" => description = Some(value),
                    _ => {}
                }
            }
            None => {}
        }
    }

    if brand.is_empty() || model.is_empty() {
        return Err(ApiError::Validation("brand and model are required".into()));
    }
    let size = size.ok_or_else(|| ApiError::Validation("size is required".into()))?;
    let price = price.ok_or_else(|| ApiError::Validation("price is required".into()))?;
    if size <= 0.0 || price < 0.0 {
        return Err(ApiError::Validation("size and price must be positive".into()));
    }
    if !is_valid_condition(&condition) {
        return Err(ApiError::Validation("unknown condition".into()));
    }
    if files.len() > MAX_IMAGES {
        return Err(ApiError::Validation(format!(
            "at most {MAX_IMAGES} images allowed"
        )));
    }

    let (sneaker, _image_ids) = images::create_with_images(
        &state,
        &NewSneaker {
            seller_id: auth.id,
            brand: &brand,
            model: &model,
            size,
            price,
            condition: &condition,
            description: description.as_deref(),
        },
        files,
    )
    .await?;

    info!(sneaker_id = %sneaker.id, "listing created");
    Ok((StatusCode::CREATED, Json(sneaker)))
}

/// Remove a listing. Only the seller or an admin may delete it; stored
/// images are cleaned up best-effort afterwards.
#[instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn delete_sneaker(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let sneaker = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("sneaker not found".into()))?;

    if sneaker.seller_id != auth.id && auth.role != Role::Admin {
        return Err(ApiError::Authorization(
            "only the seller or an admin can delete a listing".into(),
        ));
    }

    let keys = repo::list_image_keys(&state.db, id).await?;
    repo::delete(&state.db, id).await?;
    images::delete_many(&state, keys).await;

    info!(sneaker_id = %id, "listing deleted");
    Ok(Json(serde_json::json!({ "message": "sneaker deleted" })))
}

#[instrument(skip(state, auth, payload), fields(user_id = %auth.id))]
pub async fn add_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CommentRequest>,
) -> Result<(StatusCode, Json<CommentView>), ApiError> {
    let text = payload.text.trim();
    if text.is_empty() {
        return Err(ApiError::Validation("comment text is empty".into()));
    }

    if repo::find_by_id(&state.db, id).await?.is_none() {
        return Err(ApiError::NotFound("sneaker not found".into()));
    }

    let row = repo::insert_comment(&state.db, id, auth.id, text).await?;
    Ok((StatusCode::CREATED, Json(comment_view(row))))
}

#[instrument(skip(state, auth, payload), fields(user_id = %auth.id))]
pub async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<Json<repo::Sneaker>, ApiError> {
    if !is_valid_status(&payload.status) {
        return Err(ApiError::Validation("unknown status".into()));
    }

    let sneaker = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("sneaker not found".into()))?;
    if sneaker.seller_id != auth.id {
        return Err(ApiError::Authorization(
            "only the seller can change the listing status".into(),
        ));
    }

    let updated = repo::update_status(&state.db, id, &payload.status)
        .await?
        .ok_or_else(|| ApiError::NotFound("sneaker not found".into()))?;
    Ok(Json(updated))
}
