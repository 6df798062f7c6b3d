use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, ForgotPasswordRequest, LoginRequest, RefreshRequest, RegisterRequest,
            ResendCodeRequest, ResetPasswordRequest, SessionUser, StatusResponse,
            VerifyEmailRequest,
        },
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo,
        services::{code_expiry, code_matches, generate_code, is_valid_email},
    },
    error::ApiError,
    mailer::send_best_effort,
    state::AppState,
    users::repo as users_repo,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/verify-email", post(verify_email))
        .route("/auth/resend-code", post(resend_code))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
}

fn session_user(user: &users_repo::User) -> SessionUser {
    SessionUser {
        id: user.id,
        username: user.username.clone(),
        fullname: user.fullname.clone(),
        role: user.role(),
        seller_score: user.seller_score,
    }
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<StatusResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.username = payload.username.trim().to_string();

    if payload.username.is_empty() {
        return Err(ApiError::Validation("username is required".into()));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("invalid email".into()));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::Validation("password too short".into()));
    }

    if users_repo::find_by_username(&state.db, &payload.username)
        .await?
        .is_some()
    {
        warn!(username = %payload.username, "username already taken");
        return Err(ApiError::DuplicateAction("username already taken".into()));
    }
    if users_repo::find_by_email(&state.db, &payload.email)
        .await?
        .is_some()
    {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::DuplicateAction("email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;
    let code = generate_code();

    let user = repo::create_user(
        &state.db,
        &repo::NewUser {
            username: &payload.username,
            email: &payload.email,
            password_hash: &hash,
            fullname: &payload.fullname,
            phone_number: &payload.phone_number,
            country: &payload.country,
            state: &payload.state,
            city: &payload.city,
            address: &payload.address,
            postal_code: &payload.postal_code,
            verification_code: &code,
            verification_code_expires: code_expiry(),
        },
    )
    .await?;

    // Mail failure never fails registration.
    send_best_effort(
        state.mailer.as_ref(),
        &user.email,
        "Verify your Sneakerfy account",
        &format!("Your verification code is {code}. It expires in 15 minutes."),
    )
    .await;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(StatusResponse {
            message: "user registered, verification code sent".into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn verify_email(
    State(state): State<AppState>,
    Json(payload): Json<VerifyEmailRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let user = users_repo::find_by_username(&state.db, payload.username.trim())
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    if user.is_verified {
        return Err(ApiError::Validation("account already verified".into()));
    }
    if !code_matches(
        user.verification_code.as_deref(),
        user.verification_code_expires,
        payload.code.trim(),
    ) {
        warn!(user_id = %user.id, "invalid or expired verification code");
        return Err(ApiError::Validation("invalid or expired code".into()));
    }

    repo::mark_verified(&state.db, user.id).await?;
    info!(user_id = %user.id, "email verified");
    Ok(Json(StatusResponse {
        message: "account verified".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn resend_code(
    State(state): State<AppState>,
    Json(payload): Json<ResendCodeRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let user = users_repo::find_by_username(&state.db, payload.username.trim())
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    if user.is_verified {
        return Err(ApiError::Validation("account already verified".into()));
    }

    let code = generate_code();
    repo::set_verification_code(&state.db, user.id, &code, code_expiry()).await?;
    send_best_effort(
        state.mailer.as_ref(),
        &user.email,
        "Your Sneakerfy verification code",
        &format!("Your verification code is {code}. It expires in 15 minutes."),
    )
    .await;

    Ok(Json(StatusResponse {
        message: "verification code sent".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = users_repo::find_by_username(&state.db, payload.username.trim())
        .await?
        .ok_or_else(|| {
            warn!(username = %payload.username, "login unknown username");
            ApiError::Authentication("invalid credentials".into())
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Authentication("invalid credentials".into()));
    }
    if user.is_banned {
        warn!(user_id = %user.id, "login attempt by banned user");
        return Err(ApiError::Authorization("account is banned".into()));
    }
    if !user.is_verified {
        return Err(ApiError::Authorization("email not verified".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id, user.role())?;
    let refresh_token = keys.sign_refresh(user.id, user.role())?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: session_user(&user),
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| ApiError::Authentication(e.to_string()))?;

    // Re-read the user so a ban or role change takes effect on rotation.
    let user = users_repo::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Authentication("user not found".into()))?;
    if user.is_banned {
        return Err(ApiError::Authorization("account is banned".into()));
    }

    let access_token = keys.sign_access(user.id, user.role())?;
    let refresh_token = keys.sign_refresh(user.id, user.role())?;

    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: session_user(&user),
    }))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let email = payload.email.trim().to_lowercase();
    let user = users_repo::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    let code = generate_code();
    repo::set_verification_code(&state.db, user.id, &code, code_expiry()).await?;
    send_best_effort(
        state.mailer.as_ref(),
        &user.email,
        "Sneakerfy password reset",
        &format!("Your password reset code is {code}. It expires in 15 minutes."),
    )
    .await;

    Ok(Json(StatusResponse {
        message: "password reset code sent".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    if payload.new_password.len() < 8 {
        return Err(ApiError::Validation("password too short".into()));
    }

    let email = payload.email.trim().to_lowercase();
    let user = users_repo::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    if !code_matches(
        user.verification_code.as_deref(),
        user.verification_code_expires,
        payload.code.trim(),
    ) {
        return Err(ApiError::Validation("invalid or expired code".into()));
    }

    let hash = hash_password(&payload.new_password)?;
    repo::update_password(&state.db, user.id, &hash).await?;
    info!(user_id = %user.id, "password reset");
    Ok(Json(StatusResponse {
        message: "password updated".into(),
    }))
}
