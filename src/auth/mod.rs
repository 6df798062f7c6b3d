use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
pub(crate) mod services;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
