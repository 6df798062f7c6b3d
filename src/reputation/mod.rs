use crate::state::AppState;
use axum::Router;

pub mod handlers;
pub mod repo;
pub(crate) mod service;

pub fn router() -> Router<AppState> {
    handlers::router()
}
