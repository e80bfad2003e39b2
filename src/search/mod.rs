use crate::state::AppState;
use axum::Router;

pub(crate) mod engine;
pub mod handlers;

pub fn router() -> Router<AppState> {
    handlers::search_routes()
}
