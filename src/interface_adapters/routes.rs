use crate::interface_adapters::handlers::{add_player, credit, dashboard, logout};
use crate::interface_adapters::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/players", post(add_player))
        .route("/deposits", post(credit))
        .route("/logout", post(logout))
        .with_state(state)
}
