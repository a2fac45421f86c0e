use axum::{extract::State, response::Html, Json};
use common::types::Health;

use crate::state::AppState;

/// Landing page; a human-readable "it's up" for anyone opening the root URL.
pub async fn index() -> Html<&'static str> {
    Html("<h2>DUSTTALE backend is running.</h2>\n<p>Send a POST to /aus to add a new AU.</p>")
}

pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health { status: "ok", backend: state.aus.backend() })
}
