use axum::{extract::State, Json};
use posterm_sync::SyncPayload;

use super::AppState;

/// `GET /api/sync`: the full catalog snapshot, unwrapped, as the terminal
/// expects it.
pub(super) async fn get_sync(State(state): State<AppState>) -> Json<SyncPayload> {
    tracing::debug!(
        products = state.payload.products.len(),
        categories = state.payload.categories.len(),
        "serving sync payload"
    );
    Json(SyncPayload::clone(&state.payload))
}
