use axum::extract::State;
use axum::Json;

use crate::app_state::AppState;
use crate::models::visit::VisitReport;

/// GET /api/visits — processed results joined with store reference data.
pub async fn list_visits(State(state): State<AppState>) -> Json<Vec<VisitReport>> {
    Json(state.pipeline.list_results())
}
