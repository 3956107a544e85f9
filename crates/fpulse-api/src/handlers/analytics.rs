//! Analytics query handlers.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use fpulse_analytics::{summarize, transitions};
use fpulse_models::{AnalyticsSummary, DetectionRecord, TransitionEdge};

use crate::state::AppState;

/// Window parameter for recent-record queries.
#[derive(Debug, Deserialize)]
pub struct WindowParams {
    /// Number of most recent records to include.
    pub n: Option<i64>,
}

/// Top-K parameter for summary queries.
#[derive(Debug, Deserialize)]
pub struct SummaryParams {
    /// Number of top classes to include.
    pub k: Option<usize>,
}

/// Last `n` records, oldest first.
///
/// GET /live_analytics
pub async fn live_analytics(
    State(state): State<AppState>,
    Query(params): Query<WindowParams>,
) -> Json<Vec<DetectionRecord>> {
    let n = params.n.unwrap_or(state.config.default_window);
    Json(state.store.snapshot(Some(n)))
}

/// Aggregated statistics over the full history.
///
/// GET /summary
pub async fn summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> Json<AnalyticsSummary> {
    let k = params.k.unwrap_or(state.config.default_top_k);
    let records = state.store.snapshot(None);
    Json(summarize(&records, k))
}

/// Frame-to-frame transition edges for flow charts.
///
/// GET /sankey_data
pub async fn sankey_data(State(state): State<AppState>) -> Json<Vec<TransitionEdge>> {
    let records = state.store.snapshot(None);
    Json(transitions(&records))
}
