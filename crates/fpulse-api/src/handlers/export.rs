//! Snapshot export handlers.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::Response;
use tracing::warn;

use fpulse_analytics::windowed_class_totals;
use fpulse_export::{render_chart_png, render_report_pdf, save_csv, to_csv, to_json};

use crate::error::{ApiError, ApiResult};
use crate::handlers::analytics::WindowParams;
use crate::state::AppState;

/// Full history as a CSV attachment. Also refreshes the autosave file.
///
/// GET /export/csv
pub async fn export_csv(State(state): State<AppState>) -> ApiResult<Response> {
    let records = state.store.snapshot(None);
    let bytes = to_csv(&records)?;

    // Keep the on-disk copy in step with what the client downloaded
    if let Err(e) = save_csv(&records, &state.config.autosave_path).await {
        warn!(
            path = %state.config.autosave_path.display(),
            error = %e,
            "Failed to refresh autosave file"
        );
    }

    attachment(bytes, "text/csv", "analytics.csv")
}

/// Full history as a JSON attachment.
///
/// GET /export/json
pub async fn export_json(State(state): State<AppState>) -> ApiResult<Response> {
    let records = state.store.snapshot(None);
    let bytes = to_json(&records)?;

    attachment(bytes, "application/json", "analytics.json")
}

/// PDF report attachment.
///
/// GET /export/pdf
pub async fn export_pdf(State(state): State<AppState>) -> ApiResult<Response> {
    let records = state.store.snapshot(None);
    let bytes = render_report_pdf(&records)?;

    attachment(bytes, "application/pdf", "analytics.pdf")
}

/// PNG chart over the last `n` records. Always renders; an empty window
/// produces the placeholder panel.
///
/// GET /chart.png
pub async fn chart_png(
    State(state): State<AppState>,
    Query(params): Query<WindowParams>,
) -> ApiResult<Response> {
    let n = params.n.unwrap_or(state.config.default_window);
    let records = state.store.snapshot(Some(n));
    let totals = windowed_class_totals(&records);
    let bytes = render_chart_png(&totals)?;

    Response::builder()
        .header(header::CONTENT_TYPE, "image/png")
        .body(Body::from(bytes))
        .map_err(|e| ApiError::internal(format!("Failed to build chart response: {}", e)))
}

fn attachment(bytes: Vec<u8>, content_type: &str, filename: &str) -> ApiResult<Response> {
    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(Body::from(bytes))
        .map_err(|e| ApiError::internal(format!("Failed to build download response: {}", e)))
}
