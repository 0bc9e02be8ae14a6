use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::prompts;
use crate::errors::AppError;
use crate::hash::content_hash;
use crate::models::performance::{MatchedPerformanceRecord, UploadSummary};
use crate::performance::{metrics, reconcile, report};
use crate::state::AppState;

/// POST /api/v1/clients/:id/reports
///
/// Report merge flow: file-level dedup first (a re-uploaded file is
/// rejected before any row is parsed into the store), then parse, then
/// row-level dedup, then persist. No partial merge on failure.
pub async fn handle_report_upload(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadSummary>, AppError> {
    if state.repo.find_client(&client_id).is_none() {
        return Err(AppError::NotFound(format!("Client {client_id} not found")));
    }

    let mut bytes = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            bytes = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file field: {e}")))?
                    .to_vec(),
            );
        }
    }
    let bytes = bytes.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;

    let file_hash = content_hash(&bytes);
    let mut processed = state.repo.processed_hashes(&client_id);
    if processed.contains(&file_hash) {
        return Err(AppError::AlreadyProcessed(
            "This report file has already been processed for this client".to_string(),
        ));
    }

    let parsed = report::parse_report(&bytes, &client_id, &file_hash)?;

    let existing = state.repo.client_rows(&client_id);
    let outcome = reconcile::merge_rows(&existing, parsed);
    let records_added = outcome.added.len();

    if records_added > 0 {
        let mut rows = existing;
        rows.extend(outcome.added);
        state
            .repo
            .set_client_rows(&client_id, rows)
            .map_err(AppError::Storage)?;

        processed.push(file_hash.clone());
        state
            .repo
            .set_processed_hashes(&client_id, processed)
            .map_err(AppError::Storage)?;
    }

    info!(
        "Report merged for client {client_id}: {records_added} added, {} duplicates",
        outcome.duplicates
    );

    Ok(Json(UploadSummary {
        client_id,
        file_hash,
        records_added,
        duplicates_ignored: outcome.duplicates,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoRequest {
    pub file_hash: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoResponse {
    pub records_removed: usize,
    pub records_remaining: usize,
}

/// POST /api/v1/clients/:id/reports/undo
///
/// Compensating action for the last upload: drops every row tagged with
/// the file hash and unregisters the hash so the same file can be uploaded
/// again.
pub async fn handle_undo_upload(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Json(req): Json<UndoRequest>,
) -> Result<Json<UndoResponse>, AppError> {
    let rows = state.repo.client_rows(&client_id);
    let before = rows.len();
    let restored = reconcile::undo_last_upload(rows, &req.file_hash);
    let remaining = restored.len();

    state
        .repo
        .set_client_rows(&client_id, restored)
        .map_err(AppError::Storage)?;

    let hashes = state
        .repo
        .processed_hashes(&client_id)
        .into_iter()
        .filter(|h| h != &req.file_hash)
        .collect();
    state
        .repo
        .set_processed_hashes(&client_id, hashes)
        .map_err(AppError::Storage)?;

    Ok(Json(UndoResponse {
        records_removed: before - remaining,
        records_remaining: remaining,
    }))
}

/// DELETE /api/v1/clients/:id/performance
pub async fn handle_clear_performance(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .repo
        .remove_client_rows(&client_id)
        .map_err(AppError::Storage)?;
    state
        .repo
        .remove_processed_hashes(&client_id)
        .map_err(AppError::Storage)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct PerformanceQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub matched_only: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceViewResponse {
    pub records: Vec<MatchedPerformanceRecord>,
    pub summary: metrics::SummaryMetrics,
    pub top_creatives: Vec<metrics::TopCreative>,
}

/// GET /api/v1/clients/:id/performance
///
/// The reconciled view: rows joined against analysis history, date-filtered,
/// newest day first, with summary metrics and the top-creative ranking
/// computed over the filtered set.
pub async fn handle_performance_view(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Query(params): Query<PerformanceQuery>,
) -> Result<Json<PerformanceViewResponse>, AppError> {
    if state.repo.find_client(&client_id).is_none() {
        return Err(AppError::NotFound(format!("Client {client_id} not found")));
    }

    let rows = state.repo.client_rows(&client_id);
    let history = state.repo.history();

    let mut matched = reconcile::reconcile(&rows, &history);
    matched.sort_by(|a, b| b.record.day.cmp(&a.record.day));

    let filtered = metrics::filter_by_date(matched, params.start, params.end);
    let summary = metrics::summarize(&filtered);
    let top_creatives = metrics::top_creatives(&filtered);

    let records = if params.matched_only {
        filtered.into_iter().filter(|r| r.is_matched).collect()
    } else {
        filtered
    };

    Ok(Json(PerformanceViewResponse {
        records,
        summary,
        top_creatives,
    }))
}

#[derive(Debug, Deserialize)]
pub struct InsightsQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub insights: String,
}

/// POST /api/v1/clients/:id/performance/insights
///
/// Free-text "why did these work" summary over the current top creatives.
/// Only descriptions carried in by the reconciler feed the prompt; with no
/// matched creatives in range there is nothing to analyze and the request
/// is rejected. A failed call answers with a fixed error text and, like
/// the analyze path, is never retried automatically.
pub async fn handle_generate_insights(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Query(params): Query<InsightsQuery>,
) -> Result<Json<InsightsResponse>, AppError> {
    if state.repo.find_client(&client_id).is_none() {
        return Err(AppError::NotFound(format!("Client {client_id} not found")));
    }

    let rows = state.repo.client_rows(&client_id);
    let history = state.repo.history();
    let reconciled = reconcile::reconcile(&rows, &history);
    let filtered = metrics::filter_by_date(reconciled, params.start, params.end);
    let top = metrics::top_creatives(&filtered);

    let descriptions = metrics::matched_descriptions(top);
    if descriptions.is_empty() {
        return Err(AppError::Validation(
            "No analyzed creatives in range to generate insights from".into(),
        ));
    }

    let prompt = prompts::build_insights_prompt(&descriptions);
    let insights = match state.llm.generate_text(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Insights generation failed for client {client_id}: {e}");
            "Error generando insights".to_string()
        }
    };

    Ok(Json(InsightsResponse { insights }))
}
