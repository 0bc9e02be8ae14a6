use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::client::Client;
use crate::performance::reconcile;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListClientsQuery {
    pub user_id: Option<String>,
}

/// GET /api/v1/clients
///
/// With `user_id`, returns only that user's accounts; without it, the
/// full (admin) list.
pub async fn handle_list_clients(
    State(state): State<AppState>,
    Query(params): Query<ListClientsQuery>,
) -> Json<Vec<Client>> {
    let clients = state.repo.clients();
    match params.user_id {
        Some(user_id) => Json(clients.into_iter().filter(|c| c.user_id == user_id).collect()),
        None => Json(clients),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    pub name: String,
    #[serde(default)]
    pub logo: String,
    pub currency: String,
    pub user_id: Option<String>,
}

/// POST /api/v1/clients
pub async fn handle_create_client(
    State(state): State<AppState>,
    Json(req): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<Client>), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("Client name must not be empty".into()));
    }

    // Default owner when none is given, matching the single-user setup.
    let client = Client {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        logo: req.logo,
        currency: req.currency,
        user_id: req.user_id.unwrap_or_else(|| "user".to_string()),
    };

    let mut clients = state.repo.clients();
    clients.push(client.clone());
    state.repo.set_clients(&clients).map_err(AppError::Storage)?;

    Ok((StatusCode::CREATED, Json(client)))
}

/// DELETE /api/v1/clients/:id
///
/// Cascades over everything scoped to the client: analysis history,
/// performance rows and processed-report hashes. Cache entries are left to
/// expire; their keys embed the client id and can never hit again.
pub async fn handle_delete_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut clients = state.repo.clients();
    let before = clients.len();
    clients.retain(|c| c.id != client_id);
    if clients.len() == before {
        return Err(AppError::NotFound(format!("Client {client_id} not found")));
    }
    state.repo.set_clients(&clients).map_err(AppError::Storage)?;

    let history: Vec<_> = state
        .repo
        .history()
        .into_iter()
        .filter(|e| e.client_id != client_id)
        .collect();
    state.repo.set_history(&history).map_err(AppError::Storage)?;

    state
        .repo
        .remove_client_rows(&client_id)
        .map_err(AppError::Storage)?;
    state
        .repo
        .remove_processed_hashes(&client_id)
        .map_err(AppError::Storage)?;

    if state.repo.current_client_id().as_deref() == Some(client_id.as_str()) {
        state
            .repo
            .clear_current_client_id()
            .map_err(AppError::Storage)?;
    }

    info!("Deleted client {client_id} and all associated data");
    Ok(StatusCode::NO_CONTENT)
}

/// Per-client rollup for the client list view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    #[serde(flatten)]
    pub client: Client,
    pub spend: f64,
    pub purchases: i64,
    pub roas: f64,
    pub total_rows: usize,
    pub matched_count: usize,
    pub analysis_count: usize,
}

/// GET /api/v1/clients/summary
pub async fn handle_client_summaries(State(state): State<AppState>) -> Json<Vec<ClientSummary>> {
    let clients = state.repo.clients();
    let performance = state.repo.performance_data();
    let history = state.repo.history();

    let summaries = clients
        .into_iter()
        .map(|client| {
            let rows = performance.get(&client.id).cloned().unwrap_or_default();
            let spend: f64 = rows.iter().map(|r| r.spend).sum();
            let purchases: i64 = rows.iter().map(|r| r.purchases).sum();
            let value: f64 = rows.iter().map(|r| r.purchase_value).sum();
            let matched_count = rows
                .iter()
                .filter(|r| reconcile::find_history_match(r, &history).is_some())
                .count();
            let analysis_count = history.iter().filter(|e| e.client_id == client.id).count();

            ClientSummary {
                spend,
                purchases,
                roas: if spend > 0.0 { value / spend } else { 0.0 },
                total_rows: rows.len(),
                matched_count,
                analysis_count,
                client,
            }
        })
        .collect();

    Json(summaries)
}
