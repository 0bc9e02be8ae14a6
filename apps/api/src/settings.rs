use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;

/// Simulated database connection settings. There is no real network
/// target: "connected" just means every field is filled in, and the flag
/// gates the upload flow the way the original dashboard did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub host: String,
    pub port: String,
    pub user: String,
    pub pass: String,
    pub database: String,
}

impl DbConfig {
    pub fn is_complete(&self) -> bool {
        !self.host.is_empty()
            && !self.port.is_empty()
            && !self.user.is_empty()
            && !self.pass.is_empty()
            && !self.database.is_empty()
    }
}

#[derive(Debug, Serialize)]
pub struct DbStatusResponse {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<DbConfig>,
}

/// POST /api/v1/settings/db: "test connection" and persist the outcome.
pub async fn handle_test_connection(
    State(state): State<AppState>,
    Json(config): Json<DbConfig>,
) -> Result<Json<DbStatusResponse>, AppError> {
    let connected = config.is_complete();
    if connected {
        state.repo.set_db_config(&config).map_err(AppError::Storage)?;
    }
    state.repo.set_db_status(connected).map_err(AppError::Storage)?;

    Ok(Json(DbStatusResponse {
        connected,
        config: connected.then_some(config),
    }))
}

/// GET /api/v1/settings/db
pub async fn handle_db_status(State(state): State<AppState>) -> Json<DbStatusResponse> {
    Json(DbStatusResponse {
        connected: state.repo.db_status(),
        config: state.repo.db_config(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_config() {
        let config = DbConfig {
            host: "localhost".into(),
            port: "5432".into(),
            user: "ads".into(),
            pass: "secret".into(),
            database: "adlens".into(),
        };
        assert!(config.is_complete());
    }

    #[test]
    fn test_incomplete_config() {
        let config = DbConfig {
            host: "localhost".into(),
            port: String::new(),
            user: "ads".into(),
            pass: "secret".into(),
            database: "adlens".into(),
        };
        assert!(!config.is_complete());
    }
}
