pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::analysis::handlers as analysis_handlers;
use crate::clients::handlers as client_handlers;
use crate::performance::handlers as performance_handlers;
use crate::settings;
use crate::state::AppState;
use crate::users::handlers as user_handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Clients
        .route(
            "/api/v1/clients",
            get(client_handlers::handle_list_clients).post(client_handlers::handle_create_client),
        )
        .route(
            "/api/v1/clients/summary",
            get(client_handlers::handle_client_summaries),
        )
        .route(
            "/api/v1/clients/:id",
            delete(client_handlers::handle_delete_client),
        )
        // User accounts
        .route(
            "/api/v1/users",
            get(user_handlers::handle_list_users).post(user_handlers::handle_create_user),
        )
        .route(
            "/api/v1/users/:id",
            put(user_handlers::handle_update_user).delete(user_handlers::handle_delete_user),
        )
        // Creative analysis
        .route(
            "/api/v1/creatives/precheck",
            post(analysis_handlers::handle_precheck),
        )
        .route(
            "/api/v1/creatives/analyze",
            post(analysis_handlers::handle_analyze),
        )
        .route("/api/v1/history", get(analysis_handlers::handle_history))
        // Performance reports
        .route(
            "/api/v1/clients/:id/reports",
            post(performance_handlers::handle_report_upload),
        )
        .route(
            "/api/v1/clients/:id/reports/undo",
            post(performance_handlers::handle_undo_upload),
        )
        .route(
            "/api/v1/clients/:id/performance",
            get(performance_handlers::handle_performance_view)
                .delete(performance_handlers::handle_clear_performance),
        )
        .route(
            "/api/v1/clients/:id/performance/insights",
            post(performance_handlers::handle_generate_insights),
        )
        // Settings (simulated connection)
        .route(
            "/api/v1/settings/db",
            get(settings::handle_db_status).post(settings::handle_test_connection),
        )
        .with_state(state)
}
