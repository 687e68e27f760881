//! API Routes
//!
//! Configures the Axum router with all clinical notes endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::*;

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin; the editor runs from a local file or dev server
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // service
        .route("/health", get(health_handler))
        .route("/cache/stats", get(stats_handler))
        // stateless tools
        .route("/sanitize", post(sanitize_handler))
        .route("/doses/cycle", post(cycle_dose_handler))
        .route("/rut/validate", post(rut_handler))
        .route("/templates/:id", get(template_handler))
        // records
        .route("/records/current", get(current_record_handler).put(update_record_handler))
        .route("/records/new/:template", post(new_record_handler))
        .route("/records/validate", post(validate_record_handler))
        .route("/records/import", post(import_record_handler))
        // medications
        .route("/medications/import", post(import_medications_handler))
        .route("/medications/cycle", post(cycle_medication_handler))
        .route("/medications/chart", post(chart_handler))
        // local store
        .route(
            "/draft",
            get(get_draft_handler)
                .put(save_draft_handler)
                .delete(clear_draft_handler),
        )
        .route("/draft/restore", post(restore_draft_handler))
        .route("/history", get(history_handler))
        .route("/favorites", get(favorites_handler).post(add_favorite_handler))
        .route("/favorites/:id", delete(remove_favorite_handler))
        .route("/recent", get(recent_handler))
        .route(
            "/settings/default-folder",
            get(get_default_folder_handler).put(set_default_folder_handler),
        )
        // drive
        .route("/auth/session", put(sign_in_handler).delete(sign_out_handler))
        .route("/drive/folders", post(create_folder_handler))
        .route("/drive/folders/:id", get(list_folder_handler))
        .route("/drive/records", post(save_record_handler))
        .route("/drive/records/:id", get(open_record_handler))
        .route("/drive/search", post(search_handler))
        // ai
        .route("/ai/complete", post(complete_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
