use axum::{routing::{get, post}, Router};
use crate::controllers::estimate_controller::{
    // Calculations
    create_estimate, create_report, analyze_shading,
    // Reference data
    list_regions, get_financial_config,
};
use crate::shared_state::AppState;

/// Build the `/api/*` sub-router.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/estimate",  post(create_estimate))
        .route("/report",    post(create_report))
        .route("/shading",   post(analyze_shading))
        .route("/regions",   get(list_regions))
        .route("/config",    get(get_financial_config))
        .with_state(state)
}
