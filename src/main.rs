use std::net::SocketAddr;
use std::sync::Arc;
use axum::{Router, routing::get, response::Html};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::Scalar;

use solar_estimate::api_docs::ApiDoc;
use solar_estimate::config::{Config, FinancialConfig};
use solar_estimate::routes::estimate_routes::api_routes;
use solar_estimate::services::elevation_service::OpenMeteoElevation;
use solar_estimate::services::estimate_engine::EstimateEngine;
use solar_estimate::services::region::RegionTable;
use solar_estimate::services::report_service::ReportService;
use solar_estimate::services::shading::{MetroShadingTable, ShadingEstimator};
use solar_estimate::shared_state::AppState;

#[tokio::main]
async fn main() {
    pretty_env_logger::init_custom_env("RUST_LOG");

    // 1. Load configuration
    let config_path = std::env::var("SOLAR_CONFIG").unwrap_or_else(|_| "config.json".to_string());
    let config = match Config::load_or_default(&config_path) {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load {}: {}", config_path, e);
            return;
        }
    };
    let financial = match FinancialConfig::from_env() {
        Ok(f) => f,
        Err(e) => {
            log::error!("Invalid financial configuration: {}", e);
            return;
        }
    };
    log::info!(
        "Financial config: ${:.2}/W, {}% losses, {}%/yr degradation, ${}/kW-yr O&M, {}%/yr rate increase",
        financial.cost_per_watt,
        financial.losses_pct,
        financial.degradation_pct,
        financial.oandm_per_kw_year,
        financial.rate_increase_pct
    );

    // 2. Build the engine and shading sources
    let engine = EstimateEngine::new(financial, RegionTable::default());

    let metro_table = match config.metro_table.clone() {
        Some(entries) => MetroShadingTable::new(entries),
        None => MetroShadingTable::default(),
    };
    log::info!("Metro shading table: {} entries", metro_table.entries().len());
    let mut shading = ShadingEstimator::new().with_source(Arc::new(metro_table));

    if config.elevation.enabled {
        match OpenMeteoElevation::new(&config.elevation) {
            Ok(provider) => {
                log::info!("Remote elevation enabled: {}", config.elevation.base_url);
                shading = shading.with_elevation(Arc::new(provider), config.elevation.sample_offset_m);
            }
            Err(e) => log::warn!("Elevation client unavailable, shading stays offline: {}", e),
        }
    }

    let state = AppState::new(ReportService::new(engine, shading));

    // 3. Start Axum HTTP server
    let app = Router::new()
        .nest("/api", api_routes(state))
        .route("/scalar", get(|| async {
            Html(Scalar::new(ApiDoc::openapi()).to_html())
        }))
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    log::info!("API Server listening on http://{}", addr);
    log::info!("Scalar UI: http://{}/scalar", addr);

    if let Err(e) = axum_server::bind(addr)
        .serve(app.into_make_service())
        .await
    {
        log::error!("Server error: {}", e);
    }
}
