use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::config::FinancialConfig;
use crate::models::estimate::{
    Coordinates, EstimateRequest, RegionCode, RegionInfo, ReportRequest, SolarEstimate, SolarReport,
};
use crate::models::shading::{RoofGeometry, ShadingAnalysis, ShadingRequest};
use crate::shared_state::AppState;

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Roof pitch must be 0–90° and azimuth a compass bearing in [0, 360).
fn roof_from_request(tilt: Option<f64>, azimuth: Option<f64>) -> Result<RoofGeometry, String> {
    let roof = RoofGeometry::new(tilt, azimuth);
    if !(0.0..=90.0).contains(&roof.tilt_deg) {
        return Err(format!("roofTilt must be between 0 and 90, got {}", roof.tilt_deg));
    }
    if !(0.0..360.0).contains(&roof.azimuth_deg) {
        return Err(format!("roofAzimuth must be in [0, 360), got {}", roof.azimuth_deg));
    }
    Ok(roof)
}

/// POST /api/estimate
/// Calculate a solar estimate
///
/// Sizes a system for the property and projects cost, first-year savings,
/// payback and 25-year cumulative value. Coordinates outside the supported
/// regions are priced as US.
#[utoipa::path(
    post,
    path = "/api/estimate",
    request_body = EstimateRequest,
    responses(
        (status = 200, description = "Solar estimate", body = SolarEstimate)
    )
)]
pub async fn create_estimate(
    State(state): State<AppState>,
    Json(req): Json<EstimateRequest>,
) -> impl IntoResponse {
    let estimate = state
        .reports
        .engine()
        .calculate(Coordinates::new(req.lat, req.lng), &req.address);
    Json(estimate).into_response()
}

/// POST /api/report
/// Generate a full solar report
///
/// Combines the estimate with a roof shading analysis and the modeled
/// annual shading loss.
#[utoipa::path(
    post,
    path = "/api/report",
    request_body = ReportRequest,
    responses(
        (status = 200, description = "Solar report", body = SolarReport),
        (status = 400, description = "Invalid roof geometry")
    )
)]
pub async fn create_report(
    State(state): State<AppState>,
    Json(req): Json<ReportRequest>,
) -> impl IntoResponse {
    let roof = match roof_from_request(req.roof_tilt, req.roof_azimuth) {
        Ok(r) => r,
        Err(message) => return bad_request(message),
    };
    let report = state
        .reports
        .generate(Coordinates::new(req.lat, req.lng), &req.address, roof)
        .await;
    Json(report).into_response()
}

/// POST /api/shading
/// Analyze roof shading
#[utoipa::path(
    post,
    path = "/api/shading",
    request_body = ShadingRequest,
    responses(
        (status = 200, description = "Shading analysis", body = ShadingAnalysis),
        (status = 400, description = "Invalid roof geometry")
    )
)]
pub async fn analyze_shading(
    State(state): State<AppState>,
    Json(req): Json<ShadingRequest>,
) -> impl IntoResponse {
    let roof = match roof_from_request(req.roof_tilt, req.roof_azimuth) {
        Ok(r) => r,
        Err(message) => return bad_request(message),
    };
    let analysis = state
        .reports
        .shading()
        .analyze(Coordinates::new(req.lat, req.lng), roof)
        .await;
    Json(analysis).into_response()
}

/// GET /api/regions
/// List supported regions with their electricity rate and installed cost per watt.
#[utoipa::path(
    get,
    path = "/api/regions",
    responses(
        (status = 200, description = "Regional pricing", body = Vec<RegionInfo>)
    )
)]
pub async fn list_regions(State(state): State<AppState>) -> impl IntoResponse {
    let engine = state.reports.engine();
    let regions: Vec<RegionInfo> = RegionCode::ALL
        .iter()
        .map(|&region| {
            let profile = engine.regions().profile(region);
            RegionInfo {
                region,
                electricity_rate_usd_kwh: profile.electricity_rate_usd_kwh,
                installation_cost_per_watt: engine.config().cost_per_watt
                    * profile.installation_cost_multiplier,
            }
        })
        .collect();
    Json(regions).into_response()
}

/// GET /api/config
/// Active financial assumptions
#[utoipa::path(
    get,
    path = "/api/config",
    responses(
        (status = 200, description = "Financial configuration", body = FinancialConfig)
    )
)]
pub async fn get_financial_config(State(state): State<AppState>) -> impl IntoResponse {
    Json(*state.reports.engine().config()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::estimate_engine::EstimateEngine;
    use crate::services::report_service::ReportService;
    use crate::services::shading::ShadingEstimator;

    fn state() -> AppState {
        AppState::new(ReportService::new(EstimateEngine::default(), ShadingEstimator::default()))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_create_estimate() {
        let req = EstimateRequest { lat: 51.5, lng: -0.1, address: "London".to_string() };
        let response = create_estimate(State(state()), Json(req)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["region"], "UK");
        assert_eq!(json["address"], "London");
        assert_eq!(json["systemSizeKW"], 7.6);
    }

    #[tokio::test]
    async fn test_create_report_defaults_roof() {
        let req = ReportRequest {
            lat: 34.0522,
            lng: -118.2437,
            address: "123 Main St".to_string(),
            roof_tilt: None,
            roof_azimuth: None,
        };
        let response = create_report(State(state()), Json(req)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["shading"]["method"], "usgs");
        assert_eq!(json["estimate"]["confidenceRange"], "±10%");
    }

    #[tokio::test]
    async fn test_invalid_roof_is_rejected() {
        let req = ShadingRequest { lat: 34.0, lng: -118.0, roof_tilt: Some(120.0), roof_azimuth: None };
        let response = analyze_shading(State(state()), Json(req)).await.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("roofTilt"));

        let req = ShadingRequest { lat: 34.0, lng: -118.0, roof_tilt: None, roof_azimuth: Some(360.0) };
        let response = analyze_shading(State(state()), Json(req)).await.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_regions() {
        let response = list_regions(State(state())).await.into_response();
        let json = body_json(response).await;
        let regions = json.as_array().unwrap();
        assert_eq!(regions.len(), 6);
        let uk = regions.iter().find(|r| r["region"] == "UK").unwrap();
        assert_eq!(uk["electricityRateUsdKwh"], 0.28);
    }

    #[tokio::test]
    async fn test_get_financial_config() {
        let response = get_financial_config(State(state())).await.into_response();
        let json = body_json(response).await;
        assert_eq!(json["costPerWatt"], 3.0);
        assert_eq!(json["lossesPct"], 14.0);
        assert_eq!(json["oandmPerKwYear"], 22.0);
    }
}
