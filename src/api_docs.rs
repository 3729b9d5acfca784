use utoipa::OpenApi;
use crate::controllers::estimate_controller;
use crate::models::{estimate, shading};
use crate::config;

#[derive(OpenApi)]
#[openapi(
    paths(
        estimate_controller::create_estimate,
        estimate_controller::create_report,
        estimate_controller::analyze_shading,
        estimate_controller::list_regions,
        estimate_controller::get_financial_config
    ),
    components(
        schemas(
            estimate::Coordinates,
            estimate::RegionCode,
            estimate::SolarEstimate,
            estimate::SolarReport,
            estimate::EstimateRequest,
            estimate::ReportRequest,
            estimate::RegionInfo,
            shading::ShadingAnalysis,
            shading::ShadingMethod,
            shading::Accuracy,
            shading::ShadingRequest,
            config::FinancialConfig
        )
    ),
    tags(
        (name = "solar-estimate", description = "Solar Estimate API")
    )
)]
pub struct ApiDoc;
