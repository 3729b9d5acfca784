use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::shading::ShadingAnalysis;

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Geocoded property location (decimal degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

// ─── Region codes ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum RegionCode {
    #[serde(rename = "US")]
    Us,
    Canada,
    #[serde(rename = "UK")]
    Uk,
    Germany,
    Australia,
    Japan,
}

impl RegionCode {
    pub const ALL: [RegionCode; 6] = [
        RegionCode::Us,
        RegionCode::Canada,
        RegionCode::Uk,
        RegionCode::Germany,
        RegionCode::Australia,
        RegionCode::Japan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegionCode::Us => "US",
            RegionCode::Canada => "Canada",
            RegionCode::Uk => "UK",
            RegionCode::Germany => "Germany",
            RegionCode::Australia => "Australia",
            RegionCode::Japan => "Japan",
        }
    }
}

impl std::fmt::Display for RegionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Estimate record ─────────────────────────────────────────────────────────

/// Financial and production projection for one property.
///
/// Every derived field is a pure function of the coordinates and the
/// engine's financial configuration; only `id` and `date` differ between
/// two runs with identical inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SolarEstimate {
    pub id: Uuid,
    pub address: String,
    pub coordinates: Coordinates,
    pub date: DateTime<Utc>,
    /// DC system size (kW), one decimal
    #[serde(rename = "systemSizeKW")]
    pub system_size_kw: f64,
    /// First-year production (kWh)
    #[serde(rename = "annualProductionKWh")]
    pub annual_production_kwh: f64,
    /// Installed cost (USD)
    pub estimated_cost: f64,
    /// First-year savings net of O&M (USD)
    pub estimated_savings: f64,
    /// Years to recover cost, one decimal. `None` when savings are not positive.
    pub payback_period_years: Option<f64>,
    /// Undiscounted cumulative 25-year savings minus cost (USD)
    #[serde(rename = "npv25Year")]
    pub npv_25_year: f64,
    /// Avoided emissions (lbs CO2 / year)
    #[serde(rename = "co2OffsetPerYear")]
    pub co2_offset_per_year: f64,
    pub confidence_range: String,
    pub region: RegionCode,
}

// ─── Report ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SolarReport {
    pub estimate: SolarEstimate,
    pub shading: ShadingAnalysis,
    /// Mean hourly shading loss over a modeled year (%)
    pub annual_shading_loss_pct: f64,
}

// ─── REST API request / response types ───────────────────────────────────────

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    pub roof_tilt: Option<f64>,
    pub roof_azimuth: Option<f64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegionInfo {
    pub region: RegionCode,
    pub electricity_rate_usd_kwh: f64,
    pub installation_cost_per_watt: f64,
}
