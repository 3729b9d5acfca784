use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Where a shading factor came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ShadingMethod {
    /// Geographic heuristic, no external data
    Proxy,
    /// Precomputed metro-area table (USGS-derived)
    Usgs,
    /// Live elevation lookup around the roof
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Accuracy {
    Low,
    Medium,
    High,
}

/// Roof orientation used for shading.
/// Azimuth in degrees clockwise from North (180 = due South).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoofGeometry {
    pub tilt_deg: f64,
    pub azimuth_deg: f64,
}

impl RoofGeometry {
    pub const DEFAULT_TILT_DEG: f64 = 22.0;
    pub const DEFAULT_AZIMUTH_DEG: f64 = 180.0;

    pub fn new(tilt_deg: Option<f64>, azimuth_deg: Option<f64>) -> Self {
        Self {
            tilt_deg: tilt_deg.unwrap_or(Self::DEFAULT_TILT_DEG),
            azimuth_deg: azimuth_deg.unwrap_or(Self::DEFAULT_AZIMUTH_DEG),
        }
    }
}

impl Default for RoofGeometry {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShadingAnalysis {
    pub method: ShadingMethod,
    /// Fraction of unshaded production that survives (1.0 = no loss)
    pub shading_factor: f64,
    /// 0..1
    pub confidence: f64,
    pub accuracy: Accuracy,
    pub data_source: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShadingRequest {
    pub lat: f64,
    pub lng: f64,
    pub roof_tilt: Option<f64>,
    pub roof_azimuth: Option<f64>,
}

// ─── Open-Meteo wire types ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ElevationResponse {
    pub elevation: Vec<f64>,
}
