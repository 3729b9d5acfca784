use std::time::Duration;

use async_trait::async_trait;

use crate::config::ElevationConfig;
use crate::error::ElevationError;
use crate::models::estimate::Coordinates;
use crate::models::shading::ElevationResponse;
use crate::services::shading::ElevationProvider;

/// Elevation lookups against the Open-Meteo elevation API.
pub struct OpenMeteoElevation {
    client: reqwest::Client,
    base_url: String,
}

impl OpenMeteoElevation {
    pub fn new(config: &ElevationConfig) -> Result<Self, ElevationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_s))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// `{base}/v1/elevation?latitude=a,b&longitude=c,d`
fn elevation_url(base_url: &str, points: &[Coordinates]) -> String {
    let latitudes: Vec<String> = points.iter().map(|p| format!("{:.6}", p.lat)).collect();
    let longitudes: Vec<String> = points.iter().map(|p| format!("{:.6}", p.lng)).collect();
    format!(
        "{}/v1/elevation?latitude={}&longitude={}",
        base_url,
        latitudes.join(","),
        longitudes.join(",")
    )
}

#[async_trait]
impl ElevationProvider for OpenMeteoElevation {
    fn name(&self) -> &str {
        "Open-Meteo"
    }

    async fn elevations(&self, points: &[Coordinates]) -> Result<Vec<f64>, ElevationError> {
        let url = elevation_url(&self.base_url, points);
        log::debug!("[ELEVATION] GET {}", url);

        let resp = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<ElevationResponse>()
            .await?;

        if resp.elevation.len() != points.len() {
            return Err(ElevationError::InvalidResponse {
                message: format!(
                    "asked for {} points, got {}",
                    points.len(),
                    resp.elevation.len()
                ),
            });
        }
        Ok(resp.elevation)
    }
}
