use crate::models::estimate::{Coordinates, SolarReport};
use crate::models::shading::RoofGeometry;
use crate::services::estimate_engine::EstimateEngine;
use crate::services::hourly_shading::{annual_shading_loss, HourlyShadingFactors};
use crate::services::shading::ShadingEstimator;

/// Builds the full property report: financial estimate plus roof shading.
#[derive(Clone)]
pub struct ReportService {
    engine: EstimateEngine,
    shading: ShadingEstimator,
}

impl ReportService {
    pub fn new(engine: EstimateEngine, shading: ShadingEstimator) -> Self {
        Self { engine, shading }
    }

    pub fn engine(&self) -> &EstimateEngine {
        &self.engine
    }

    pub fn shading(&self) -> &ShadingEstimator {
        &self.shading
    }

    pub async fn generate(&self, coordinates: Coordinates, address: &str, roof: RoofGeometry) -> SolarReport {
        let estimate = self.engine.calculate(coordinates, address);
        let shading = self.shading.analyze(coordinates, roof).await;
        let annual_shading_loss_pct = annual_shading_loss(HourlyShadingFactors::modeled(
            shading.shading_factor,
            coordinates.lat,
        ));

        log::info!(
            "[REPORT] {} | {} | {:.1} kW | shading {:.2} ({:?}) | loss {:.1}%",
            estimate.id,
            estimate.region,
            estimate.system_size_kw,
            shading.shading_factor,
            shading.method,
            annual_shading_loss_pct
        );

        SolarReport {
            estimate,
            shading,
            annual_shading_loss_pct,
        }
    }
}
