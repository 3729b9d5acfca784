/// ============================================================
///  Residential Solar Estimate Engine
///
///  Pipeline:
///   1. Region      – bounding-box country lookup → rate, cost multiplier
///   2. Irradiance  – latitude band → peak sun hours
///   3. Sizing      – cover 80 % of a 12,000 kWh/yr household load
///   4. Economics   – installed cost, first-year savings net of O&M,
///                    simple payback
///   5. 25-year NPV – undiscounted cumulative savings with panel
///                    degradation and electricity rate inflation
///   6. CO2 offset  – EPA grid-average emission factor
/// ============================================================

use chrono::Utc;
use uuid::Uuid;

use crate::config::FinancialConfig;
use crate::models::estimate::{Coordinates, SolarEstimate};
use crate::services::irradiance::solar_irradiance;
use crate::services::region::RegionTable;

// ─── Constants ───────────────────────────────────────────────
const BASELINE_LOAD_KWH_YEAR: f64 = 12_000.0;
const TARGET_OFFSET: f64 = 0.80;
const DAYS_PER_YEAR: f64 = 365.0;
const ANALYSIS_YEARS: u32 = 25;
const CO2_LBS_PER_KWH: f64 = 0.92;
const HIGH_CONFIDENCE_IRRADIANCE: f64 = 4.5;

/// Rounds half-way cases toward +∞ (so `-2.5 → -2`, `2.5 → 3`).
pub fn round_half_up(value: f64) -> f64 {
    // `(value + 0.5).floor()` loses the fraction when the addition rounds
    let floor = value.floor();
    if value - floor >= 0.5 { floor + 1.0 } else { floor }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    round_half_up(value * scale) / scale
}

#[derive(Debug, Clone, Default)]
pub struct EstimateEngine {
    config: FinancialConfig,
    regions: RegionTable,
}

impl EstimateEngine {
    pub fn new(config: FinancialConfig, regions: RegionTable) -> Self {
        Self { config, regions }
    }

    pub fn config(&self) -> &FinancialConfig {
        &self.config
    }

    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    /// Produces a fresh estimate. Coordinates are not validated: anything
    /// outside the known regions is priced as `US`.
    pub fn calculate(&self, coordinates: Coordinates, address: &str) -> SolarEstimate {
        let cfg = &self.config;

        // ── 1. Region & irradiance ─────────────────────────────
        let region = self.regions.classify(coordinates);
        let profile = self.regions.profile(region);
        let irradiance = solar_irradiance(coordinates.lat);
        let electricity_rate = profile.electricity_rate_usd_kwh;
        let installation_cost = cfg.cost_per_watt * profile.installation_cost_multiplier;

        // ── 2. Sizing ──────────────────────────────────────────
        let target_production = BASELINE_LOAD_KWH_YEAR * TARGET_OFFSET;
        let efficiency_factor = (100.0 - cfg.losses_pct) / 100.0;
        let system_size_kw = round_to(
            target_production / (irradiance * DAYS_PER_YEAR * efficiency_factor),
            1,
        );
        let annual_production_kwh =
            round_half_up(system_size_kw * irradiance * DAYS_PER_YEAR * efficiency_factor);

        // ── 3. Cost & first-year savings ───────────────────────
        let estimated_cost = round_half_up(system_size_kw * 1000.0 * installation_cost);
        let annual_oandm_cost = system_size_kw * cfg.oandm_per_kw_year;
        let estimated_savings =
            round_half_up(annual_production_kwh * electricity_rate - annual_oandm_cost);

        let payback_period_years = if estimated_savings > 0.0 {
            Some(round_to(estimated_cost / estimated_savings, 1))
        } else {
            None
        };

        // ── 4. 25-year cumulative cash flow ────────────────────
        let npv_25_year = round_half_up(
            self.cumulative_savings(annual_production_kwh, electricity_rate, annual_oandm_cost)
                - estimated_cost,
        );

        // ── 5. Environmental ───────────────────────────────────
        let co2_offset_per_year = round_half_up(annual_production_kwh * CO2_LBS_PER_KWH);

        let confidence_range = if irradiance > HIGH_CONFIDENCE_IRRADIANCE {
            "±10%"
        } else {
            "±15%"
        };

        log::debug!(
            "[ESTIMATE] {} ({:.4}, {:.4}) → {} | {:.1} kW | {} kWh/yr | ${} cost | ${} savings",
            address,
            coordinates.lat,
            coordinates.lng,
            region,
            system_size_kw,
            annual_production_kwh,
            estimated_cost,
            estimated_savings
        );

        SolarEstimate {
            id: Uuid::now_v7(),
            address: address.to_string(),
            coordinates,
            date: Utc::now(),
            system_size_kw,
            annual_production_kwh,
            estimated_cost,
            estimated_savings,
            payback_period_years,
            npv_25_year,
            co2_offset_per_year,
            confidence_range: confidence_range.to_string(),
            region,
        }
    }

    /// Sum of yearly savings over the analysis horizon. Production degrades
    /// after each year, and the rate compounds at `rate_increase_pct`.
    fn cumulative_savings(&self, first_year_kwh: f64, first_year_rate: f64, oandm: f64) -> f64 {
        let degradation = 1.0 - self.config.degradation_pct / 100.0;
        let inflation = 1.0 + self.config.rate_increase_pct / 100.0;

        let mut production = first_year_kwh;
        let mut rate = first_year_rate;
        let mut total = 0.0;
        for _year in 1..=ANALYSIS_YEARS {
            total += production * rate - oandm;
            production *= degradation;
            rate *= inflation;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::estimate::RegionCode;

    fn engine() -> EstimateEngine {
        EstimateEngine::default()
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(1397.64), 1398.0);
        assert_eq!(round_to(6.1166, 1), 6.1);
        assert_eq!(round_to(13.0901, 1), 13.1);
    }

    #[test]
    fn test_round_half_up_near_float_limits() {
        // Largest double below 0.5
        assert_eq!(round_half_up(0.49999999999999994), 0.0);
        assert_eq!(round_half_up(-0.49999999999999994), 0.0);
        // Above 2^52 every double is already an integer
        assert_eq!(round_half_up(4503599627370497.0), 4503599627370497.0);
        assert_eq!(round_half_up(-4503599627370497.0), -4503599627370497.0);
    }

    #[test]
    fn test_los_angeles() {
        let e = engine().calculate(Coordinates::new(34.0522, -118.2437), "123 Main St");
        assert_eq!(e.region, RegionCode::Us);
        assert_eq!(e.address, "123 Main St");
        assert_eq!(e.confidence_range, "±10%");
        // 9600 / (5.0 × 365 × 0.86) = 6.117 → 6.1 kW
        assert_eq!(e.system_size_kw, 6.1);
        assert_eq!(e.annual_production_kwh, 9574.0);
        assert_eq!(e.estimated_cost, 18300.0);
        assert_eq!(e.estimated_savings, 1398.0);
        assert_eq!(e.payback_period_years, Some(13.1));
        assert_eq!(e.co2_offset_per_year, 8808.0);
        assert!(e.npv_25_year > 0.0);
    }

    #[test]
    fn test_london() {
        let e = engine().calculate(Coordinates::new(51.5, -0.1), "10 Downing St");
        assert_eq!(e.region, RegionCode::Uk);
        assert_eq!(e.confidence_range, "±15%");
        // 9600 / (4.0 × 365 × 0.86) = 7.646 → 7.6 kW
        assert_eq!(e.system_size_kw, 7.6);
        assert_eq!(e.annual_production_kwh, 9543.0);
        assert_eq!(e.estimated_cost, 27360.0);
        assert_eq!(e.estimated_savings, 2505.0);
        assert_eq!(e.payback_period_years, Some(10.9));
    }

    #[test]
    fn test_tropical_boundary_uses_tropical_band() {
        let e = engine().calculate(Coordinates::new(23.5, -100.0), "");
        // 9600 / (5.5 × 365 × 0.86) = 5.56 → 5.6 kW
        assert_eq!(e.system_size_kw, 5.6);
        assert_eq!(e.confidence_range, "±10%");
    }

    #[test]
    fn test_identical_inputs_give_identical_figures() {
        let engine = engine();
        let c = Coordinates::new(47.6, -122.3);
        let a = engine.calculate(c, "addr");
        let b = engine.calculate(c, "addr");
        assert_ne!(a.id, b.id);
        let b = SolarEstimate { id: a.id, date: a.date, ..b };
        assert_eq!(a, b);
    }

    #[test]
    fn test_system_size_positive_everywhere() {
        let engine = engine();
        let mut lat = -90.0;
        while lat <= 90.0 {
            let mut lng = -180.0;
            while lng <= 180.0 {
                let e = engine.calculate(Coordinates::new(lat, lng), "");
                assert!(e.system_size_kw > 0.0, "size not positive at ({lat}, {lng})");
                lng += 15.0;
            }
            lat += 7.5;
        }
    }

    #[test]
    fn test_npv_without_degradation_or_inflation() {
        let config = FinancialConfig {
            degradation_pct: 0.0,
            rate_increase_pct: 0.0,
            ..FinancialConfig::default()
        };
        let engine = EstimateEngine::new(config, RegionTable::default());
        let e = engine.calculate(Coordinates::new(34.0522, -118.2437), "");

        // Savings are rounded per year, so allow half a dollar of drift per year.
        let expected = 25.0 * e.estimated_savings - e.estimated_cost;
        assert!((e.npv_25_year - expected).abs() <= 12.5, "{} vs {}", e.npv_25_year, expected);

        let exact = round_half_up(25.0 * (9574.0 * 0.16 - 6.1 * 22.0) - 18300.0);
        assert_eq!(e.npv_25_year, exact);
    }

    #[test]
    fn test_degradation_and_inflation_move_npv() {
        let base = FinancialConfig { degradation_pct: 0.0, rate_increase_pct: 0.0, ..FinancialConfig::default() };
        let c = Coordinates::new(34.0522, -118.2437);
        let flat = EstimateEngine::new(base, RegionTable::default()).calculate(c, "");
        let degraded = EstimateEngine::new(
            FinancialConfig { degradation_pct: 0.5, ..base },
            RegionTable::default(),
        )
        .calculate(c, "");
        let inflated = EstimateEngine::new(
            FinancialConfig { rate_increase_pct: 2.5, ..base },
            RegionTable::default(),
        )
        .calculate(c, "");
        assert!(degraded.npv_25_year < flat.npv_25_year);
        assert!(inflated.npv_25_year > flat.npv_25_year);
    }

    #[test]
    fn test_non_positive_savings_have_no_payback() {
        let config = FinancialConfig { oandm_per_kw_year: 10_000.0, ..FinancialConfig::default() };
        let e = EstimateEngine::new(config, RegionTable::default())
            .calculate(Coordinates::new(34.0522, -118.2437), "");
        assert!(e.estimated_savings < 0.0);
        assert_eq!(e.payback_period_years, None);
        assert!(e.npv_25_year < -e.estimated_cost);
    }

    #[test]
    fn test_zero_savings_have_no_payback() {
        // 9574 kWh × $0.16 = $1531.84 against 6.1 kW × $251.12 = $1531.832 of O&M
        let config = FinancialConfig { oandm_per_kw_year: 251.12, ..FinancialConfig::default() };
        let e = EstimateEngine::new(config, RegionTable::default())
            .calculate(Coordinates::new(34.0522, -118.2437), "");
        assert_eq!(e.system_size_kw, 6.1);
        assert_eq!(e.annual_production_kwh, 9574.0);
        assert_eq!(e.estimated_savings, 0.0);
        assert_eq!(e.payback_period_years, None);

        let json = serde_json::to_value(&e).unwrap();
        assert!(json["paybackPeriodYears"].is_null());
    }

    #[test]
    fn test_serialized_field_names() {
        let e = engine().calculate(Coordinates::new(51.5, -0.1), "x");
        let json = serde_json::to_value(&e).unwrap();
        for key in [
            "id", "address", "coordinates", "date", "systemSizeKW", "annualProductionKWh",
            "estimatedCost", "estimatedSavings", "paybackPeriodYears", "npv25Year",
            "co2OffsetPerYear", "confidenceRange", "region",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["region"], "UK");
        assert_eq!(json["coordinates"]["lat"], 51.5);
    }
}
