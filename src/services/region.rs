//! Country classification and the per-country electricity / installation
//! cost tables used by the estimate engine.

use crate::models::estimate::{Coordinates, RegionCode};

/// Half-open latitude/longitude box: `[lat_min, lat_max) × [lng_min, lng_max)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionBounds {
    pub region: RegionCode,
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
}

impl RegionBounds {
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.lat_min && lat < self.lat_max && lng >= self.lng_min && lng < self.lng_max
    }

    fn overlaps(&self, other: &RegionBounds) -> bool {
        self.lat_min < other.lat_max
            && other.lat_min < self.lat_max
            && self.lng_min < other.lng_max
            && other.lng_min < self.lng_max
    }
}

/// Retail electricity price and installer pricing for one region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionProfile {
    /// Flat retail rate (USD/kWh)
    pub electricity_rate_usd_kwh: f64,
    /// Multiplier on the configured base cost-per-watt
    pub installation_cost_multiplier: f64,
}

const DEFAULT_BOUNDS: [RegionBounds; 6] = [
    RegionBounds { region: RegionCode::Us,        lat_min: 24.5,  lat_max: 49.0,  lng_min: -125.0, lng_max: -66.9 },
    RegionBounds { region: RegionCode::Canada,    lat_min: 49.0,  lat_max: 83.2,  lng_min: -141.0, lng_max: -52.6 },
    RegionBounds { region: RegionCode::Uk,        lat_min: 49.9,  lat_max: 60.9,  lng_min: -8.2,   lng_max: 1.8 },
    RegionBounds { region: RegionCode::Germany,   lat_min: 47.3,  lat_max: 55.1,  lng_min: 5.9,    lng_max: 15.1 },
    RegionBounds { region: RegionCode::Australia, lat_min: -43.7, lat_max: -10.6, lng_min: 113.3,  lng_max: 153.7 },
    RegionBounds { region: RegionCode::Japan,     lat_min: 24.0,  lat_max: 45.6,  lng_min: 122.9,  lng_max: 146.0 },
];

fn default_profile(region: RegionCode) -> RegionProfile {
    let (rate, multiplier) = match region {
        RegionCode::Us => (0.16, 1.00),
        RegionCode::Canada => (0.13, 1.10),
        RegionCode::Uk => (0.28, 1.20),
        RegionCode::Germany => (0.40, 1.15),
        RegionCode::Australia => (0.25, 0.85),
        RegionCode::Japan => (0.27, 1.30),
    };
    RegionProfile {
        electricity_rate_usd_kwh: rate,
        installation_cost_multiplier: multiplier,
    }
}

/// Ordered bounding boxes plus a profile for every region.
#[derive(Debug, Clone)]
pub struct RegionTable {
    bounds: Vec<RegionBounds>,
    profiles: [RegionProfile; 6],
}

impl Default for RegionTable {
    fn default() -> Self {
        Self::new(DEFAULT_BOUNDS.to_vec(), default_profile)
    }
}

impl RegionTable {
    /// `bounds` are tried in order; the first box containing the point wins.
    pub fn new(bounds: Vec<RegionBounds>, profile: impl Fn(RegionCode) -> RegionProfile) -> Self {
        Self {
            bounds,
            profiles: RegionCode::ALL.map(profile),
        }
    }

    /// Never fails: points outside every box are treated as `US`.
    pub fn classify(&self, coordinates: Coordinates) -> RegionCode {
        self.bounds
            .iter()
            .find(|b| b.contains(coordinates.lat, coordinates.lng))
            .map(|b| b.region)
            .unwrap_or(RegionCode::Us)
    }

    pub fn profile(&self, region: RegionCode) -> RegionProfile {
        let index = RegionCode::ALL
            .iter()
            .position(|r| *r == region)
            .unwrap_or_default();
        self.profiles[index]
    }

    pub fn bounds(&self) -> &[RegionBounds] {
        &self.bounds
    }

    /// Pairs of boxes that overlap, i.e. where evaluation order decides.
    pub fn overlapping_pairs(&self) -> Vec<(RegionCode, RegionCode)> {
        let mut pairs = Vec::new();
        for (i, a) in self.bounds.iter().enumerate() {
            for b in &self.bounds[i + 1..] {
                if a.overlaps(b) {
                    pairs.push((a.region, b.region));
                }
            }
        }
        pairs
    }
}
