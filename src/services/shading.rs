/// ============================================================
///  Roof Shading Estimator
///
///  One entry point (`ShadingEstimator::analyze`) backed by three
///  data sources, tried in order of accuracy:
///   1. Remote   – live elevation samples around the roof
///                 (horizon obstruction toward the equator)
///   2. Tables   – pluggable precomputed factors (built-in: U.S.
///                 metro areas, USGS-derived), exact key or <50 km
///   3. Proxy    – geographic heuristic, always available
///
///  A failing remote lookup is logged and falls through; it never
///  surfaces to the caller.
/// ============================================================

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ElevationError;
use crate::models::estimate::Coordinates;
use crate::models::shading::{Accuracy, RoofGeometry, ShadingAnalysis, ShadingMethod};

// ─── Constants ───────────────────────────────────────────────
const EARTH_RADIUS_KM: f64 = 6371.0;
const METERS_PER_DEG_LAT: f64 = 111_320.0;

const PROXY_BASE_FACTOR: f64 = 0.90;
const PROXY_MIN_FACTOR: f64 = 0.75;
const PROXY_MAX_FACTOR: f64 = 0.97;

const MEASURED_MIN_FACTOR: f64 = 0.70;
const MEASURED_MAX_FACTOR: f64 = 0.97;

const METRO_MATCH_RADIUS_KM: f64 = 50.0;
const REMOTE_BASE_FACTOR: f64 = 0.95;

pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

// ─── Heuristic terms ─────────────────────────────────────────

/// Longer shadows at high latitude (low winter sun).
fn latitude_penalty(lat: f64) -> f64 {
    (lat.abs() - 35.0).max(0.0) * 0.003
}

/// Loss from facing away from the equator and from steep pitches.
fn orientation_penalty(lat: f64, roof: RoofGeometry) -> f64 {
    let equator_facing = if lat >= 0.0 { 180.0 } else { 0.0 };
    let mut deviation = (roof.azimuth_deg - equator_facing).rem_euclid(360.0);
    if deviation > 180.0 {
        deviation = 360.0 - deviation;
    }
    let azimuth_penalty = deviation / 180.0 * 0.10;
    let tilt_penalty = (roof.tilt_deg.abs() - 35.0).max(0.0) * 0.002;
    azimuth_penalty + tilt_penalty
}

/// Stand-in for local relief (trees, neighbouring buildings, hills).
fn terrain_perturbation(lng: f64) -> f64 {
    0.015 * (lng.to_radians() * 3.0).sin()
}

/// Heuristic shading factor, always within `[0.75, 0.97]`.
pub fn estimate_proxy_shading(coordinates: Coordinates, roof: RoofGeometry) -> ShadingAnalysis {
    let raw = PROXY_BASE_FACTOR
        - latitude_penalty(coordinates.lat)
        - orientation_penalty(coordinates.lat, roof)
        + terrain_perturbation(coordinates.lng);
    let factor = if raw.is_nan() { PROXY_BASE_FACTOR } else { raw };

    ShadingAnalysis {
        method: ShadingMethod::Proxy,
        shading_factor: factor.clamp(PROXY_MIN_FACTOR, PROXY_MAX_FACTOR),
        confidence: 0.5,
        accuracy: Accuracy::Low,
        data_source: "Geographic proxy (latitude, roof orientation, terrain estimate)".to_string(),
    }
}

// ─── Precomputed sources ─────────────────────────────────────

/// A synchronous lookup of precomputed shading factors.
pub trait ShadingSource: Send + Sync {
    /// `None` when the source has nothing for this location.
    fn lookup(&self, coordinates: Coordinates, roof: RoofGeometry) -> Option<ShadingAnalysis>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MetroEntry {
    pub name: String,
    pub state: String,
    pub lat: f64,
    pub lng: f64,
    /// Factor for a south-facing roof at the default pitch
    pub shading_factor: f64,
}

impl MetroEntry {
    fn new(name: &str, state: &str, lat: f64, lng: f64, shading_factor: f64) -> Self {
        Self {
            name: name.to_string(),
            state: state.to_string(),
            lat,
            lng,
            shading_factor,
        }
    }

    fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

fn default_metro_entries() -> Vec<MetroEntry> {
    vec![
        MetroEntry::new("Los Angeles", "CA", 34.0522, -118.2437, 0.92),
        MetroEntry::new("Phoenix", "AZ", 33.4484, -112.0740, 0.95),
        MetroEntry::new("Denver", "CO", 39.7392, -104.9903, 0.91),
        MetroEntry::new("Seattle", "WA", 47.6062, -122.3321, 0.82),
        MetroEntry::new("New York", "NY", 40.7128, -74.0060, 0.80),
        MetroEntry::new("Miami", "FL", 25.7617, -80.1918, 0.90),
        MetroEntry::new("Chicago", "IL", 41.8781, -87.6298, 0.84),
        MetroEntry::new("Houston", "TX", 29.7604, -95.3698, 0.89),
        MetroEntry::new("Atlanta", "GA", 33.7490, -84.3880, 0.85),
        MetroEntry::new("Boston", "MA", 42.3601, -71.0589, 0.81),
    ]
}

type GridKey = (i64, i64);

/// Rounded to 0.1°.
fn grid_key(coordinates: Coordinates) -> GridKey {
    (
        (coordinates.lat * 10.0).round() as i64,
        (coordinates.lng * 10.0).round() as i64,
    )
}

/// Precomputed metro-area factors keyed on a 0.1° grid.
#[derive(Debug, Clone)]
pub struct MetroShadingTable {
    entries: Vec<MetroEntry>,
    index: HashMap<GridKey, usize>,
}

impl Default for MetroShadingTable {
    fn default() -> Self {
        Self::new(default_metro_entries())
    }
}

impl MetroShadingTable {
    /// Builds the grid index. When two entries fall in the same 0.1° cell
    /// the first one wins and the later one is dropped with a warning.
    pub fn new(entries: Vec<MetroEntry>) -> Self {
        let mut kept: Vec<MetroEntry> = Vec::with_capacity(entries.len());
        let mut index: HashMap<GridKey, usize> = HashMap::with_capacity(entries.len());
        for entry in entries {
            match index.entry(grid_key(entry.coordinates())) {
                Entry::Occupied(cell) => {
                    let first: &MetroEntry = &kept[*cell.get()];
                    log::warn!(
                        "[SHADING] Metro entry {}, {} shares a grid cell with {}, {}, ignoring it",
                        entry.name,
                        entry.state,
                        first.name,
                        first.state
                    );
                }
                Entry::Vacant(cell) => {
                    cell.insert(kept.len());
                    kept.push(entry);
                }
            }
        }
        Self { entries: kept, index }
    }

    pub fn entries(&self) -> &[MetroEntry] {
        &self.entries
    }

    /// Exact grid cell first, otherwise the closest entry within 50 km.
    fn find(&self, coordinates: Coordinates) -> Option<(&MetroEntry, f64)> {
        if let Some(&i) = self.index.get(&grid_key(coordinates)) {
            return Some((&self.entries[i], 0.0));
        }
        self.entries
            .iter()
            .map(|e| (e, haversine_km(coordinates, e.coordinates())))
            .filter(|(_, d)| *d < METRO_MATCH_RADIUS_KM)
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

impl ShadingSource for MetroShadingTable {
    fn lookup(&self, coordinates: Coordinates, roof: RoofGeometry) -> Option<ShadingAnalysis> {
        let (entry, distance_km) = self.find(coordinates)?;
        let factor = entry.shading_factor - orientation_penalty(coordinates.lat, roof);
        // Confidence fades from 0.8 at the metro centre to 0.6 at the radius edge.
        let confidence = 0.8 - 0.2 * (distance_km / METRO_MATCH_RADIUS_KM);

        Some(ShadingAnalysis {
            method: ShadingMethod::Usgs,
            shading_factor: factor.clamp(MEASURED_MIN_FACTOR, MEASURED_MAX_FACTOR),
            confidence,
            accuracy: Accuracy::Medium,
            data_source: format!("USGS precomputed: {}, {}", entry.name, entry.state),
        })
    }
}

// ─── Remote elevation ────────────────────────────────────────

/// External elevation service.
#[async_trait]
pub trait ElevationProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Elevation (m) for each point, in input order.
    async fn elevations(&self, points: &[Coordinates]) -> Result<Vec<f64>, ElevationError>;
}

/// Samples order: centre, north, east, south, west.
fn sample_points(center: Coordinates, offset_m: f64) -> [Coordinates; 5] {
    let dlat = offset_m / METERS_PER_DEG_LAT;
    let cos_lat = center.lat.to_radians().cos();
    let dlng = if cos_lat.abs() > 1e-6 { dlat / cos_lat } else { dlat };
    [
        center,
        Coordinates::new(center.lat + dlat, center.lng),
        Coordinates::new(center.lat, center.lng + dlng),
        Coordinates::new(center.lat - dlat, center.lng),
        Coordinates::new(center.lat, center.lng - dlng),
    ]
}

async fn remote_shading(
    provider: &dyn ElevationProvider,
    coordinates: Coordinates,
    roof: RoofGeometry,
    offset_m: f64,
) -> Result<ShadingAnalysis, ElevationError> {
    let points = sample_points(coordinates, offset_m);
    let elevations = provider.elevations(&points).await?;
    if elevations.len() != points.len() {
        return Err(ElevationError::InvalidResponse {
            message: format!("expected {} elevations, got {}", points.len(), elevations.len()),
        });
    }
    if elevations.iter().any(|e| !e.is_finite()) {
        return Err(ElevationError::InvalidResponse {
            message: "non-finite elevation".to_string(),
        });
    }

    // Weights for N, E, S, W: the equator-facing horizon blocks the most sun.
    let weights = if coordinates.lat >= 0.0 {
        [0.1, 0.5, 1.0, 0.5]
    } else {
        [1.0, 0.5, 0.1, 0.5]
    };
    let center = elevations[0];
    let obstruction_deg: f64 = elevations[1..]
        .iter()
        .zip(weights)
        .map(|(e, w)| w * ((e - center) / offset_m).atan().to_degrees().max(0.0))
        .sum();
    let terrain_penalty = (obstruction_deg * 0.004).min(0.20);

    let factor = REMOTE_BASE_FACTOR
        - latitude_penalty(coordinates.lat)
        - orientation_penalty(coordinates.lat, roof)
        - terrain_penalty;

    Ok(ShadingAnalysis {
        method: ShadingMethod::Remote,
        shading_factor: factor.clamp(MEASURED_MIN_FACTOR, MEASURED_MAX_FACTOR),
        confidence: 0.85,
        accuracy: Accuracy::High,
        data_source: format!("{} elevation ({:.0} m horizon samples)", provider.name(), offset_m),
    })
}

// ─── Estimator ───────────────────────────────────────────────

#[derive(Clone)]
pub struct ShadingEstimator {
    sources: Vec<Arc<dyn ShadingSource>>,
    elevation: Option<Arc<dyn ElevationProvider>>,
    sample_offset_m: f64,
}

impl Default for ShadingEstimator {
    fn default() -> Self {
        Self::new().with_source(Arc::new(MetroShadingTable::default()))
    }
}

impl ShadingEstimator {
    /// An estimator with no data sources (heuristic only).
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            elevation: None,
            sample_offset_m: 100.0,
        }
    }

    pub fn with_source(mut self, source: Arc<dyn ShadingSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_elevation(mut self, provider: Arc<dyn ElevationProvider>, sample_offset_m: f64) -> Self {
        self.elevation = Some(provider);
        self.sample_offset_m = sample_offset_m;
        self
    }

    pub async fn analyze(&self, coordinates: Coordinates, roof: RoofGeometry) -> ShadingAnalysis {
        if let Some(provider) = &self.elevation {
            match remote_shading(provider.as_ref(), coordinates, roof, self.sample_offset_m).await {
                Ok(analysis) => return analysis,
                Err(e) => log::warn!(
                    "[SHADING] {} lookup failed at ({:.4}, {:.4}): {}, falling back",
                    provider.name(),
                    coordinates.lat,
                    coordinates.lng,
                    e
                ),
            }
        }
        self.analyze_offline(coordinates, roof)
    }

    /// Precomputed sources, then the heuristic. No network.
    pub fn analyze_offline(&self, coordinates: Coordinates, roof: RoofGeometry) -> ShadingAnalysis {
        self.sources
            .iter()
            .find_map(|s| s.lookup(coordinates, roof))
            .unwrap_or_else(|| estimate_proxy_shading(coordinates, roof))
    }
}
