/// Latitude climate bands used for peak-sun-hours lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrradianceBand {
    Tropical,
    Subtropical,
    Temperate,
    Polar,
}

impl IrradianceBand {
    /// Hard step on `|latitude|`; upper bounds are inclusive.
    pub fn from_latitude(latitude: f64) -> Self {
        let abs_lat = latitude.abs();
        if abs_lat <= 23.5 {
            IrradianceBand::Tropical
        } else if abs_lat <= 35.0 {
            IrradianceBand::Subtropical
        } else if abs_lat <= 60.0 {
            IrradianceBand::Temperate
        } else {
            IrradianceBand::Polar
        }
    }

    /// Average daily insolation (kWh/m²/day)
    pub fn kwh_per_m2_day(&self) -> f64 {
        match self {
            IrradianceBand::Tropical => 5.5,
            IrradianceBand::Subtropical => 5.0,
            IrradianceBand::Temperate => 4.0,
            IrradianceBand::Polar => 2.5,
        }
    }
}

/// Average daily solar irradiance (kWh/m²/day) for a latitude.
pub fn solar_irradiance(latitude: f64) -> f64 {
    IrradianceBand::from_latitude(latitude).kwh_per_m2_day()
}
