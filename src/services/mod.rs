pub mod elevation_service;
pub mod estimate_engine;
pub mod hourly_shading;
pub mod irradiance;
pub mod region;
pub mod report_service;
pub mod shading;
