//! Residential solar estimates for geocoded addresses.
//!
//! [`services::estimate_engine::EstimateEngine`] turns coordinates into a
//! sizing and financial projection, [`services::shading::ShadingEstimator`]
//! scores roof shading, and [`services::report_service::ReportService`]
//! combines both behind the HTTP API in `main.rs`.

pub mod api_docs;
pub mod config;
pub mod controllers;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod shared_state;
