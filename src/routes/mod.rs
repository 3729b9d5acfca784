pub mod estimate_routes;
