use std::sync::Arc;

use crate::services::report_service::ReportService;

/// Handler state. Every request is computed independently, so nothing here
/// is mutable.
#[derive(Clone)]
pub struct AppState {
    pub reports: Arc<ReportService>,
}

impl AppState {
    pub fn new(reports: ReportService) -> Self {
        Self {
            reports: Arc::new(reports),
        }
    }
}
