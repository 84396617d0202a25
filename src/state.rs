use std::sync::Arc;

use crate::services::report::ReportService;

#[derive(Clone)]
pub struct AppState {
    pub report_service: Arc<ReportService>,
}
