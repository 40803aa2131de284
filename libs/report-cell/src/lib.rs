// =====================================================================================
// REPORT CELL - DAILY AND WEEKLY REPORT CARDS, SPREADSHEET EXPORT
// =====================================================================================

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use router::report_routes;
pub use services::ReportService;
