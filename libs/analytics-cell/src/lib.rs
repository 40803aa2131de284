// =====================================================================================
// ANALYTICS CELL - CLINIC PERFORMANCE DASHBOARDS
// =====================================================================================
//
// Read-only aggregations over appointments, transactions and staff performance:
// - Daily dashboard with targets and operational alerts
// - Financial, room, employee and optimisation breakdowns over a date range
//
// =====================================================================================

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{AnalyticsError, DateQuery, RangeQuery};
pub use services::{AnalyticsService, PeriodData};

pub use router::analytics_routes;
