pub mod dashboard;
pub mod dataset;
pub mod insights;
pub mod metrics;

pub use dashboard::AnalyticsService;
pub use dataset::PeriodData;
