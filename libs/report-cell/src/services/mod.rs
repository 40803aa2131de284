pub mod cards;
pub mod daily;
pub mod export;
pub mod reports;
pub mod weekly;

pub use export::{flatten, render, Sheet};
pub use reports::ReportService;
