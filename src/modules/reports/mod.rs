// Read-only rollups over fee accounts and payments.

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use controllers::configure;
pub use models::{CollectionReport, FeeStatistics, UnpaidReport};
pub use repositories::{MySqlReportRepository, ReportRepository};
pub use services::ReportService;
