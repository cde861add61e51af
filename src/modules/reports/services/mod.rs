mod report_service;

pub use report_service::{validate_date_range, ReportService, MAX_RANGE_DAYS};
