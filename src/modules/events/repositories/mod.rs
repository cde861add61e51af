pub mod activity_log_repository;

pub use activity_log_repository::ActivityLogRepository;
