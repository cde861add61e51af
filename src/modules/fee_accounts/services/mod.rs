pub mod fee_account_service;
pub mod late_fee_calculator;

pub use fee_account_service::FeeAccountService;
pub use late_fee_calculator::{LateFeeAssessment, LateFeeCalculator};
