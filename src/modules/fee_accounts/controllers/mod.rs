mod fee_account_controller;

pub use fee_account_controller::configure;
