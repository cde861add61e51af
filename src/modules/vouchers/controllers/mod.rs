mod voucher_controller;

pub use voucher_controller::configure;
