// Vouchers: bank-payable slips for a fee account. At most one voucher per
// account is live (`issued`) at a time.

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use controllers::configure;
pub use models::{FeeVoucher, VoucherStatus};
pub use repositories::VoucherRepository;
pub use services::VoucherService;
