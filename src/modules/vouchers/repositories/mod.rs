pub mod voucher_repository;

pub use voucher_repository::{VoucherInsert, VoucherRepository};
