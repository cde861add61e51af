pub mod fee_account_repository;

pub use fee_account_repository::FeeAccountRepository;
