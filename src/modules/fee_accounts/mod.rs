// Fee accounts: a student's billing obligation for one semester, the
// assignment engine that creates them and the read-time late-fee view.

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use controllers::configure;
pub use models::{AccountStatus, EffectiveStatus, FeeAccount, FeeAccountView, Settlement};
pub use repositories::FeeAccountRepository;
pub use services::{FeeAccountService, LateFeeAssessment, LateFeeCalculator};
