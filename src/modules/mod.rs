use actix_web::web;

pub mod directory;
pub mod events;
pub mod fee_accounts;
pub mod fee_structures;
pub mod gateways;
pub mod health;
pub mod payments;
pub mod reports;
pub mod vouchers;

/// Mount every ledger endpoint under `/fees`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/fees")
            .configure(fee_structures::configure)
            .configure(fee_accounts::configure)
            .configure(vouchers::configure)
            .configure(payments::configure)
            .configure(reports::configure),
    );
}
