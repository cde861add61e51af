use actix_web::web;
use sqlx::MySqlPool;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::{InstitutionClock, Result};
use crate::modules::directory::DirectoryRepository;
use crate::modules::events::EventPublisher;
use crate::modules::fee_accounts::{FeeAccountRepository, FeeAccountService};
use crate::modules::fee_structures::{FeeStructureRepository, FeeStructureService};
use crate::modules::gateways::PaymentGateway;
use crate::modules::payments::{
    OnlinePaymentRepository, OnlinePaymentService, PaymentLedger, PaymentRepository,
};
use crate::modules::reports::{MySqlReportRepository, ReportService};
use crate::modules::vouchers::services::VoucherSettings;
use crate::modules::vouchers::{VoucherRepository, VoucherService};

/// Services shared by every worker
#[derive(Clone)]
pub struct AppServices {
    pub pool: MySqlPool,
    pub fee_structures: Arc<FeeStructureService>,
    pub fee_accounts: Arc<FeeAccountService>,
    pub vouchers: Arc<VoucherService>,
    pub ledger: Arc<PaymentLedger>,
    pub online_payments: Arc<OnlinePaymentService>,
    pub reports: Arc<ReportService>,
}

impl AppServices {
    pub fn build(
        pool: MySqlPool,
        app: &AppConfig,
        events: EventPublisher,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Result<Self> {
        let clock = app.clock()?;
        Ok(Self::with_clock(pool, app, events, gateway, clock))
    }

    pub fn with_clock(
        pool: MySqlPool,
        app: &AppConfig,
        events: EventPublisher,
        gateway: Arc<dyn PaymentGateway>,
        clock: InstitutionClock,
    ) -> Self {
        let directory = DirectoryRepository::new(pool.clone());
        let accounts = FeeAccountRepository::new(pool.clone());
        let structures = FeeStructureRepository::new(pool.clone());

        let ledger = Arc::new(PaymentLedger::new(
            PaymentRepository::new(pool.clone()),
            accounts.clone(),
            events.clone(),
            clock,
        ));

        Self {
            fee_structures: Arc::new(FeeStructureService::new(
                structures.clone(),
                directory.clone(),
            )),
            fee_accounts: Arc::new(FeeAccountService::new(
                accounts.clone(),
                structures,
                directory.clone(),
                events.clone(),
                clock,
            )),
            vouchers: Arc::new(VoucherService::new(
                VoucherRepository::new(pool.clone()),
                accounts.clone(),
                events,
                clock,
                VoucherSettings::from(app),
            )),
            online_payments: Arc::new(OnlinePaymentService::new(
                OnlinePaymentRepository::new(pool.clone()),
                accounts,
                directory,
                ledger.clone(),
                gateway,
            )),
            reports: Arc::new(ReportService::new(
                Arc::new(MySqlReportRepository::new(pool.clone())),
                clock,
            )),
            ledger,
            pool,
        }
    }

    /// Register the pool and each service as application data
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.pool.clone()))
            .app_data(web::Data::new(self.fee_structures.clone()))
            .app_data(web::Data::new(self.fee_accounts.clone()))
            .app_data(web::Data::new(self.vouchers.clone()))
            .app_data(web::Data::new(self.ledger.clone()))
            .app_data(web::Data::new(self.online_payments.clone()))
            .app_data(web::Data::new(self.reports.clone()));
    }
}
