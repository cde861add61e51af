use std::sync::Arc;

use crate::core::money::validate_positive;
use crate::core::{AppError, Result};
use crate::modules::directory::DirectoryRepository;
use crate::modules::fee_accounts::FeeAccountRepository;
use crate::modules::gateways::{GatewayOutcome, GatewayPaymentRequest, GatewayStatus, PaymentGateway};
use crate::modules::payments::models::{
    InitiateOnlinePaymentRequest, OnlinePayment, OnlinePaymentStatus, OnlineVerification,
    PaymentCommand, PaymentMethod,
};
use crate::modules::payments::repositories::OnlinePaymentRepository;
use crate::modules::payments::services::PaymentLedger;

/// Online payment initiation and reconciliation.
///
/// Nothing here changes a balance directly: a confirmed transaction is
/// applied through [`PaymentLedger::apply_payment`] like any other payment,
/// with the gateway transaction id making the application idempotent.
pub struct OnlinePaymentService {
    online: OnlinePaymentRepository,
    accounts: FeeAccountRepository,
    directory: DirectoryRepository,
    ledger: Arc<PaymentLedger>,
    gateway: Arc<dyn PaymentGateway>,
}

impl OnlinePaymentService {
    pub fn new(
        online: OnlinePaymentRepository,
        accounts: FeeAccountRepository,
        directory: DirectoryRepository,
        ledger: Arc<PaymentLedger>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            online,
            accounts,
            directory,
            ledger,
            gateway,
        }
    }

    /// Start an online payment for (part of) an account's due balance
    pub async fn initiate(
        &self,
        request: &InitiateOnlinePaymentRequest,
        initiated_by: &str,
    ) -> Result<OnlinePayment> {
        let fee_account_id = match request.fee_account_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Err(AppError::validation("fee_account_id is required")),
        };

        let account = self
            .accounts
            .find_by_id(&fee_account_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Fee account '{}' not found", fee_account_id))
            })?;

        let amount = request.amount.unwrap_or(account.due_amount);
        if account.due_amount.is_zero() {
            return Err(AppError::balance(
                format!("Fee account '{}' is already paid", account.id),
                account.balance_details(),
            ));
        }
        validate_positive("amount", amount)?;
        if amount > account.due_amount {
            return Err(AppError::balance(
                format!(
                    "Payment amount {} exceeds due amount {}",
                    amount, account.due_amount
                ),
                account.balance_details(),
            ));
        }

        let student = self.directory.find_student(&account.student_id).await?;
        let gateway_request = GatewayPaymentRequest {
            reference: account.id.clone(),
            amount,
            description: match &student {
                Some(student) => format!("Fee payment for {}", student.roll_number),
                None => format!("Fee payment for account {}", account.id),
            },
            customer_email: student.and_then(|s| s.email),
        };

        let initiated = self.gateway.initiate(&gateway_request).await?;
        let online = OnlinePayment::new(
            initiated.transaction_id,
            &account.id,
            amount,
            self.gateway.name(),
            initiated.payment_url,
            initiated_by,
        );
        self.online.create(&online).await?;

        tracing::info!(
            transaction_id = %online.transaction_id,
            fee_account_id = %online.fee_account_id,
            amount = %online.amount,
            gateway = %online.gateway,
            "Online payment initiated"
        );

        Ok(online)
    }

    /// Ask the gateway about a transaction and reconcile a confirmation
    pub async fn verify(&self, transaction_id: &str, verified_by: &str) -> Result<OnlineVerification> {
        let record = self.record(transaction_id).await?;
        if let Some(settled) = self.settled(&record).await? {
            return Ok(settled);
        }

        let outcome = self.gateway.status(transaction_id).await?;
        self.reconcile(record, outcome, verified_by).await
    }

    /// Handle a signed provider callback
    pub async fn handle_callback(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<OnlineVerification> {
        let signature =
            signature.ok_or_else(|| AppError::unauthorized("Missing callback signature"))?;
        if !self.gateway.verify_signature(payload, signature) {
            tracing::warn!(gateway = self.gateway.name(), "Rejected callback with bad signature");
            return Err(AppError::unauthorized("Invalid callback signature"));
        }

        let callback = self.gateway.parse_callback(payload)?;
        let record = self.record(&callback.transaction_id).await?;
        if let Some(settled) = self.settled(&record).await? {
            return Ok(settled);
        }

        let actor = format!("gateway:{}", self.gateway.name());
        self.reconcile(record, callback.into(), &actor).await
    }

    async fn record(&self, transaction_id: &str) -> Result<OnlinePayment> {
        self.online.find(transaction_id).await?.ok_or_else(|| {
            AppError::not_found(format!("Online payment '{}' not found", transaction_id))
        })
    }

    /// Applied and failed records are final; report them as stored
    async fn settled(&self, record: &OnlinePayment) -> Result<Option<OnlineVerification>> {
        match record.status {
            OnlinePaymentStatus::Applied => {
                let payment = match &record.payment_id {
                    Some(payment_id) => self.ledger.find_payment(payment_id).await?,
                    None => None,
                };
                Ok(Some(OnlineVerification {
                    online_payment: record.clone(),
                    payment,
                }))
            }
            OnlinePaymentStatus::Failed => Ok(Some(OnlineVerification {
                online_payment: record.clone(),
                payment: None,
            })),
            OnlinePaymentStatus::Initiated | OnlinePaymentStatus::Confirmed => Ok(None),
        }
    }

    async fn reconcile(
        &self,
        mut record: OnlinePayment,
        outcome: GatewayOutcome,
        actor: &str,
    ) -> Result<OnlineVerification> {
        match outcome.status {
            GatewayStatus::Pending => Ok(OnlineVerification {
                online_payment: record,
                payment: None,
            }),
            GatewayStatus::Failed => {
                let reason = outcome
                    .failure_reason
                    .unwrap_or_else(|| "Payment failed at gateway".to_string());
                self.online
                    .update_status(&record.transaction_id, OnlinePaymentStatus::Failed, None, Some(&reason))
                    .await?;
                tracing::info!(transaction_id = %record.transaction_id, reason = %reason, "Online payment failed");

                record.status = OnlinePaymentStatus::Failed;
                record.failure_reason = Some(reason);
                Ok(OnlineVerification {
                    online_payment: record,
                    payment: None,
                })
            }
            GatewayStatus::Confirmed => self.apply_confirmed(record, outcome, actor).await,
        }
    }

    async fn apply_confirmed(
        &self,
        mut record: OnlinePayment,
        outcome: GatewayOutcome,
        actor: &str,
    ) -> Result<OnlineVerification> {
        if let Some(reported) = outcome.amount {
            if reported != record.amount {
                let reason = format!(
                    "Gateway reported amount {} but {} was initiated",
                    reported, record.amount
                );
                self.online
                    .update_status(&record.transaction_id, OnlinePaymentStatus::Failed, None, Some(&reason))
                    .await?;
                return Err(AppError::gateway(reason));
            }
        }

        let command = PaymentCommand::new(
            &record.fee_account_id,
            record.amount,
            PaymentMethod::Online,
            Some(record.transaction_id.clone()),
            Some(format!("Online payment via {}", record.gateway)),
            actor,
        )?;

        let payment = match self.ledger.apply_payment(command).await {
            Ok(result) => result.payment,
            // A concurrent verify or callback applied it first
            Err(AppError::Conflict(message)) => {
                match self.ledger.find_by_transaction_id(&record.transaction_id).await? {
                    Some(existing) => existing,
                    None => return Err(AppError::Conflict(message)),
                }
            }
            Err(e @ AppError::BalanceViolation { .. }) => {
                // Money was taken but the ledger refuses it; leave it confirmed for follow-up
                let reason = e.to_string();
                self.online
                    .update_status(&record.transaction_id, OnlinePaymentStatus::Confirmed, None, Some(&reason))
                    .await?;
                tracing::warn!(transaction_id = %record.transaction_id, reason = %reason, "Confirmed online payment could not be applied");
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        self.online
            .update_status(&record.transaction_id, OnlinePaymentStatus::Applied, Some(&payment.id), None)
            .await?;

        record.status = OnlinePaymentStatus::Applied;
        record.payment_id = Some(payment.id.clone());
        record.failure_reason = None;
        Ok(OnlineVerification {
            online_payment: record,
            payment: Some(payment),
        })
    }
}
