use crate::core::numbering::{random_digits, receipt_number, MAX_NUMBER_ATTEMPTS};
use crate::core::{AppError, InstitutionClock, Result};
use crate::modules::directory::DirectoryRepository;
use crate::modules::events::{EventPublisher, LedgerEvent};
use crate::modules::fee_accounts::FeeAccountRepository;
use crate::modules::payments::models::{Payment, PaymentCommand, PaymentReceipt, PaymentResult};
use crate::modules::payments::repositories::{PaymentInsert, PaymentRepository};
use crate::modules::vouchers::VoucherRepository;

/// The single mutator of fee account balances
pub struct PaymentLedger {
    payments: PaymentRepository,
    accounts: FeeAccountRepository,
    events: EventPublisher,
    clock: InstitutionClock,
}

impl PaymentLedger {
    pub fn new(
        payments: PaymentRepository,
        accounts: FeeAccountRepository,
        events: EventPublisher,
        clock: InstitutionClock,
    ) -> Self {
        Self {
            payments,
            accounts,
            events,
            clock,
        }
    }

    /// Apply a payment to a fee account.
    ///
    /// In one transaction: lock the account row, check the amount against
    /// the due balance, insert the payment with a fresh receipt number,
    /// update the balance and close the account's issued voucher. Any failure
    /// rolls all of it back.
    ///
    /// # Errors
    /// * `400` - non-positive amount, or amount exceeds the due balance (balance echoed)
    /// * `404` - unknown fee account
    /// * `409` - the external transaction id was already applied
    pub async fn apply_payment(&self, command: PaymentCommand) -> Result<PaymentResult> {
        let mut tx = self
            .payments
            .pool()
            .begin()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to start transaction: {}", e)))?;

        let account = FeeAccountRepository::find_for_update(&mut tx, &command.fee_account_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Fee account '{}' not found",
                    command.fee_account_id
                ))
            })?;

        let settlement = account.settle(command.amount)?;

        let student = DirectoryRepository::find_student_with_tx(&mut tx, &account.student_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Student '{}' of fee account '{}' is missing",
                    account.student_id, account.id
                ))
            })?;

        let today = self.clock.today();
        let mut recorded: Option<Payment> = None;
        for attempt in 1..=MAX_NUMBER_ATTEMPTS {
            let payment = Payment::new(&command, receipt_number(today, &random_digits(5)), today);
            match PaymentRepository::insert_with_tx(&mut tx, &payment).await? {
                PaymentInsert::Inserted => {
                    recorded = Some(payment);
                    break;
                }
                PaymentInsert::ReceiptTaken => {
                    tracing::warn!(
                        receipt_number = %payment.receipt_number,
                        attempt,
                        "Receipt number collision, regenerating"
                    );
                }
            }
        }
        let payment = recorded.ok_or_else(|| {
            AppError::Internal(format!(
                "Could not allocate a unique receipt number after {} attempts",
                MAX_NUMBER_ATTEMPTS
            ))
        })?;

        FeeAccountRepository::apply_settlement_with_tx(&mut tx, &account.id, &settlement).await?;
        let vouchers_closed = VoucherRepository::mark_paid_with_tx(&mut tx, &account.id).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to commit transaction: {}", e)))?;

        tracing::info!(
            fee_account_id = %account.id,
            receipt_number = %payment.receipt_number,
            amount = %payment.amount,
            method = %payment.method,
            due_amount = %settlement.due_amount,
            status = %settlement.status,
            vouchers_closed,
            "Payment applied"
        );

        self.events.publish(LedgerEvent::PaymentRecorded {
            payment_id: payment.id.clone(),
            fee_account_id: account.id.clone(),
            student_id: account.student_id.clone(),
            amount: payment.amount,
            method: payment.method.to_string(),
            receipt_number: payment.receipt_number.clone(),
            due_amount: settlement.due_amount,
            recorded_by: payment.recorded_by.clone(),
        });

        let receipt = PaymentReceipt::new(&payment, &account, &settlement, &student);
        Ok(PaymentResult {
            receipt_number: payment.receipt_number.clone(),
            due_amount: settlement.due_amount,
            status: settlement.status,
            payment,
            receipt,
        })
    }

    /// Payment history of an account, newest first
    pub async fn history(&self, fee_account_id: &str) -> Result<Vec<Payment>> {
        if self.accounts.find_by_id(fee_account_id).await?.is_none() {
            return Err(AppError::not_found(format!(
                "Fee account '{}' not found",
                fee_account_id
            )));
        }
        self.payments.list_for_account(fee_account_id).await
    }

    pub async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<Payment>> {
        self.payments.find_by_transaction_id(transaction_id).await
    }

    pub async fn find_payment(&self, payment_id: &str) -> Result<Option<Payment>> {
        self.payments.find_by_id(payment_id).await
    }
}
