use crate::config::AppConfig;
use crate::core::numbering::{random_digits, voucher_number, MAX_NUMBER_ATTEMPTS};
use crate::core::{AppError, InstitutionClock, Result};
use crate::modules::directory::DirectoryRepository;
use crate::modules::events::{EventPublisher, LedgerEvent};
use crate::modules::fee_accounts::{FeeAccountRepository, FeeAccountView, LateFeeCalculator};
use crate::modules::vouchers::models::{
    FeeVoucher, IssueVoucherRequest, QrPayload, VoucherSlip, VoucherStatus,
};
use crate::modules::vouchers::repositories::{VoucherInsert, VoucherRepository};

/// Institution-wide voucher defaults
#[derive(Debug, Clone)]
pub struct VoucherSettings {
    pub institution_code: String,
    pub default_bank_name: String,
    pub valid_days: u32,
}

impl From<&AppConfig> for VoucherSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            institution_code: config.institution_code.clone(),
            default_bank_name: config.default_bank_name.clone(),
            valid_days: config.voucher_valid_days,
        }
    }
}

pub struct VoucherService {
    vouchers: VoucherRepository,
    accounts: FeeAccountRepository,
    events: EventPublisher,
    clock: InstitutionClock,
    settings: VoucherSettings,
}

impl VoucherService {
    pub fn new(
        vouchers: VoucherRepository,
        accounts: FeeAccountRepository,
        events: EventPublisher,
        clock: InstitutionClock,
        settings: VoucherSettings,
    ) -> Self {
        Self {
            vouchers,
            accounts,
            events,
            clock,
            settings,
        }
    }

    /// Issue a voucher for the account's current due amount.
    ///
    /// The account row is locked for the duration, so two concurrent issues
    /// cannot both see "no live voucher".
    ///
    /// # Errors
    /// * `400` - account already paid, or a live voucher exists (its number is echoed)
    /// * `404` - unknown account
    pub async fn issue(&self, request: &IssueVoucherRequest, issued_by: &str) -> Result<FeeVoucher> {
        let fee_account_id = request.fee_account_id()?;
        let valid_days = request.valid_days(self.settings.valid_days)?;
        let bank_name = request.bank_name(&self.settings.default_bank_name);
        let today = self.clock.today();

        let mut tx = self
            .vouchers
            .pool()
            .begin()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to start transaction: {}", e)))?;

        let account = FeeAccountRepository::find_for_update(&mut tx, &fee_account_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Fee account '{}' not found", fee_account_id))
            })?;

        if account.due_amount.is_zero() {
            return Err(AppError::balance(
                format!("Fee account '{}' is already paid", account.id),
                account.balance_details(),
            ));
        }

        let expired = VoucherRepository::expire_stale_with_tx(&mut tx, &account.id, today).await?;
        if expired > 0 {
            tracing::info!(fee_account_id = %account.id, expired, "Expired stale vouchers");
        }

        if let Some(existing) = VoucherRepository::find_issued_with_tx(&mut tx, &account.id).await? {
            return Err(active_voucher_error(&existing));
        }

        let student = DirectoryRepository::find_student_with_tx(&mut tx, &account.student_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Student '{}' of fee account '{}' is missing",
                    account.student_id, account.id
                ))
            })?;

        for attempt in 1..=MAX_NUMBER_ATTEMPTS {
            let number = voucher_number(
                &self.settings.institution_code,
                today,
                &student.roll_number,
                &random_digits(4),
            );
            let voucher = FeeVoucher::new(
                number,
                &account.id,
                account.due_amount,
                &bank_name,
                today,
                valid_days,
                issued_by,
            )?;

            match VoucherRepository::insert_with_tx(&mut tx, &voucher).await? {
                VoucherInsert::Inserted => {
                    tx.commit().await.map_err(|e| {
                        AppError::Internal(format!("Failed to commit transaction: {}", e))
                    })?;

                    tracing::info!(
                        voucher_number = %voucher.voucher_number,
                        fee_account_id = %voucher.fee_account_id,
                        amount = %voucher.amount,
                        valid_until = %voucher.valid_until,
                        "Voucher issued"
                    );
                    self.events.publish(LedgerEvent::VoucherIssued {
                        voucher_id: voucher.id.clone(),
                        voucher_number: voucher.voucher_number.clone(),
                        fee_account_id: voucher.fee_account_id.clone(),
                        amount: voucher.amount,
                        issued_by: issued_by.to_string(),
                    });

                    return Ok(voucher);
                }
                VoucherInsert::NumberTaken => {
                    tracing::warn!(
                        voucher_number = %voucher.voucher_number,
                        attempt,
                        "Voucher number collision, regenerating"
                    );
                }
                VoucherInsert::AccountHasActiveVoucher => {
                    let existing = VoucherRepository::find_issued_with_tx(&mut tx, &account.id)
                        .await?
                        .ok_or_else(|| {
                            AppError::Internal("Active voucher vanished inside transaction".into())
                        })?;
                    return Err(active_voucher_error(&existing));
                }
            }
        }

        Err(AppError::Internal(format!(
            "Could not allocate a unique voucher number after {} attempts",
            MAX_NUMBER_ATTEMPTS
        )))
    }

    /// Most recent voucher of an account with everything needed to render it
    pub async fn fetch(&self, fee_account_id: &str) -> Result<VoucherSlip> {
        let row = self
            .accounts
            .find_view(fee_account_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Fee account '{}' not found", fee_account_id))
            })?;
        let assessment = LateFeeCalculator::assess_row(&row, self.clock.today());
        let account = FeeAccountView::new(row, assessment);

        let voucher = self
            .vouchers
            .latest_for_account(fee_account_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "No voucher issued for fee account '{}'",
                    fee_account_id
                ))
            })?;

        let qr_payload = QrPayload::new(&voucher, &account).encode()?;
        Ok(VoucherSlip {
            voucher,
            account,
            qr_payload,
        })
    }

    /// Cancel a live voucher so a new one can be issued
    pub async fn cancel(&self, voucher_id: &str, cancelled_by: &str) -> Result<FeeVoucher> {
        let mut tx = self
            .vouchers
            .pool()
            .begin()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to start transaction: {}", e)))?;

        let mut voucher = VoucherRepository::find_by_id_for_update(&mut tx, voucher_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Voucher '{}' not found", voucher_id)))?;

        if voucher.status != VoucherStatus::Issued {
            return Err(AppError::validation(format!(
                "Only issued vouchers can be cancelled; voucher '{}' is {}",
                voucher.voucher_number, voucher.status
            )));
        }

        VoucherRepository::update_status_with_tx(&mut tx, &voucher.id, VoucherStatus::Cancelled)
            .await?;
        tx.commit()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to commit transaction: {}", e)))?;
        voucher.status = VoucherStatus::Cancelled;

        tracing::info!(voucher_number = %voucher.voucher_number, "Voucher cancelled");
        self.events.publish(LedgerEvent::VoucherCancelled {
            voucher_id: voucher.id.clone(),
            voucher_number: voucher.voucher_number.clone(),
            fee_account_id: voucher.fee_account_id.clone(),
            cancelled_by: cancelled_by.to_string(),
        });

        Ok(voucher)
    }
}

fn active_voucher_error(existing: &FeeVoucher) -> AppError {
    AppError::balance(
        format!(
            "Voucher {} is already issued for this fee account",
            existing.voucher_number
        ),
        existing.reference(),
    )
}
