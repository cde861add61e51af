// Uniqueness and rollback guarantees of the ledger's storage layer: number
// collisions surface as retryable outcomes, and nothing inside an aborted
// ledger transaction survives.

#[path = "../helpers/mod.rs"]
mod helpers;

use feeledger::core::numbering::{receipt_number, voucher_number};
use feeledger::core::AppError;
use feeledger::modules::fee_accounts::models::ManualAssignRequest;
use feeledger::modules::fee_accounts::{FeeAccount, FeeAccountRepository};
use feeledger::modules::payments::models::{Payment, PaymentCommand, PaymentMethod};
use feeledger::modules::payments::repositories::{PaymentInsert, PaymentRepository};
use feeledger::modules::vouchers::models::FeeVoucher;
use feeledger::modules::vouchers::repositories::{VoucherInsert, VoucherRepository};
use feeledger::AppServices;
use helpers::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

async fn billed_account(services: &AppServices, campus: &Campus) -> FeeAccount {
    let student_id = seed_student(&services.pool, &campus.department_id, true).await;
    services
        .fee_accounts
        .manual_assign(
            &ManualAssignRequest {
                student_id: Some(student_id),
                semester_id: Some(campus.semester_id.clone()),
                fee_structure_id: Some(campus.structure.id.clone()),
                due_date: Some(due_date()),
                ..Default::default()
            },
            ADMIN,
        )
        .await
        .expect("manual assignment")
}

fn unique_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

fn payment(account_id: &str, receipt: &str) -> Payment {
    let command =
        PaymentCommand::new(account_id, dec!(100), PaymentMethod::Cash, None, None, CASHIER)
            .unwrap();
    Payment::new(&command, receipt.to_string(), due_date())
}

fn voucher(account_id: &str, number: &str) -> FeeVoucher {
    FeeVoucher::new(
        number.to_string(),
        account_id,
        dec!(12000),
        "National Bank",
        due_date(),
        15,
        CASHIER,
    )
    .unwrap()
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn test_receipt_number_collision_is_reported_for_retry() {
    let pool = create_test_pool().await;
    let services = build_services(pool, always_confirming_gateway());
    let campus = seed_campus(&services.pool).await;
    let account = billed_account(&services, &campus).await;

    let receipt = receipt_number(due_date(), &unique_suffix());
    let mut tx = services.pool.begin().await.unwrap();

    let first = PaymentRepository::insert_with_tx(&mut tx, &payment(&account.id, &receipt))
        .await
        .unwrap();
    assert_eq!(first, PaymentInsert::Inserted);

    let second = PaymentRepository::insert_with_tx(&mut tx, &payment(&account.id, &receipt))
        .await
        .unwrap();
    assert_eq!(second, PaymentInsert::ReceiptTaken);

    // The transaction is still usable after the rejected statement
    let fresh = receipt_number(due_date(), &unique_suffix());
    let third = PaymentRepository::insert_with_tx(&mut tx, &payment(&account.id, &fresh))
        .await
        .unwrap();
    assert_eq!(third, PaymentInsert::Inserted);

    tx.rollback().await.unwrap();
    assert!(services.ledger.history(&account.id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn test_voucher_number_and_live_voucher_collisions() {
    let pool = create_test_pool().await;
    let services = build_services(pool, always_confirming_gateway());
    let campus = seed_campus(&services.pool).await;
    let first_account = billed_account(&services, &campus).await;
    let second_account = billed_account(&services, &campus).await;

    let number = voucher_number("UNI", due_date(), &unique_suffix(), "0001");
    let mut tx = services.pool.begin().await.unwrap();
    let inserted = VoucherRepository::insert_with_tx(&mut tx, &voucher(&first_account.id, &number))
        .await
        .unwrap();
    assert_eq!(inserted, VoucherInsert::Inserted);
    tx.commit().await.unwrap();

    let mut tx = services.pool.begin().await.unwrap();

    // Same number on another account
    let taken = VoucherRepository::insert_with_tx(&mut tx, &voucher(&second_account.id, &number))
        .await
        .unwrap();
    assert_eq!(taken, VoucherInsert::NumberTaken);

    // Fresh number, but the first account already has an issued voucher
    let other = voucher_number("UNI", due_date(), &unique_suffix(), "0002");
    let active = VoucherRepository::insert_with_tx(&mut tx, &voucher(&first_account.id, &other))
        .await
        .unwrap();
    assert_eq!(active, VoucherInsert::AccountHasActiveVoucher);

    tx.rollback().await.unwrap();
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn test_aborted_ledger_transaction_leaves_no_trace() {
    let pool = create_test_pool().await;
    let services = build_services(pool, always_confirming_gateway());
    let campus = seed_campus(&services.pool).await;
    let account = billed_account(&services, &campus).await;

    {
        let mut tx = services.pool.begin().await.unwrap();
        let locked = FeeAccountRepository::find_for_update(&mut tx, &account.id)
            .await
            .unwrap()
            .unwrap();
        let settlement = locked.settle(dec!(4000)).unwrap();

        let receipt = receipt_number(due_date(), &unique_suffix());
        PaymentRepository::insert_with_tx(&mut tx, &payment(&account.id, &receipt))
            .await
            .unwrap();
        FeeAccountRepository::apply_settlement_with_tx(&mut tx, &account.id, &settlement)
            .await
            .unwrap();
        // Dropped without commit
    }

    let view = services.fee_accounts.account_view(&account.id).await.unwrap();
    assert_eq!(view.account.paid_amount, Decimal::ZERO);
    assert_eq!(view.account.due_amount, dec!(12000));
    assert!(services.ledger.history(&account.id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn test_failed_payment_keeps_balance() {
    let pool = create_test_pool().await;
    let services = build_services(pool, always_confirming_gateway());
    let campus = seed_campus(&services.pool).await;
    let account = billed_account(&services, &campus).await;

    let transaction_id = format!("CHQ-{}", account.id);
    let cheque = |amount: Decimal| {
        PaymentCommand::new(
            &account.id,
            amount,
            PaymentMethod::Cheque,
            Some(transaction_id.clone()),
            None,
            CASHIER,
        )
        .unwrap()
    };

    services.ledger.apply_payment(cheque(dec!(3000))).await.unwrap();

    // The receipt insert fails on the repeated transaction id, after the row lock
    let err = services.ledger.apply_payment(cheque(dec!(2000))).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let err = services
        .ledger
        .apply_payment(
            PaymentCommand::new(
                "no-such-account",
                dec!(10),
                PaymentMethod::Cash,
                None,
                None,
                CASHIER,
            )
            .unwrap(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let view = services.fee_accounts.account_view(&account.id).await.unwrap();
    assert_eq!(view.account.paid_amount, dec!(3000));
    assert_eq!(view.account.due_amount, dec!(9000));
    assert_eq!(services.ledger.history(&account.id).await.unwrap().len(), 1);
}
