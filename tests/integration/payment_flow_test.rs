// End-to-end payment lifecycle against a real database: bill a student,
// pay in instalments, reject overpayment, and reconcile online payments
// through both verification and the signed callback.

#[path = "../helpers/mod.rs"]
mod helpers;

use feeledger::core::AppError;
use feeledger::modules::fee_accounts::models::ManualAssignRequest;
use feeledger::modules::fee_accounts::{AccountStatus, FeeAccount};
use feeledger::modules::payments::models::{
    InitiateOnlinePaymentRequest, OnlinePaymentStatus, PaymentCommand,
};
use feeledger::modules::payments::PaymentMethod;
use feeledger::AppServices;
use helpers::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

async fn billed_account(services: &AppServices, campus: &Campus) -> FeeAccount {
    let student_id = seed_student(&services.pool, &campus.department_id, true).await;
    let request = ManualAssignRequest {
        student_id: Some(student_id),
        semester_id: Some(campus.semester_id.clone()),
        fee_structure_id: Some(campus.structure.id.clone()),
        due_date: Some(due_date()),
        ..Default::default()
    };
    services
        .fee_accounts
        .manual_assign(&request, ADMIN)
        .await
        .expect("manual assignment")
}

fn cash(account_id: &str, amount: Decimal) -> PaymentCommand {
    PaymentCommand::new(account_id, amount, PaymentMethod::Cash, None, None, CASHIER).unwrap()
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn test_partial_then_full_payment() {
    let pool = create_test_pool().await;
    let services = build_services(pool, always_confirming_gateway());
    let campus = seed_campus(&services.pool).await;

    let account = billed_account(&services, &campus).await;
    assert_eq!(account.total_amount, dec!(12000));
    assert_eq!(account.due_amount, dec!(12000));
    assert_eq!(account.status, AccountStatus::Pending);

    let first = services.ledger.apply_payment(cash(&account.id, dec!(5000))).await.unwrap();
    assert_eq!(first.due_amount, dec!(7000));
    assert_eq!(first.status, AccountStatus::Partial);
    assert!(first.receipt_number.starts_with("RCP-"));
    assert_eq!(first.receipt.paid_amount, dec!(5000));

    let second = services.ledger.apply_payment(cash(&account.id, dec!(7000))).await.unwrap();
    assert_eq!(second.due_amount, Decimal::ZERO);
    assert_eq!(second.status, AccountStatus::Paid);
    assert_ne!(first.receipt_number, second.receipt_number);

    let err = services
        .ledger
        .apply_payment(cash(&account.id, dec!(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BalanceViolation { .. }));

    let history = services.ledger.history(&account.id).await.unwrap();
    assert_eq!(history.len(), 2);
    let collected: Decimal = history.iter().map(|p| p.amount).sum();
    assert_eq!(collected, dec!(12000));
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn test_overpayment_leaves_balance_untouched() {
    let pool = create_test_pool().await;
    let services = build_services(pool, always_confirming_gateway());
    let campus = seed_campus(&services.pool).await;
    let account = billed_account(&services, &campus).await;

    let err = services
        .ledger
        .apply_payment(cash(&account.id, dec!(13000)))
        .await
        .unwrap_err();
    match err {
        AppError::BalanceViolation { details, .. } => {
            assert_eq!(details["fee_account_id"], account.id.as_str());
        }
        other => panic!("expected balance violation, got {:?}", other),
    }

    let view = services.fee_accounts.account_view(&account.id).await.unwrap();
    assert_eq!(view.account.paid_amount, Decimal::ZERO);
    assert_eq!(view.account.due_amount, dec!(12000));
    assert!(services.ledger.history(&account.id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn test_duplicate_transaction_id_is_conflict() {
    let pool = create_test_pool().await;
    let services = build_services(pool, always_confirming_gateway());
    let campus = seed_campus(&services.pool).await;
    let account = billed_account(&services, &campus).await;

    let reference = format!("CHQ-{}", uuid::Uuid::new_v4());
    let cheque = || {
        PaymentCommand::new(
            &account.id,
            dec!(1000),
            PaymentMethod::Cheque,
            Some(reference.clone()),
            None,
            CASHIER,
        )
        .unwrap()
    };

    services.ledger.apply_payment(cheque()).await.unwrap();
    let err = services.ledger.apply_payment(cheque()).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let view = services.fee_accounts.account_view(&account.id).await.unwrap();
    assert_eq!(view.account.due_amount, dec!(11000));
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn test_online_payment_verified_once() {
    let pool = create_test_pool().await;
    let services = build_services(pool, always_confirming_gateway());
    let campus = seed_campus(&services.pool).await;
    let account = billed_account(&services, &campus).await;

    let initiated = services
        .online_payments
        .initiate(
            &InitiateOnlinePaymentRequest {
                fee_account_id: Some(account.id.clone()),
                amount: Some(dec!(4000)),
            },
            CASHIER,
        )
        .await
        .unwrap();
    assert_eq!(initiated.status, OnlinePaymentStatus::Initiated);

    // initiation alone never moves money
    let view = services.fee_accounts.account_view(&account.id).await.unwrap();
    assert_eq!(view.account.due_amount, dec!(12000));

    let verified = services
        .online_payments
        .verify(&initiated.transaction_id, CASHIER)
        .await
        .unwrap();
    assert_eq!(verified.online_payment.status, OnlinePaymentStatus::Applied);
    let payment = verified.payment.expect("applied payment");
    assert_eq!(payment.method, PaymentMethod::Online);

    let again = services
        .online_payments
        .verify(&initiated.transaction_id, CASHIER)
        .await
        .unwrap();
    assert_eq!(again.payment.map(|p| p.id), Some(payment.id));

    let view = services.fee_accounts.account_view(&account.id).await.unwrap();
    assert_eq!(view.account.due_amount, dec!(8000));
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn test_signed_callback_applies_payment() {
    let pool = create_test_pool().await;
    let gateway = always_confirming_gateway();
    let services = build_services(pool, gateway.clone());
    let campus = seed_campus(&services.pool).await;
    let account = billed_account(&services, &campus).await;

    let initiated = services
        .online_payments
        .initiate(
            &InitiateOnlinePaymentRequest {
                fee_account_id: Some(account.id.clone()),
                amount: None,
            },
            CASHIER,
        )
        .await
        .unwrap();
    assert_eq!(initiated.amount, dec!(12000));

    let payload = serde_json::to_vec(&serde_json::json!({
        "transaction_id": initiated.transaction_id,
        "status": "confirmed",
        "amount": "12000.00",
    }))
    .unwrap();
    let signature = gateway.sign_callback(&payload).unwrap();

    let err = services
        .online_payments
        .handle_callback(&payload, Some("deadbeef"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    let result = services
        .online_payments
        .handle_callback(&payload, Some(&signature))
        .await
        .unwrap();
    assert_eq!(result.online_payment.status, OnlinePaymentStatus::Applied);
    let payment = result.payment.expect("applied payment");
    assert_eq!(payment.recorded_by, "gateway:simulated");

    // redelivery is a no-op
    services
        .online_payments
        .handle_callback(&payload, Some(&signature))
        .await
        .unwrap();
    let view = services.fee_accounts.account_view(&account.id).await.unwrap();
    assert_eq!(view.account.status, AccountStatus::Paid);
    assert_eq!(services.ledger.history(&account.id).await.unwrap().len(), 1);
}
