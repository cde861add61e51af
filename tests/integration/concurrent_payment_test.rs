// Many cashiers posting against the same account at once must never
// overdraw it: the row lock serializes them and the excess is rejected.

#[path = "../helpers/mod.rs"]
mod helpers;

use feeledger::core::AppError;
use feeledger::modules::fee_accounts::models::ManualAssignRequest;
use feeledger::modules::fee_accounts::AccountStatus;
use feeledger::modules::payments::models::PaymentCommand;
use feeledger::modules::payments::PaymentMethod;
use feeledger::modules::vouchers::models::IssueVoucherRequest;
use futures_util::future::join_all;
use helpers::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "Requires test database"]
async fn test_concurrent_payments_never_overdraw() {
    let pool = create_test_pool().await;
    let services = build_services(pool, always_confirming_gateway());
    let campus = seed_campus(&services.pool).await;
    let student_id = seed_student(&services.pool, &campus.department_id, true).await;

    let account = services
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
        .unwrap();
    assert_eq!(account.total_amount, dec!(12000));

    // 10 x 1500 = 15000 against a 12000 bill: at most 8 can land
    let handles = (0..10).map(|i| {
        let services = services.clone();
        let command = PaymentCommand::new(
            &account.id,
            dec!(1500),
            PaymentMethod::Cash,
            Some(format!("TILL-{}-{}", account.id, i)),
            None,
            CASHIER,
        )
        .unwrap();
        tokio::spawn(async move { services.ledger.apply_payment(command).await })
    });

    let mut accepted = 0;
    let mut rejected = 0;
    for outcome in join_all(handles).await {
        match outcome.unwrap() {
            Ok(_) => accepted += 1,
            Err(AppError::BalanceViolation { .. }) => rejected += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }
    assert_eq!(accepted, 8);
    assert_eq!(rejected, 2);

    let view = services.fee_accounts.account_view(&account.id).await.unwrap();
    assert_eq!(view.account.paid_amount, dec!(12000));
    assert_eq!(view.account.due_amount, Decimal::ZERO);
    assert_eq!(view.account.status, AccountStatus::Paid);

    let history = services.ledger.history(&account.id).await.unwrap();
    let collected: Decimal = history.iter().map(|p| p.amount).sum();
    assert_eq!(history.len(), 8);
    assert_eq!(collected, view.account.paid_amount);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "Requires test database"]
async fn test_concurrent_duplicate_transaction_applies_once() {
    let pool = create_test_pool().await;
    let services = build_services(pool, always_confirming_gateway());
    let campus = seed_campus(&services.pool).await;
    let student_id = seed_student(&services.pool, &campus.department_id, true).await;

    let account = services
        .fee_accounts
        .manual_assign(
            &ManualAssignRequest {
                student_id: Some(student_id),
                semester_id: Some(campus.semester_id.clone()),
                custom_amount: Some(dec!(9000)),
                due_date: Some(due_date()),
                ..Default::default()
            },
            ADMIN,
        )
        .await
        .unwrap();

    let transaction_id = format!("BANK-{}", account.id);
    let handles = (0..5).map(|_| {
        let services = services.clone();
        let command = PaymentCommand::new(
            &account.id,
            dec!(1000),
            PaymentMethod::Bank,
            Some(transaction_id.clone()),
            None,
            CASHIER,
        )
        .unwrap();
        tokio::spawn(async move { services.ledger.apply_payment(command).await })
    });

    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|outcome| outcome.unwrap())
        .collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, AppError::Conflict(_))));

    let view = services.fee_accounts.account_view(&account.id).await.unwrap();
    assert_eq!(view.account.paid_amount, dec!(1000));
    assert_eq!(view.account.due_amount, dec!(8000));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "Requires test database"]
async fn test_locked_writes_beyond_pool_size_complete() {
    let pool = create_test_pool().await;
    let services = build_services(pool, always_confirming_gateway());
    let campus = seed_campus(&services.pool).await;

    // More concurrent locked writers than pooled connections
    let mut account_ids = Vec::new();
    for _ in 0..12 {
        let student_id = seed_student(&services.pool, &campus.department_id, true).await;
        let account = services
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
            .unwrap();
        account_ids.push(account.id);
    }

    let payments = account_ids.iter().map(|account_id| {
        let services = services.clone();
        let command = PaymentCommand::new(
            account_id,
            dec!(1000),
            PaymentMethod::Cash,
            None,
            None,
            CASHIER,
        )
        .unwrap();
        tokio::spawn(async move { services.ledger.apply_payment(command).await.map(|_| ()) })
    });
    let vouchers = account_ids.iter().map(|account_id| {
        let services = services.clone();
        let request = IssueVoucherRequest {
            fee_account_id: Some(account_id.clone()),
            ..Default::default()
        };
        tokio::spawn(async move { services.vouchers.issue(&request, CASHIER).await.map(|_| ()) })
    });

    let outcomes = join_all(payments.chain(vouchers)).await;
    assert_eq!(outcomes.len(), 24);
    for outcome in outcomes {
        outcome.unwrap().unwrap();
    }

    for account_id in &account_ids {
        let view = services.fee_accounts.account_view(account_id).await.unwrap();
        assert_eq!(view.account.paid_amount, dec!(1000));
        assert_eq!(view.account.due_amount, dec!(11000));
    }
}
