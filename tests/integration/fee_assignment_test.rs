#[path = "../helpers/mod.rs"]
mod helpers;

use feeledger::core::AppError;
use feeledger::modules::fee_accounts::models::{AutoAssignRequest, ManualAssignRequest};
use feeledger::modules::fee_accounts::{AccountStatus, EffectiveStatus};
use helpers::*;
use rust_decimal_macros::dec;

fn cohort_request(campus: &Campus, student_ids: Option<Vec<String>>) -> AutoAssignRequest {
    AutoAssignRequest {
        department_id: match student_ids {
            Some(_) => None,
            None => Some(campus.department_id.clone()),
        },
        student_ids,
        semester_id: Some(campus.semester_id.clone()),
        fee_structure_id: Some(campus.structure.id.clone()),
        due_date: Some(due_date()),
    }
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn test_cohort_skips_already_billed_student() {
    let pool = create_test_pool().await;
    let services = build_services(pool, always_confirming_gateway());
    let campus = seed_campus(&services.pool).await;

    let mut students = Vec::new();
    for _ in 0..3 {
        students.push(seed_student(&services.pool, &campus.department_id, true).await);
    }

    services
        .fee_accounts
        .manual_assign(
            &ManualAssignRequest {
                student_id: Some(students[1].clone()),
                semester_id: Some(campus.semester_id.clone()),
                fee_structure_id: Some(campus.structure.id.clone()),
                due_date: Some(due_date()),
                ..Default::default()
            },
            ADMIN,
        )
        .await
        .unwrap();

    let summary = services
        .fee_accounts
        .auto_assign(&cohort_request(&campus, Some(students.clone())), ADMIN)
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures[0].student_id, students[1]);
    let assigned: Vec<_> = summary.assigned.iter().map(|a| a.student_id.clone()).collect();
    assert_eq!(assigned, vec![students[0].clone(), students[2].clone()]);
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn test_department_cohort_is_idempotent() {
    let pool = create_test_pool().await;
    let services = build_services(pool, always_confirming_gateway());
    let campus = seed_campus(&services.pool).await;
    seed_student(&services.pool, &campus.department_id, true).await;
    seed_student(&services.pool, &campus.department_id, true).await;
    seed_student(&services.pool, &campus.department_id, false).await;

    let first = services
        .fee_accounts
        .auto_assign(&cohort_request(&campus, None), ADMIN)
        .await
        .unwrap();
    assert_eq!(first.succeeded, 2);
    assert_eq!(first.failed, 0);

    let second = services
        .fee_accounts
        .auto_assign(&cohort_request(&campus, None), ADMIN)
        .await
        .unwrap();
    assert_eq!(second.succeeded, 0);
    assert_eq!(second.failed, 2);

    for assigned in &first.assigned {
        let fees = services.fee_accounts.student_fees(&assigned.student_id).await.unwrap();
        assert_eq!(fees.accounts.len(), 1);
        assert_eq!(fees.accounts[0].account.total_amount, dec!(12000));
    }
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn test_explicit_list_reports_unknown_and_inactive() {
    let pool = create_test_pool().await;
    let services = build_services(pool, always_confirming_gateway());
    let campus = seed_campus(&services.pool).await;
    let active = seed_student(&services.pool, &campus.department_id, true).await;
    let inactive = seed_student(&services.pool, &campus.department_id, false).await;
    let other_department = seed_department(&services.pool).await;
    let outsider = seed_student(&services.pool, &other_department, true).await;

    let ids = vec![
        active.clone(),
        inactive.clone(),
        "no-such-student".to_string(),
        outsider.clone(),
    ];
    let summary = services
        .fee_accounts
        .auto_assign(&cohort_request(&campus, Some(ids)), ADMIN)
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.assigned[0].student_id, active);
    let failed: Vec<_> = summary.failures.iter().map(|f| f.student_id.as_str()).collect();
    assert_eq!(failed, vec![inactive.as_str(), "no-such-student", outsider.as_str()]);
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn test_manual_duplicate_is_conflict() {
    let pool = create_test_pool().await;
    let services = build_services(pool, always_confirming_gateway());
    let campus = seed_campus(&services.pool).await;
    let student = seed_student(&services.pool, &campus.department_id, true).await;

    let request = ManualAssignRequest {
        student_id: Some(student),
        semester_id: Some(campus.semester_id.clone()),
        custom_amount: Some(dec!(4500)),
        due_date: Some(due_date()),
        remarks: Some("Scholarship adjusted".to_string()),
        ..Default::default()
    };

    let account = services.fee_accounts.manual_assign(&request, ADMIN).await.unwrap();
    assert_eq!(account.total_amount, dec!(4500));
    assert_eq!(account.fee_structure_id, None);
    assert_eq!(account.status, AccountStatus::Pending);

    let err = services
        .fee_accounts
        .manual_assign(&request, ADMIN)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn test_student_fees_apply_late_fee_view() {
    let pool = create_test_pool().await;
    let services = build_services(pool, always_confirming_gateway());
    let campus = seed_campus(&services.pool).await;
    let student = seed_student(&services.pool, &campus.department_id, true).await;

    // due in the past relative to the test clock
    let past_due = chrono::Utc::now().date_naive() - chrono::Duration::days(10);
    services
        .fee_accounts
        .manual_assign(
            &ManualAssignRequest {
                student_id: Some(student.clone()),
                semester_id: Some(campus.semester_id.clone()),
                fee_structure_id: Some(campus.structure.id.clone()),
                due_date: Some(past_due),
                ..Default::default()
            },
            ADMIN,
        )
        .await
        .unwrap();

    let fees = services.fee_accounts.student_fees(&student).await.unwrap();
    let view = &fees.accounts[0];
    assert_eq!(view.account.status, AccountStatus::Pending);
    assert_eq!(view.assessment.effective_status, EffectiveStatus::Overdue);
    assert_eq!(view.assessment.days_late, 10);
    assert_eq!(view.assessment.late_fee, dec!(500));
    assert_eq!(fees.total_payable, dec!(12500));
}
