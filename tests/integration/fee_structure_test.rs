// Fee structure catalog against a real database.

#[path = "../helpers/mod.rs"]
mod helpers;

use feeledger::core::AppError;
use feeledger::modules::fee_accounts::models::ManualAssignRequest;
use feeledger::modules::fee_structures::models::{
    CreateFeeStructureRequest, FeeStructureFilter, UpdateFeeStructureRequest,
};
use helpers::*;
use rust_decimal_macros::dec;

fn request(department_id: &str, session_id: &str, semester_number: i32) -> CreateFeeStructureRequest {
    CreateFeeStructureRequest {
        department_id: Some(department_id.to_string()),
        semester_number: Some(semester_number),
        session_id: Some(session_id.to_string()),
        tuition_fee: Some(dec!(10000)),
        lab_fee: Some(dec!(1500)),
        library_fee: Some(dec!(500)),
        late_fee_per_day: Some(dec!(25)),
        description: Some("Regular intake".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn test_create_and_reject_duplicate_scope() {
    let pool = create_test_pool().await;
    let services = build_services(pool, always_confirming_gateway());
    let department_id = seed_department(&services.pool).await;
    let session_id = seed_session(&services.pool).await;

    let structure = services
        .fee_structures
        .create(&request(&department_id, &session_id, 2), ADMIN)
        .await
        .unwrap();
    assert_eq!(structure.total_fee, dec!(12000));
    assert_eq!(structure.components.admission_fee, dec!(0));
    assert_eq!(structure.created_by, ADMIN);

    let stored = services.fee_structures.get(&structure.id).await.unwrap();
    assert_eq!(stored.total_fee, dec!(12000));
    assert_eq!(stored.late_fee_per_day, dec!(25));

    let err = services
        .fee_structures
        .create(&request(&department_id, &session_id, 2), ADMIN)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Another semester number is a different scope
    services
        .fee_structures
        .create(&request(&department_id, &session_id, 3), ADMIN)
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn test_unknown_references_are_not_found() {
    let pool = create_test_pool().await;
    let services = build_services(pool, always_confirming_gateway());
    let department_id = seed_department(&services.pool).await;
    let session_id = seed_session(&services.pool).await;

    let err = services
        .fee_structures
        .create(&request("no-such-department", &session_id, 1), ADMIN)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = services
        .fee_structures
        .create(&request(&department_id, "no-such-session", 1), ADMIN)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = services.fee_structures.get("no-such-structure").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn test_update_recomputes_total_and_keeps_billed_accounts() {
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

    let updated = services
        .fee_structures
        .update(
            &campus.structure.id,
            &UpdateFeeStructureRequest {
                exam_fee: Some(dec!(800)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.total_fee, dec!(12800));
    assert_eq!(updated.components.tuition_fee, dec!(10000));

    let view = services.fee_accounts.account_view(&account.id).await.unwrap();
    assert_eq!(view.account.total_amount, dec!(12000));

    let err = services
        .fee_structures
        .update(
            &campus.structure.id,
            &UpdateFeeStructureRequest {
                tuition_fee: Some(dec!(-1)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    let stored = services.fee_structures.get(&campus.structure.id).await.unwrap();
    assert_eq!(stored.total_fee, dec!(12800));
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn test_list_filters_by_scope_fields() {
    let pool = create_test_pool().await;
    let services = build_services(pool, always_confirming_gateway());
    let department_id = seed_department(&services.pool).await;
    let session_id = seed_session(&services.pool).await;

    for semester_number in 1..=3 {
        services
            .fee_structures
            .create(&request(&department_id, &session_id, semester_number), ADMIN)
            .await
            .unwrap();
    }

    let all = services
        .fee_structures
        .list(&FeeStructureFilter {
            department_id: Some(department_id.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.windows(2).all(|w| w[0].semester_number < w[1].semester_number));

    let second = services
        .fee_structures
        .list(&FeeStructureFilter {
            department_id: Some(department_id),
            session_id: Some(session_id),
            semester_number: Some(2),
        })
        .await
        .unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].semester_number, 2);
}
