// HTTP contract of the fee endpoints for requests rejected before the ledger
// is consulted: identity, body validation, query validation and callback
// signatures. The app runs against a pool that never connects.

#[path = "../helpers/mod.rs"]
mod helpers;

use actix_web::{http::StatusCode, test, App};
use feeledger::middleware::error_handler::configure_extractors;
use feeledger::modules::{self, health};
use helpers::*;
use serde_json::{json, Value};

macro_rules! app {
    () => {{
        let services = build_services(lazy_pool(), always_confirming_gateway());
        test::init_service(
            App::new()
                .configure(|cfg| services.register(cfg))
                .configure(configure_extractors)
                .configure(health::configure)
                .configure(modules::configure),
        )
        .await
    }};
}

async fn error_body(resp: actix_web::dev::ServiceResponse) -> Value {
    let body: Value = test::read_body_json(resp).await;
    body["error"].clone()
}

#[actix_web::test]
async fn test_health_is_live_without_database() {
    let app = app!();
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_mutating_endpoints_require_actor() {
    let app = app!();
    let cases = [
        ("/fees/structures", json!({"department_id": "d"})),
        ("/fees/assign/auto", json!({"department_id": "d"})),
        ("/fees/assign/manual", json!({"student_id": "s"})),
        ("/fees/vouchers", json!({"fee_account_id": "a"})),
        ("/fees/payments", json!({"fee_account_id": "a", "amount": 100, "method": "cash"})),
        ("/fees/payments/online", json!({"fee_account_id": "a"})),
    ];

    for (uri, body) in cases {
        let req = test::TestRequest::post()
            .uri(uri)
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "POST {}", uri);

        let error = error_body(resp).await;
        assert_eq!(error["code"], 401);
        assert!(error["message"].as_str().unwrap().contains("X-User-Id"));
    }
}

#[actix_web::test]
async fn test_malformed_json_is_validation_error() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/fees/payments")
        .insert_header(("X-User-Id", CASHIER))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{\"amount\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let error = error_body(resp).await;
    assert!(error["message"].as_str().unwrap().contains("Invalid JSON body"));
}

#[actix_web::test]
async fn test_payment_amount_must_be_positive() {
    let app = app!();
    for amount in [json!(0), json!(-50), json!("10.005")] {
        let req = test::TestRequest::post()
            .uri("/fees/payments")
            .insert_header(("X-User-Id", CASHIER))
            .set_json(json!({"fee_account_id": "acct-1", "amount": amount, "method": "cash"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "amount {}", amount);
    }
}

#[actix_web::test]
async fn test_unknown_payment_method_rejected() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/fees/payments")
        .insert_header(("X-User-Id", CASHIER))
        .set_json(json!({"fee_account_id": "acct-1", "amount": 100, "method": "barter"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_structure_requires_scope() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/fees/structures")
        .insert_header(("X-User-Id", ADMIN))
        .set_json(json!({"department_id": "dept", "semester_number": 1, "tuition_fee": 100}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let error = error_body(resp).await;
    assert!(error["message"].as_str().unwrap().contains("session_id is required"));
}

#[actix_web::test]
async fn test_manual_assign_needs_exactly_one_source() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/fees/assign/manual")
        .insert_header(("X-User-Id", ADMIN))
        .set_json(json!({
            "student_id": "stu-1",
            "semester_id": "sem-1",
            "fee_structure_id": "fs-1",
            "custom_amount": 5000,
            "due_date": "2026-02-01"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_voucher_validity_bounds() {
    let app = app!();
    for days in [0, 366] {
        let req = test::TestRequest::post()
            .uri("/fees/vouchers")
            .insert_header(("X-User-Id", CASHIER))
            .set_json(json!({"fee_account_id": "acct-1", "valid_days": days}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "valid_days {}", days);
    }
}

#[actix_web::test]
async fn test_collection_report_range_validation() {
    let app = app!();
    let uris = [
        "/fees/reports/collection?start_date=2026-03-02&end_date=2026-03-01",
        "/fees/reports/collection?start_date=2025-01-01&end_date=2026-03-01",
        "/fees/reports/collection?start_date=2026-03-01",
        "/fees/reports/collection?start_date=2026-13-01&end_date=2026-03-01",
        "/fees/reports/collection?start_date=2026-03-01&end_date=2026-03-02&method=barter",
    ];

    for uri in uris {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "GET {}", uri);
    }
}

#[actix_web::test]
async fn test_callback_requires_valid_signature() {
    let app = app!();
    let payload = json!({"transaction_id": "SIM-1", "status": "confirmed", "amount": "100"});

    let req = test::TestRequest::post()
        .uri("/fees/payments/online/callback")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/fees/payments/online/callback")
        .insert_header(("X-Signature", "00ff"))
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
