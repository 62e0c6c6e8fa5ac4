//! Notification endpoint tests against a mocked storage backend.
//!
//! The mocks are strict: any database call without an expectation panics, so the rejection tests double as
//! proof that bad notifications never touch storage.

use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use gateway_tools::{SePayConfig, SePayWebhook};
use gift_payment_engine::{events::EventProducers, traits::PaymentGatewayError, ReconciliationApi};
use gnp_common::Secret;
use serde_json::json;

use super::{
    helpers::{paid_order, pending_order, signed_momo_ipn, signed_vnpay_query, test_momo_api, test_vnpay, ORDER_CODE},
    mocks::MockPaymentDb,
};
use crate::{
    config::ServerOptions,
    data_objects::{JsonResponse, VnPayIpnResponse},
    ipn_routes::{MomoIpnRoute, SepayWebhookRoute, VnpayIpnRoute, VnpayReturnRoute},
    middleware::ApiTokenMiddlewareFactory,
};

fn test_options() -> ServerOptions {
    ServerOptions { use_x_forwarded_for: false, use_forwarded: false, frontend_url: "https://shop.example.com".into() }
}

//----------------------------------------------   VNPay IPN  ----------------------------------------------------

async fn vnpay_ipn_response(db: MockPaymentDb, query: &str) -> VnPayIpnResponse {
    let _ = env_logger::try_init().ok();
    let api = ReconciliationApi::new(db, EventProducers::default());
    let app = App::new()
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(test_vnpay()))
        .service(VnpayIpnRoute::<MockPaymentDb>::new());
    let service = test::init_service(app).await;
    let req = TestRequest::get().uri(&format!("/vnpay/ipn?{query}")).to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status(), StatusCode::OK, "VNPay must always get a 200");
    test::read_body_json(res).await
}

#[actix_web::test]
async fn valid_vnpay_ipn_settles_and_answers_00() {
    let mut db = MockPaymentDb::new();
    db.expect_fetch_order_by_code().returning(|_| Ok(Some(pending_order(150_000))));
    db.expect_mark_order_paid()
        .withf(|code, txid| code.as_str() == ORDER_CODE && txid == "14226112")
        .times(1)
        .returning(|_, txid| Ok(Some(paid_order(150_000, txid))));
    let response = vnpay_ipn_response(db, &signed_vnpay_query("00", 15_000_000)).await;
    assert_eq!(response, VnPayIpnResponse::new("00", "Confirm Success"));
}

#[actix_web::test]
async fn replayed_vnpay_ipn_answers_02() {
    let mut db = MockPaymentDb::new();
    db.expect_fetch_order_by_code().returning(|_| Ok(Some(paid_order(150_000, "14226112"))));
    let response = vnpay_ipn_response(db, &signed_vnpay_query("00", 15_000_000)).await;
    assert_eq!(response, VnPayIpnResponse::new("02", "Order already confirmed"));
}

#[actix_web::test]
async fn vnpay_ipn_for_unknown_order_answers_01() {
    let mut db = MockPaymentDb::new();
    db.expect_fetch_order_by_code().returning(|_| Ok(None));
    let response = vnpay_ipn_response(db, &signed_vnpay_query("00", 15_000_000)).await;
    assert_eq!(response, VnPayIpnResponse::new("01", "Order not found"));
}

#[actix_web::test]
async fn underpaid_vnpay_ipn_answers_04() {
    let mut db = MockPaymentDb::new();
    db.expect_fetch_order_by_code().returning(|_| Ok(Some(pending_order(150_000))));
    // 140,000₫ on the wire against a 150,000₫ order. No mark_order_paid expectation: a transition panics.
    let response = vnpay_ipn_response(db, &signed_vnpay_query("00", 14_000_000)).await;
    assert_eq!(response, VnPayIpnResponse::new("04", "Invalid amount"));
}

#[actix_web::test]
async fn tampered_vnpay_query_answers_97_without_touching_storage() {
    let query = signed_vnpay_query("00", 15_000_000).replace("vnp_Amount=15000000", "vnp_Amount=15000100");
    // No expectations at all: any storage call panics.
    let response = vnpay_ipn_response(MockPaymentDb::new(), &query).await;
    assert_eq!(response, VnPayIpnResponse::new("97", "Invalid signature"));
}

#[actix_web::test]
async fn backend_failure_answers_99() {
    let mut db = MockPaymentDb::new();
    db.expect_fetch_order_by_code()
        .returning(|_| Err(PaymentGatewayError::DatabaseError("database is locked".into())));
    let response = vnpay_ipn_response(db, &signed_vnpay_query("00", 15_000_000)).await;
    assert_eq!(response, VnPayIpnResponse::new("99", "Unknown error"));
}

//----------------------------------------------   VNPay return  ----------------------------------------------------

#[actix_web::test]
async fn vnpay_return_redirects_to_storefront_result_page() {
    let _ = env_logger::try_init().ok();
    let mut db = MockPaymentDb::new();
    db.expect_fetch_order_by_code().returning(|_| Ok(Some(pending_order(150_000))));
    db.expect_mark_order_paid().times(1).returning(|_, txid| Ok(Some(paid_order(150_000, txid))));
    let api = ReconciliationApi::new(db, EventProducers::default());
    let app = App::new()
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(test_vnpay()))
        .app_data(web::Data::new(test_options()))
        .service(VnpayReturnRoute::<MockPaymentDb>::new());
    let service = test::init_service(app).await;
    let req = TestRequest::get().uri(&format!("/vnpay/return?{}", signed_vnpay_query("00", 15_000_000))).to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    let location = res.headers().get("Location").unwrap().to_str().unwrap();
    assert_eq!(
        location,
        format!(
            "https://shop.example.com/payment/result?status=success&orderCode={ORDER_CODE}&message=payment_confirmed"
        )
    );
}

//----------------------------------------------   MoMo IPN  ----------------------------------------------------

async fn momo_ipn_status(db: MockPaymentDb, body: serde_json::Value) -> StatusCode {
    let _ = env_logger::try_init().ok();
    let api = ReconciliationApi::new(db, EventProducers::default());
    let app = App::new()
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(test_momo_api()))
        .service(MomoIpnRoute::<MockPaymentDb>::new());
    let service = test::init_service(app).await;
    let req = TestRequest::post().uri("/momo/ipn").set_json(body).to_request();
    test::call_service(&service, req).await.status()
}

#[actix_web::test]
async fn valid_momo_ipn_settles_and_acks_204() {
    let mut db = MockPaymentDb::new();
    db.expect_fetch_order_by_code().returning(|_| Ok(Some(pending_order(150_000))));
    db.expect_mark_order_paid()
        .withf(|code, txid| code.as_str() == ORDER_CODE && txid == "4088878653")
        .times(1)
        .returning(|_, txid| Ok(Some(paid_order(150_000, txid))));
    let ipn = signed_momo_ipn(0, 150_000);
    let status = momo_ipn_status(db, serde_json::to_value(&ipn).unwrap()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn tampered_momo_ipn_acks_204_without_touching_storage() {
    let mut ipn = signed_momo_ipn(0, 150_000);
    ipn.amount += 1;
    let status = momo_ipn_status(MockPaymentDb::new(), serde_json::to_value(&ipn).unwrap()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn declined_momo_payment_acks_204_without_settling() {
    let mut db = MockPaymentDb::new();
    db.expect_fetch_order_by_code().returning(|_| Ok(Some(pending_order(150_000))));
    // resultCode 1006 is "user declined"; no mark_order_paid expectation.
    let ipn = signed_momo_ipn(1006, 150_000);
    let status = momo_ipn_status(db, serde_json::to_value(&ipn).unwrap()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn malformed_momo_body_acks_204() {
    let status = momo_ipn_status(MockPaymentDb::new(), json!({ "partnerCode": "MOMOTEST" })).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

//----------------------------------------------   SePay  ----------------------------------------------------

const SEPAY_TOKEN: &str = "sepay-test-token";

fn bank_hook(content: &str) -> SePayWebhook {
    SePayWebhook {
        id: 92_704,
        gateway: "MBBank".to_string(),
        transaction_date: "2023-11-15 08:30:00".to_string(),
        account_number: "0123456789".to_string(),
        content: content.to_string(),
        transfer_type: "in".to_string(),
        transfer_amount: 150_000,
        reference_code: "FT23319123456789".to_string(),
        description: String::new(),
    }
}

async fn sepay_call(db: MockPaymentDb, auth: Option<&str>, hook: &SePayWebhook) -> (StatusCode, Option<JsonResponse>) {
    let _ = env_logger::try_init().ok();
    let api = ReconciliationApi::new(db, EventProducers::default());
    let config = SePayConfig { api_token: Secret::new(SEPAY_TOKEN.to_string()), token_checks: true };
    let app = App::new().app_data(web::Data::new(api)).service(
        web::scope("/sepay")
            .wrap(ApiTokenMiddlewareFactory::new(config))
            .service(SepayWebhookRoute::<MockPaymentDb>::new()),
    );
    let service = test::init_service(app).await;
    let mut req = TestRequest::post().uri("/sepay/webhook").set_json(hook);
    if let Some(token) = auth {
        req = req.insert_header(("Authorization", token));
    }
    let res = test::try_call_service(&service, req.to_request()).await;
    match res {
        Ok(res) => {
            let status = res.status();
            let body = test::read_body_json(res).await;
            (status, Some(body))
        },
        Err(e) => (e.error_response().status(), None),
    }
}

#[actix_web::test]
async fn sepay_webhook_without_token_is_rejected() {
    let hook = bank_hook("NGUYEN VAN AN GN1700000000001234");
    let (status, _) = sepay_call(MockPaymentDb::new(), None, &hook).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn sepay_webhook_with_wrong_token_is_rejected() {
    let hook = bank_hook("NGUYEN VAN AN GN1700000000001234");
    let (status, _) = sepay_call(MockPaymentDb::new(), Some("Apikey wrong-token"), &hook).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn sepay_webhook_settles_incoming_transfer() {
    let mut db = MockPaymentDb::new();
    db.expect_fetch_order_by_code().returning(|_| Ok(Some(pending_order(150_000))));
    db.expect_mark_order_paid()
        .withf(|code, txid| code.as_str() == ORDER_CODE && txid == "FT23319123456789")
        .times(1)
        .returning(|_, txid| Ok(Some(paid_order(150_000, txid))));
    let hook = bank_hook("NGUYEN VAN AN GN1700000000001234");
    let (status, body) = sepay_call(db, Some(&format!("Apikey {SEPAY_TOKEN}")), &hook).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.unwrap().success);
}

#[actix_web::test]
async fn sepay_webhook_without_order_code_reports_failure() {
    let hook = bank_hook("chuyen tien an trua");
    let (status, body) = sepay_call(MockPaymentDb::new(), Some(&format!("Apikey {SEPAY_TOKEN}")), &hook).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.unwrap().success);
}

#[actix_web::test]
async fn sepay_outbound_transfer_is_ignored() {
    let mut hook = bank_hook("NGUYEN VAN AN GN1700000000001234");
    hook.transfer_type = "out".to_string();
    let (status, body) = sepay_call(MockPaymentDb::new(), Some(&format!("Apikey {SEPAY_TOKEN}")), &hook).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.unwrap().success);
}
