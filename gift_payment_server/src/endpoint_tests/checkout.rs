//! Checkout and order-status endpoint tests.

use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use gateway_tools::VietQrConfig;
use gift_payment_engine::{
    db_types::{PaymentMethod, PaymentStatus},
    events::EventProducers,
    ReconciliationApi,
};
use serde_json::{json, Value};

use super::{
    helpers::{paid_order, pending_order, test_momo_api, test_vnpay, ORDER_CODE},
    mocks::MockPaymentDb,
};
use crate::{
    config::ServerOptions,
    routes::{CheckoutRoute, OrderStatusRoute},
};

fn test_vietqr() -> VietQrConfig {
    VietQrConfig {
        bank_id: "970422".to_string(),
        account_no: "0123456789".to_string(),
        account_name: "GIFTNEST STORE".to_string(),
        template: "compact2".to_string(),
    }
}

fn test_options() -> ServerOptions {
    ServerOptions { use_x_forwarded_for: false, use_forwarded: false, frontend_url: "https://shop.example.com".into() }
}

async fn checkout_call(db: MockPaymentDb, body: Value) -> (StatusCode, Value) {
    let _ = env_logger::try_init().ok();
    let api = ReconciliationApi::new(db, EventProducers::default());
    let app = App::new()
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(test_momo_api()))
        .app_data(web::Data::new(test_vnpay()))
        .app_data(web::Data::new(test_vietqr()))
        .app_data(web::Data::new(test_options()))
        .service(CheckoutRoute::<MockPaymentDb>::new());
    let service = test::init_service(app).await;
    let req = TestRequest::post().uri("/checkout").set_json(body).to_request();
    let res = test::call_service(&service, req).await;
    let status = res.status();
    let body: Value = test::read_body_json(res).await;
    (status, body)
}

fn checkout_body(method: &str) -> Value {
    json!({
        "customer_name": "Nguyễn Văn An",
        "customer_email": "an@example.com",
        "payment_method": method,
        "items": [
            { "name": "Hộp quà tết", "unit_price": 120_000, "quantity": 1 },
            { "name": "Thiệp chúc mừng", "unit_price": 15_000, "quantity": 2 },
        ],
    })
}

#[actix_web::test]
async fn bank_checkout_returns_qr_and_transfer_reference() {
    let mut db = MockPaymentDb::new();
    db.expect_insert_order()
        .withf(|order, items| order.total_amount.value() == 150_000 && items.len() == 2)
        .times(1)
        .returning(|_, _| {
            let mut order = pending_order(150_000);
            order.payment_method = PaymentMethod::Bank;
            Ok((order, true))
        });
    let (status, body) = checkout_call(db, checkout_body("bank")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order_code"], ORDER_CODE);
    assert_eq!(body["total_amount"], 150_000);
    assert_eq!(body["payment"]["type"], "bank_transfer");
    assert_eq!(body["payment"]["transfer_reference"], format!("NGUYEN VAN AN {ORDER_CODE}"));
    let qr = body["payment"]["qr_image_url"].as_str().unwrap();
    assert!(qr.starts_with("https://img.vietqr.io/image/970422-0123456789-compact2.png?amount=150000"));
}

#[actix_web::test]
async fn vnpay_checkout_returns_a_signed_payment_url() {
    let mut db = MockPaymentDb::new();
    db.expect_insert_order().times(1).returning(|_, _| {
        let mut order = pending_order(150_000);
        order.payment_method = PaymentMethod::Vnpay;
        Ok((order, true))
    });
    let (status, body) = checkout_call(db, checkout_body("vnpay")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payment"]["type"], "vnpay");
    let url = body["payment"]["pay_url"].as_str().unwrap();
    assert!(url.starts_with("https://sandbox.vnpayment.vn/paymentv2/vpcpay.html?"));
    assert!(url.contains("vnp_Amount=15000000"), "VNPay amounts are in hundredths of a đồng: {url}");
    assert!(url.contains("vnp_SecureHash="));
}

#[actix_web::test]
async fn cod_checkout_needs_no_payment_step() {
    let mut db = MockPaymentDb::new();
    db.expect_insert_order().times(1).returning(|_, _| {
        let mut order = pending_order(150_000);
        order.payment_method = PaymentMethod::Cod;
        Ok((order, true))
    });
    let (status, body) = checkout_call(db, checkout_body("cod")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payment"]["type"], "pay_on_delivery");
}

#[actix_web::test]
async fn discount_is_subtracted_from_the_order_total() {
    let mut db = MockPaymentDb::new();
    db.expect_insert_order()
        .withf(|order, _| order.total_amount.value() == 130_000)
        .times(1)
        .returning(|_, _| {
            let mut order = pending_order(130_000);
            order.payment_method = PaymentMethod::Bank;
            Ok((order, true))
        });
    let mut body = checkout_body("bank");
    body["discount_amount"] = json!(20_000);
    let (status, _) = checkout_call(db, body).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn checkout_without_items_is_rejected() {
    // No insert_order expectation: reaching storage panics.
    let mut body = checkout_body("bank");
    body["items"] = json!([]);
    let (status, _) = checkout_call(MockPaymentDb::new(), body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn checkout_with_nonpositive_total_is_rejected() {
    let mut body = checkout_body("bank");
    body["discount_amount"] = json!(500_000);
    let (status, _) = checkout_call(MockPaymentDb::new(), body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

//----------------------------------------------   Order status  ----------------------------------------------------

async fn status_call(db: MockPaymentDb, code: &str) -> (StatusCode, Value) {
    let _ = env_logger::try_init().ok();
    let api = ReconciliationApi::new(db, EventProducers::default());
    let app = App::new().app_data(web::Data::new(api)).service(OrderStatusRoute::<MockPaymentDb>::new());
    let service = test::init_service(app).await;
    let req = TestRequest::get().uri(&format!("/orders/{code}/status")).to_request();
    let res = test::call_service(&service, req).await;
    let status = res.status();
    let body: Value = test::read_body_json(res).await;
    (status, body)
}

#[actix_web::test]
async fn status_of_a_paid_order() {
    let mut db = MockPaymentDb::new();
    db.expect_fetch_order_by_code().returning(|_| Ok(Some(paid_order(150_000, "14226112"))));
    let (status, body) = status_call(db, ORDER_CODE).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order_code"], ORDER_CODE);
    assert_eq!(body["payment_status"], serde_json::to_value(PaymentStatus::Paid).unwrap());
    assert_eq!(body["transaction_id"], "14226112");
}

#[actix_web::test]
async fn status_of_an_unknown_order_is_404() {
    let mut db = MockPaymentDb::new();
    db.expect_fetch_order_by_code().returning(|_| Ok(None));
    let (status, _) = status_call(db, "GN1700000000009999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
