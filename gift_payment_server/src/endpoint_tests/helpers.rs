use std::collections::HashMap;

use chrono::{TimeZone, Utc};
use gateway_tools::{
    helpers::{hmac_sha256_hex, hmac_sha512_hex},
    vnpay::hash_data,
    MomoApi,
    MomoConfig,
    MomoIpn,
    VnPay,
    VnPayConfig,
};
use gift_payment_engine::db_types::{FulfilmentStatus, Order, OrderCode, PaymentMethod, PaymentStatus};
use gnp_common::{Secret, Vnd};

pub const ORDER_CODE: &str = "GN1700000000001234";
pub const TXN_REF: &str = "GN1700000000001234_1700000001234";
pub const VNPAY_SECRET: &str = "VNPAYSECRETKEY123456";
pub const MOMO_SECRET: &str = "K951B6PE1waDMi640xX08PD3vg6EkVlz";
pub const MOMO_ACCESS_KEY: &str = "F8BBA842ECF85";

pub fn pending_order(total: i64) -> Order {
    Order {
        id: 1,
        order_code: OrderCode(ORDER_CODE.to_string()),
        customer_name: "Nguyen Van An".to_string(),
        customer_email: "an@example.com".to_string(),
        total_amount: Vnd::from(total),
        discount_amount: Vnd::from(0),
        payment_method: PaymentMethod::Vnpay,
        payment_status: PaymentStatus::Pending,
        paid_at: None,
        transaction_id: None,
        fulfilment_status: FulfilmentStatus::Pending,
        created_at: Utc.with_ymd_and_hms(2023, 11, 15, 1, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2023, 11, 15, 1, 0, 0).unwrap(),
    }
}

pub fn paid_order(total: i64, txid: &str) -> Order {
    let mut order = pending_order(total);
    order.payment_status = PaymentStatus::Paid;
    order.fulfilment_status = FulfilmentStatus::Confirmed;
    order.paid_at = Some(Utc.with_ymd_and_hms(2023, 11, 15, 1, 30, 0).unwrap());
    order.transaction_id = Some(txid.to_string());
    order
}

pub fn test_vnpay() -> VnPay {
    VnPay::new(VnPayConfig {
        tmn_code: "GIFTNEST".to_string(),
        hash_secret: Secret::new(VNPAY_SECRET.to_string()),
        pay_url: "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html".to_string(),
        return_url: "https://shop.example.com/vnpay/return".to_string(),
    })
}

pub fn test_momo_config() -> MomoConfig {
    MomoConfig {
        partner_code: "MOMOTEST".to_string(),
        access_key: MOMO_ACCESS_KEY.to_string(),
        secret_key: Secret::new(MOMO_SECRET.to_string()),
        endpoint: "https://test-payment.momo.vn/v2/gateway/api/create".to_string(),
        redirect_url: "https://shop.example.com/payment/result".to_string(),
        ipn_url: "https://shop.example.com/momo/ipn".to_string(),
    }
}

pub fn test_momo_api() -> MomoApi {
    MomoApi::new(test_momo_config()).expect("Error building MoMo client")
}

/// A correctly signed VNPay callback query string. All values are unreserved characters, so the query can be
/// pasted into a request URI verbatim and the signature still matches.
pub fn signed_vnpay_query(response_code: &str, vnp_amount: i64) -> String {
    let mut params = HashMap::new();
    params.insert("vnp_Amount".to_string(), vnp_amount.to_string());
    params.insert("vnp_BankCode".to_string(), "NCB".to_string());
    params.insert("vnp_OrderInfo".to_string(), format!("ThanhToan{ORDER_CODE}"));
    params.insert("vnp_PayDate".to_string(), "20231115083000".to_string());
    params.insert("vnp_ResponseCode".to_string(), response_code.to_string());
    params.insert("vnp_TmnCode".to_string(), "GIFTNEST".to_string());
    params.insert("vnp_TransactionNo".to_string(), "14226112".to_string());
    params.insert("vnp_TransactionStatus".to_string(), response_code.to_string());
    params.insert("vnp_TxnRef".to_string(), TXN_REF.to_string());
    let signature = hmac_sha512_hex(VNPAY_SECRET, &hash_data(&params));
    params.insert("vnp_SecureHash".to_string(), signature);
    let mut pairs = params.into_iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>();
    pairs.sort();
    pairs.join("&")
}

/// A correctly signed MoMo IPN for the standard test order.
pub fn signed_momo_ipn(result_code: i64, amount: i64) -> MomoIpn {
    let mut ipn = MomoIpn {
        partner_code: "MOMOTEST".to_string(),
        order_id: TXN_REF.to_string(),
        request_id: TXN_REF.to_string(),
        amount,
        order_info: format!("ThanhToan{ORDER_CODE}"),
        order_type: "momo_wallet".to_string(),
        trans_id: 4_088_878_653,
        result_code,
        message: "Successful.".to_string(),
        pay_type: "qr".to_string(),
        response_time: 1_700_000_002_000,
        extra_data: String::new(),
        signature: String::new(),
    };
    ipn.signature = hmac_sha256_hex(MOMO_SECRET, &ipn.canonical_string(MOMO_ACCESS_KEY));
    ipn
}
