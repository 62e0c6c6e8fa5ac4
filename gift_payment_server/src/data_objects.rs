use std::fmt::Display;

use chrono::{DateTime, Utc};
use gift_payment_engine::db_types::{FulfilmentStatus, Order, PaymentMethod, PaymentStatus};
use gnp_common::Vnd;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

//-------------------------------------------------  Checkout  --------------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub discount_amount: Option<Vnd>,
    pub items: Vec<CheckoutItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutItem {
    pub name: String,
    pub unit_price: Vnd,
    pub quantity: i64,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CheckoutRequest {
    /// Sum of line totals less the discount. The storefront's own total is ignored; the server's arithmetic
    /// is authoritative.
    pub fn total_amount(&self) -> Vnd {
        let items: Vnd = self.items.iter().map(|i| i.unit_price * i.quantity).sum();
        items - self.discount_amount.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    pub order_code: String,
    pub total_amount: Vnd,
    pub payment: PaymentInstruction,
}

/// What the customer must do next to pay for the order.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentInstruction {
    /// Open the MoMo payment page (or deeplink into the app).
    Momo { pay_url: String, deeplink: Option<String>, qr_code_url: Option<String> },
    /// Redirect the browser to the signed VNPay payment URL.
    Vnpay { pay_url: String },
    /// Scan the QR (or transfer manually) with exactly this reference as the transfer content.
    BankTransfer { qr_image_url: String, transfer_reference: String },
    /// Nothing to do now; payment is collected on delivery.
    PayOnDelivery,
}

//-------------------------------------------------  Status  ----------------------------------------------------------
#[derive(Debug, Clone, Serialize)]
pub struct OrderStatusResponse {
    pub order_code: String,
    pub payment_status: PaymentStatus,
    pub fulfilment_status: FulfilmentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub transaction_id: Option<String>,
}

impl From<&Order> for OrderStatusResponse {
    fn from(order: &Order) -> Self {
        Self {
            order_code: order.order_code.to_string(),
            payment_status: order.payment_status,
            fulfilment_status: order.fulfilment_status,
            paid_at: order.paid_at,
            transaction_id: order.transaction_id.clone(),
        }
    }
}

//-------------------------------------------------  VNPay ack  -------------------------------------------------------
/// The JSON body VNPay expects from its IPN endpoint. Always returned with HTTP 200, even for failures;
/// VNPay keys its retry logic off `RspCode` alone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VnPayIpnResponse {
    #[serde(rename = "RspCode")]
    pub rsp_code: String,
    #[serde(rename = "Message")]
    pub message: String,
}

impl VnPayIpnResponse {
    pub fn new(rsp_code: &str, message: &str) -> Self {
        Self { rsp_code: rsp_code.to_string(), message: message.to_string() }
    }
}
