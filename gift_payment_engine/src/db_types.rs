use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use gnp_common::Vnd;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

use crate::helpers::new_order_code;

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(String);

//--------------------------------------      OrderCode       ---------------------------------------------------------
/// The externally visible order identifier: `GN` + a millisecond timestamp + random digits. Customers see it,
/// providers echo it back in their correlation fields, and bank transfers carry it in free text. It is
/// distinct from the internal row id and is never reassigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderCode(pub String);

impl FromStr for OrderCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OrderCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------    PaymentMethod     ---------------------------------------------------------
/// How the customer chose to pay at checkout. Stored lowercase, as the storefront sends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Momo,
    Vnpay,
    Bank,
    Cod,
    Visa,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Momo => write!(f, "momo"),
            PaymentMethod::Vnpay => write!(f, "vnpay"),
            PaymentMethod::Bank => write!(f, "bank"),
            PaymentMethod::Cod => write!(f, "cod"),
            PaymentMethod::Visa => write!(f, "visa"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "momo" => Ok(Self::Momo),
            "vnpay" => Ok(Self::Vnpay),
            "bank" => Ok(Self::Bank),
            "cod" => Ok(Self::Cod),
            "visa" => Ok(Self::Visa),
            s => Err(ConversionError(format!("Invalid payment method: {s}"))),
        }
    }
}

//--------------------------------------    PaymentStatus     ---------------------------------------------------------
/// The payment axis of an order. The reconciliation core only ever applies `Pending → Paid`; `Failed` and
/// `Refunded` exist for the admin flows and are never set here. `Paid` is terminal: no code path reverts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "Pending"),
            PaymentStatus::Paid => write!(f, "Paid"),
            PaymentStatus::Failed => write!(f, "Failed"),
            PaymentStatus::Refunded => write!(f, "Refunded"),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Paid" => Ok(Self::Paid),
            "Failed" => Ok(Self::Failed),
            "Refunded" => Ok(Self::Refunded),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

//--------------------------------------   FulfilmentStatus   ---------------------------------------------------------
/// The fulfilment axis, independent of payment. Settlement moves `Pending → Confirmed` implicitly (there is
/// no manual confirmation step for paid orders); everything after that belongs to the order-management flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum FulfilmentStatus {
    Pending,
    Confirmed,
    Shipping,
    Delivered,
    Cancelled,
}

impl Display for FulfilmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FulfilmentStatus::Pending => write!(f, "Pending"),
            FulfilmentStatus::Confirmed => write!(f, "Confirmed"),
            FulfilmentStatus::Shipping => write!(f, "Shipping"),
            FulfilmentStatus::Delivered => write!(f, "Delivered"),
            FulfilmentStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for FulfilmentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Confirmed" => Ok(Self::Confirmed),
            "Shipping" => Ok(Self::Shipping),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid fulfilment status: {s}"))),
        }
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_code: OrderCode,
    pub customer_name: String,
    pub customer_email: String,
    pub total_amount: Vnd,
    pub discount_amount: Vnd,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    /// Set together with `transaction_id`, exactly once, by the settlement update.
    pub paid_at: Option<DateTime<Utc>>,
    /// The provider-assigned payment reference (MoMo transId, VNPay transactionNo, bank referenceCode).
    pub transaction_id: Option<String>,
    pub fulfilment_status: FulfilmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

//--------------------------------------      OrderItem      ---------------------------------------------------------
/// A line item. Immutable once the order exists.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub name: String,
    pub unit_price: Vnd,
    pub quantity: i64,
    pub image_url: Option<String>,
}

//--------------------------------------      NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_code: OrderCode,
    pub customer_name: String,
    pub customer_email: String,
    pub total_amount: Vnd,
    pub discount_amount: Vnd,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    /// A new pending order with a freshly generated order code.
    pub fn new(customer_name: String, customer_email: String, total_amount: Vnd, method: PaymentMethod) -> Self {
        Self {
            order_code: new_order_code(),
            customer_name,
            customer_email,
            total_amount,
            discount_amount: Vnd::from(0),
            payment_method: method,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub name: String,
    pub unit_price: Vnd,
    pub quantity: i64,
    pub image_url: Option<String>,
}
