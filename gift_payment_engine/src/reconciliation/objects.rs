use std::fmt::Display;

use gnp_common::Vnd;
use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    Momo,
    VnPay,
    SePay,
}

impl Display for PaymentProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentProvider::Momo => write!(f, "momo"),
            PaymentProvider::VnPay => write!(f, "vnpay"),
            PaymentProvider::SePay => write!(f, "sepay"),
        }
    }
}

/// A payment notification after parsing and signature verification, stripped of everything
/// provider-specific. The boundary is responsible for never constructing one of these from an unverified
/// request.
#[derive(Debug, Clone)]
pub struct PaymentNotice {
    pub order_code: OrderCode,
    pub provider: PaymentProvider,
    /// The provider-assigned payment reference (MoMo transId, VNPay transactionNo, bank referenceCode).
    pub txid: String,
    /// The amount the provider says was paid. `None` when the provider does not report one.
    pub amount_paid: Option<Vnd>,
    /// Whether the provider reports the payment as successful (MoMo resultCode 0, VNPay responseCode "00",
    /// SePay transferType "in").
    pub success: bool,
}

/// What became of a payment notice. Only `Settled` represents a state change; every other variant is a
/// no-op, and most of them are expected in normal operation under at-least-once delivery.
#[derive(Debug, Clone)]
pub enum SettlementOutcome {
    /// This notice won the transition. Fired the order-paid event.
    Settled(Order),
    /// The order was already paid, here or in a concurrent delivery. Not an error.
    AlreadySettled(Order),
    /// No order with this code exists.
    UnknownOrder(OrderCode),
    /// The provider reported less than the order total. The order stays pending.
    Underpaid { order: Order, expected: Vnd, paid: Vnd },
    /// The provider reported the payment as failed or cancelled.
    Declined(Order),
}
