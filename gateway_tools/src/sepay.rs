//! SePay bank-transfer webhook integration.
//!
//! SePay watches a bank account and POSTs a webhook for every transfer it observes. Unlike MoMo and VNPay
//! there is no payload signature: the only authenticity mechanism the provider offers is the shared API token
//! in the `Authorization: Apikey …` header. That is a spoofable shared constant and is documented as a known
//! weakness — which is why settlement still requires the order lookup and the amount check to pass.
//!
//! The order code is not carried in a dedicated field; the customer (or our QR code) embeds it in the
//! free-text transfer `content`, and reconciliation recovers it by pattern match.

use gnp_common::Vnd;
use serde::{Deserialize, Serialize};

use crate::config::SePayConfig;

pub const TRANSFER_TYPE_IN: &str = "in";

/// The webhook body SePay POSTs for an observed bank transfer. Required fields fail deserialization when
/// absent, so garbage payloads are dropped before any order logic runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SePayWebhook {
    pub id: i64,
    pub gateway: String,
    pub transaction_date: String,
    pub account_number: String,
    /// Free-text transfer content; the transfer reference (and thus the order code) lives in here.
    pub content: String,
    /// `"in"` for money arriving in the watched account, `"out"` for money leaving it.
    pub transfer_type: String,
    pub transfer_amount: i64,
    /// The bank's own reference for the transfer. Used as the settlement transaction id.
    pub reference_code: String,
    #[serde(default)]
    pub description: String,
}

impl SePayWebhook {
    pub fn is_incoming(&self) -> bool {
        self.transfer_type == TRANSFER_TYPE_IN
    }

    pub fn amount(&self) -> Vnd {
        Vnd::from(self.transfer_amount)
    }
}

/// Checks the `Authorization` header value against the configured token. Fail closed: a missing or
/// malformed header never passes. With `token_checks` disabled (tests only), everything passes.
pub fn authorization_is_valid(header: Option<&str>, config: &SePayConfig) -> bool {
    if !config.token_checks {
        return true;
    }
    let token = config.api_token.reveal();
    if token.is_empty() {
        return false;
    }
    match header.and_then(|h| h.strip_prefix("Apikey ")) {
        Some(provided) => provided == token,
        None => false,
    }
}
