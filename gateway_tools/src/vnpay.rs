//! VNPay integration.
//!
//! VNPay is signed-URL based on both legs. Outbound, we build a redirect URL whose query string carries a
//! fresh HMAC-SHA512 over the sorted, URL-encoded parameter set (no network call involved). Inbound, the IPN
//! and the customer's return redirect carry the same parameter set and the same `vnp_SecureHash`, and both go
//! through identical verification.
//!
//! Two wire quirks to keep in mind:
//! * `vnp_Amount` is the đồng amount multiplied by 100. [`Vnd::vnpay_amount`] and [`Vnd::from_vnpay_amount`]
//!   own that conversion.
//! * `vnp_CreateDate`/`vnp_PayDate` are `yyyyMMddHHmmss` in Vietnam time (GMT+7).

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, FixedOffset, Utc};
use gnp_common::Vnd;
use log::*;

use crate::{
    config::VnPayConfig,
    helpers::{digests_match, hmac_sha512_hex},
    GatewayError,
};

pub const VNP_VERSION: &str = "2.1.0";
pub const VNP_COMMAND_PAY: &str = "pay";
pub const VNP_RESPONSE_SUCCESS: &str = "00";

/// IPN response codes from the VNPay merchant integration contract. The IPN endpoint must answer with one of
/// these in a `{RspCode, Message}` body — even on internal failure — or VNPay keeps redelivering.
pub mod rsp {
    pub const CONFIRMED: &str = "00";
    pub const ORDER_NOT_FOUND: &str = "01";
    pub const ALREADY_CONFIRMED: &str = "02";
    pub const INVALID_AMOUNT: &str = "04";
    pub const INVALID_SIGNATURE: &str = "97";
    pub const UNKNOWN_ERROR: &str = "99";
}

const HASH_FIELDS: [&str; 2] = ["vnp_SecureHash", "vnp_SecureHashType"];
const VIETNAM_UTC_OFFSET_SECS: i32 = 7 * 3600;

/// Builds the canonical signing string: parameters minus the hash fields, sorted by key, each value
/// URL-encoded, joined as `key=value&…`. This exact string doubles as the redirect URL's query string.
pub fn hash_data(params: &HashMap<String, String>) -> String {
    let sorted: BTreeMap<&str, &str> = params
        .iter()
        .filter(|(k, _)| !HASH_FIELDS.contains(&k.as_str()))
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    sorted
        .into_iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

#[derive(Clone, Debug)]
pub struct VnPay {
    config: VnPayConfig,
}

impl VnPay {
    pub fn new(config: VnPayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VnPayConfig {
        &self.config
    }

    /// Constructs the signed payment redirect URL for an order. Pure function of its inputs — `created_at`
    /// and `client_ip` are passed in rather than sampled here so the result is reproducible.
    pub fn build_payment_url(
        &self,
        order_code: &str,
        amount: Vnd,
        order_info: &str,
        client_ip: &str,
        created_at: DateTime<Utc>,
    ) -> String {
        let txn_ref = format!("{order_code}_{}", created_at.timestamp_millis());
        let create_date = format_vnpay_date(created_at);
        let mut params = HashMap::new();
        params.insert("vnp_Version".to_string(), VNP_VERSION.to_string());
        params.insert("vnp_Command".to_string(), VNP_COMMAND_PAY.to_string());
        params.insert("vnp_TmnCode".to_string(), self.config.tmn_code.clone());
        params.insert("vnp_Amount".to_string(), amount.vnpay_amount().to_string());
        params.insert("vnp_CurrCode".to_string(), gnp_common::VND_CURRENCY_CODE.to_string());
        params.insert("vnp_TxnRef".to_string(), txn_ref);
        params.insert("vnp_OrderInfo".to_string(), order_info.to_string());
        params.insert("vnp_OrderType".to_string(), "other".to_string());
        params.insert("vnp_Locale".to_string(), "vn".to_string());
        params.insert("vnp_ReturnUrl".to_string(), self.config.return_url.clone());
        params.insert("vnp_IpAddr".to_string(), client_ip.to_string());
        params.insert("vnp_CreateDate".to_string(), create_date);
        let data = hash_data(&params);
        let signature = hmac_sha512_hex(self.config.hash_secret.reveal(), &data);
        format!("{}?{data}&vnp_SecureHash={signature}", self.config.pay_url)
    }

    /// Verifies `vnp_SecureHash` over the full callback parameter set. Missing hash ⇒ reject (fail closed).
    pub fn verify_secure_hash(&self, params: &HashMap<String, String>) -> bool {
        let provided = match params.get("vnp_SecureHash") {
            Some(h) if !h.is_empty() => h,
            _ => {
                warn!("🧾️ VNPay callback without vnp_SecureHash, rejecting");
                return false;
            },
        };
        let expected = hmac_sha512_hex(self.config.hash_secret.reveal(), &hash_data(params));
        let valid = digests_match(&expected, provided);
        if !valid {
            warn!("🧾️ VNPay callback signature mismatch for txnRef {:?}", params.get("vnp_TxnRef"));
        }
        valid
    }
}

/// The validated, typed view of a VNPay IPN/return parameter set.
#[derive(Debug, Clone)]
pub struct VnPayCallback {
    /// `{order_code}_{unix_millis}`, as issued by [`VnPay::build_payment_url`].
    pub txn_ref: String,
    /// Already divided back down from the ×100 wire value.
    pub amount: Vnd,
    pub response_code: String,
    pub transaction_no: String,
    pub bank_code: Option<String>,
    pub pay_date: Option<String>,
}

impl VnPayCallback {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, GatewayError> {
        let txn_ref = require(params, "vnp_TxnRef")?;
        let raw_amount = require(params, "vnp_Amount")?
            .parse::<i64>()
            .map_err(|e| GatewayError::InvalidAmount(format!("vnp_Amount is not an integer: {e}")))?;
        let amount = Vnd::from_vnpay_amount(raw_amount).map_err(|e| GatewayError::InvalidAmount(e.to_string()))?;
        let response_code = require(params, "vnp_ResponseCode")?;
        let transaction_no = require(params, "vnp_TransactionNo")?;
        Ok(Self {
            txn_ref,
            amount,
            response_code,
            transaction_no,
            bank_code: params.get("vnp_BankCode").cloned(),
            pay_date: params.get("vnp_PayDate").cloned(),
        })
    }

    pub fn is_success(&self) -> bool {
        self.response_code == VNP_RESPONSE_SUCCESS
    }
}

fn require(params: &HashMap<String, String>, key: &'static str) -> Result<String, GatewayError> {
    params.get(key).filter(|v| !v.is_empty()).cloned().ok_or(GatewayError::MissingField(key))
}

/// `yyyyMMddHHmmss` in Vietnam time (GMT+7), as required for vnp_CreateDate.
pub fn format_vnpay_date(at: DateTime<Utc>) -> String {
    let offset = FixedOffset::east_opt(VIETNAM_UTC_OFFSET_SECS).expect("+07:00 is a valid offset");
    at.with_timezone(&offset).format("%Y%m%d%H%M%S").to_string()
}
