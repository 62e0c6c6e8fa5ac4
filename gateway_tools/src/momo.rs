//! MoMo e-wallet integration.
//!
//! MoMo signs every message (outbound create-payment requests and inbound IPNs) with HMAC-SHA256 over a
//! canonical `key=value&…` string. The field order is fixed by the provider contract — it is NOT
//! alphabetical-by-accident; the lists below are part of the wire protocol and must not be reordered.
//!
//! The order code is correlated through `orderId`, which we format as `{order_code}_{unix_millis}` so that
//! MoMo's requirement of a unique orderId per payment attempt does not force a new order code per retry.

use std::sync::Arc;

use chrono::Utc;
use gnp_common::Vnd;
use log::*;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    config::MomoConfig,
    helpers::{digests_match, hmac_sha256_hex},
    GatewayError,
};

pub const MOMO_REQUEST_TYPE: &str = "captureWallet";
pub const MOMO_RESULT_SUCCESS: i64 = 0;

/// The IPN body MoMo POSTs to us after a payment attempt completes.
///
/// Every field listed here except `extraData` is required; a payload missing any of them fails
/// deserialization and is rejected before any signature or order logic runs (fail closed).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomoIpn {
    pub partner_code: String,
    /// `{order_code}_{unix_millis}`
    pub order_id: String,
    pub request_id: String,
    pub amount: i64,
    pub order_info: String,
    pub order_type: String,
    pub trans_id: i64,
    /// 0 indicates a successful payment.
    pub result_code: i64,
    pub message: String,
    pub pay_type: String,
    pub response_time: i64,
    #[serde(default)]
    pub extra_data: String,
    pub signature: String,
}

impl MomoIpn {
    pub fn is_success(&self) -> bool {
        self.result_code == MOMO_RESULT_SUCCESS
    }

    pub fn amount(&self) -> Vnd {
        Vnd::from(self.amount)
    }

    /// The provider-fixed canonical field order for IPN signatures.
    pub fn canonical_string(&self, access_key: &str) -> String {
        format!(
            "accessKey={access_key}&amount={}&extraData={}&message={}&orderId={}&orderInfo={}&orderType={}&\
             partnerCode={}&payType={}&requestId={}&responseTime={}&resultCode={}&transId={}",
            self.amount,
            self.extra_data,
            self.message,
            self.order_id,
            self.order_info,
            self.order_type,
            self.partner_code,
            self.pay_type,
            self.request_id,
            self.response_time,
            self.result_code,
            self.trans_id
        )
    }

    /// Recomputes the HMAC over the canonical field set and compares it to the `signature` field.
    pub fn verify_signature(&self, config: &MomoConfig) -> bool {
        let expected = hmac_sha256_hex(config.secret_key.reveal(), &self.canonical_string(&config.access_key));
        let valid = digests_match(&expected, &self.signature);
        if !valid {
            warn!("💸️ MoMo IPN signature mismatch for orderId {}", self.order_id);
        }
        valid
    }
}

//--------------------------------------   Create payment    ---------------------------------------------------------

/// What the checkout flow asks MoMo for.
#[derive(Debug, Clone)]
pub struct MomoPayRequest {
    pub order_code: String,
    pub amount: Vnd,
    pub order_info: String,
}

/// MoMo's answer to a create-payment call. On success (`resultCode == 0`), at least `payUrl` is present.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomoPayResponse {
    pub result_code: i64,
    pub message: String,
    #[serde(default)]
    pub pay_url: Option<String>,
    #[serde(default)]
    pub deeplink: Option<String>,
    #[serde(default)]
    pub qr_code_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePaymentBody {
    partner_code: String,
    access_key: String,
    request_id: String,
    amount: i64,
    order_id: String,
    order_info: String,
    redirect_url: String,
    ipn_url: String,
    extra_data: String,
    request_type: String,
    signature: String,
    lang: String,
}

#[derive(Clone)]
pub struct MomoApi {
    config: MomoConfig,
    client: Arc<Client>,
}

impl MomoApi {
    pub fn new(config: MomoConfig) -> Result<Self, GatewayError> {
        let client = Client::builder().build().map_err(|e| GatewayError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &MomoConfig {
        &self.config
    }

    /// Asks MoMo to create a payment for the given order, returning the pay/deeplink/QR URLs.
    ///
    /// A non-zero `resultCode` surfaces as [`GatewayError::PaymentDeclined`]; callers are expected to fall
    /// back to a manual bank QR in that case rather than failing the checkout.
    pub async fn create_payment(&self, request: MomoPayRequest) -> Result<MomoPayResponse, GatewayError> {
        let body = self.build_create_body(&request, Utc::now().timestamp_millis());
        trace!("💸️ Sending MoMo create-payment request for order {}", request.order_code);
        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::ResponseError(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| GatewayError::ResponseError(e.to_string()))?;
            return Err(GatewayError::QueryError { status, message });
        }
        let result =
            response.json::<MomoPayResponse>().await.map_err(|e| GatewayError::JsonError(e.to_string()))?;
        if result.result_code == MOMO_RESULT_SUCCESS {
            debug!("💸️ MoMo accepted payment request for order {}", request.order_code);
            Ok(result)
        } else {
            Err(GatewayError::PaymentDeclined { code: result.result_code, message: result.message })
        }
    }

    fn build_create_body(&self, request: &MomoPayRequest, now_millis: i64) -> CreatePaymentBody {
        let order_id = format!("{}_{now_millis}", request.order_code);
        let request_id = order_id.clone();
        let amount = request.amount.value();
        // The provider-fixed canonical field order for create-payment signatures.
        let canonical = format!(
            "accessKey={}&amount={amount}&extraData=&ipnUrl={}&orderId={order_id}&orderInfo={}&partnerCode={}&\
             redirectUrl={}&requestId={request_id}&requestType={MOMO_REQUEST_TYPE}",
            self.config.access_key,
            self.config.ipn_url,
            request.order_info,
            self.config.partner_code,
            self.config.redirect_url,
        );
        let signature = hmac_sha256_hex(self.config.secret_key.reveal(), &canonical);
        CreatePaymentBody {
            partner_code: self.config.partner_code.clone(),
            access_key: self.config.access_key.clone(),
            request_id,
            amount,
            order_id,
            order_info: request.order_info.clone(),
            redirect_url: self.config.redirect_url.clone(),
            ipn_url: self.config.ipn_url.clone(),
            extra_data: String::new(),
            request_type: MOMO_REQUEST_TYPE.to_string(),
            signature,
            lang: "vi".to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use gnp_common::Secret;

    use super::*;

    fn test_config() -> MomoConfig {
        MomoConfig {
            partner_code: "MOMOTEST".to_string(),
            access_key: "F8BBA842ECF85".to_string(),
            secret_key: Secret::new("K951B6PE1waDMi640xX08PD3vg6EkVlz".to_string()),
            endpoint: "https://test-payment.momo.vn/v2/gateway/api/create".to_string(),
            redirect_url: "https://shop.example.com/payment/result".to_string(),
            ipn_url: "https://shop.example.com/momo/ipn".to_string(),
        }
    }

    fn signed_ipn() -> MomoIpn {
        let mut ipn = MomoIpn {
            partner_code: "MOMOTEST".to_string(),
            order_id: "GN1700000000001234_1700000001234".to_string(),
            request_id: "GN1700000000001234_1700000001234".to_string(),
            amount: 150_000,
            order_info: "GiftNest order GN1700000000001234".to_string(),
            order_type: "momo_wallet".to_string(),
            trans_id: 4_088_878_653,
            result_code: 0,
            message: "Successful.".to_string(),
            pay_type: "qr".to_string(),
            response_time: 1_700_000_002_000,
            extra_data: String::new(),
            signature: String::new(),
        };
        let config = test_config();
        ipn.signature = hmac_sha256_hex(config.secret_key.reveal(), &ipn.canonical_string(&config.access_key));
        ipn
    }

    #[test]
    fn canonical_string_uses_the_provider_field_order() {
        let ipn = signed_ipn();
        assert_eq!(
            ipn.canonical_string("F8BBA842ECF85"),
            "accessKey=F8BBA842ECF85&amount=150000&extraData=&message=Successful.&\
             orderId=GN1700000000001234_1700000001234&orderInfo=GiftNest order GN1700000000001234&\
             orderType=momo_wallet&partnerCode=MOMOTEST&payType=qr&requestId=GN1700000000001234_1700000001234&\
             responseTime=1700000002000&resultCode=0&transId=4088878653"
        );
    }

    // Pins the HMAC-SHA256 digest of the canonical string above, so that a change to either the canonical
    // order or the HMAC plumbing fails loudly.
    #[test]
    fn known_signature_verifies() {
        let ipn = signed_ipn();
        assert_eq!(ipn.signature, "331a331c131ddc15756b3153c80936b1ff134d924bbddea44e7998476212afd3");
        assert!(ipn.verify_signature(&test_config()));
    }

    #[test]
    fn mutated_amount_is_rejected() {
        let mut ipn = signed_ipn();
        ipn.amount += 1;
        assert!(!ipn.verify_signature(&test_config()));
    }

    #[test]
    fn mutated_result_code_is_rejected() {
        let mut ipn = signed_ipn();
        ipn.result_code = 9000;
        assert!(!ipn.verify_signature(&test_config()));
    }

    #[test]
    fn missing_signature_field_fails_deserialization() {
        let json = r#"{
            "partnerCode": "MOMOTEST", "orderId": "GN1_2", "requestId": "GN1_2", "amount": 1000,
            "orderInfo": "x", "orderType": "momo_wallet", "transId": 1, "resultCode": 0,
            "message": "ok", "payType": "qr", "responseTime": 1
        }"#;
        assert!(serde_json::from_str::<MomoIpn>(json).is_err());
    }

    #[test]
    fn create_body_is_signed_over_the_outbound_field_order() {
        let api = MomoApi::new(test_config()).unwrap();
        let request = MomoPayRequest {
            order_code: "GN1700000000001234".to_string(),
            amount: Vnd::from(150_000),
            order_info: "GiftNest order GN1700000000001234".to_string(),
        };
        let body = api.build_create_body(&request, 1_700_000_001_234);
        assert_eq!(body.order_id, "GN1700000000001234_1700000001234");
        assert_eq!(body.request_id, body.order_id);
        assert_eq!(body.amount, 150_000);
        assert_eq!(body.request_type, MOMO_REQUEST_TYPE);
        let canonical = format!(
            "accessKey=F8BBA842ECF85&amount=150000&extraData=&ipnUrl=https://shop.example.com/momo/ipn&\
             orderId=GN1700000000001234_1700000001234&orderInfo=GiftNest order GN1700000000001234&\
             partnerCode=MOMOTEST&redirectUrl=https://shop.example.com/payment/result&\
             requestId=GN1700000000001234_1700000001234&requestType=captureWallet"
        );
        assert_eq!(body.signature, hmac_sha256_hex("K951B6PE1waDMi640xX08PD3vg6EkVlz", &canonical));
    }
}
