use gnp_common::Secret;
use log::*;

/// MoMo e-wallet configuration. The secret key signs both outbound create-payment requests and is used to
/// verify inbound IPN signatures.
#[derive(Debug, Clone, Default)]
pub struct MomoConfig {
    pub partner_code: String,
    pub access_key: String,
    pub secret_key: Secret<String>,
    /// Payment-creation endpoint, e.g. `https://test-payment.momo.vn/v2/gateway/api/create`
    pub endpoint: String,
    /// Where MoMo sends the customer's browser after payment.
    pub redirect_url: String,
    /// Where MoMo delivers the server-to-server IPN.
    pub ipn_url: String,
}

impl MomoConfig {
    pub fn new_from_env_or_default() -> Self {
        let partner_code = std::env::var("GNP_MOMO_PARTNER_CODE").unwrap_or_else(|_| {
            warn!("GNP_MOMO_PARTNER_CODE not set, using a useless default");
            "MOMO".to_string()
        });
        let access_key = std::env::var("GNP_MOMO_ACCESS_KEY").unwrap_or_else(|_| {
            warn!("GNP_MOMO_ACCESS_KEY not set, using a useless default");
            "accesskey".to_string()
        });
        let secret_key = Secret::new(std::env::var("GNP_MOMO_SECRET_KEY").unwrap_or_else(|_| {
            warn!("GNP_MOMO_SECRET_KEY not set. IPN signature checks will fail.");
            String::default()
        }));
        let endpoint = std::env::var("GNP_MOMO_ENDPOINT")
            .unwrap_or_else(|_| "https://test-payment.momo.vn/v2/gateway/api/create".to_string());
        let redirect_url = std::env::var("GNP_MOMO_REDIRECT_URL").unwrap_or_else(|_| {
            warn!("GNP_MOMO_REDIRECT_URL not set, customers will not return to the storefront");
            String::default()
        });
        let ipn_url = std::env::var("GNP_MOMO_IPN_URL").unwrap_or_else(|_| {
            warn!("GNP_MOMO_IPN_URL not set. MoMo payments cannot be reconciled automatically.");
            String::default()
        });
        Self { partner_code, access_key, secret_key, endpoint, redirect_url, ipn_url }
    }
}

/// VNPay configuration. `hash_secret` signs the outbound redirect URL and verifies IPN/return callbacks.
#[derive(Debug, Clone, Default)]
pub struct VnPayConfig {
    pub tmn_code: String,
    pub hash_secret: Secret<String>,
    /// Payment page, e.g. `https://sandbox.vnpayment.vn/paymentv2/vpcpay.html`
    pub pay_url: String,
    pub return_url: String,
}

impl VnPayConfig {
    pub fn new_from_env_or_default() -> Self {
        let tmn_code = std::env::var("GNP_VNPAY_TMN_CODE").unwrap_or_else(|_| {
            warn!("GNP_VNPAY_TMN_CODE not set, using a useless default");
            "TMNCODE".to_string()
        });
        let hash_secret = Secret::new(std::env::var("GNP_VNPAY_HASH_SECRET").unwrap_or_else(|_| {
            warn!("GNP_VNPAY_HASH_SECRET not set. Callback signature checks will fail.");
            String::default()
        }));
        let pay_url = std::env::var("GNP_VNPAY_PAY_URL")
            .unwrap_or_else(|_| "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html".to_string());
        let return_url = std::env::var("GNP_VNPAY_RETURN_URL").unwrap_or_else(|_| {
            warn!("GNP_VNPAY_RETURN_URL not set, customers will not return to the storefront");
            String::default()
        });
        Self { tmn_code, hash_secret, pay_url, return_url }
    }
}

/// SePay webhook configuration.
///
/// SePay does not sign its payloads. The only authenticity check available is the shared API token it sends
/// in the `Authorization` header. This is a known weakness of the integration (a spoofable shared constant),
/// which is why the amount check and order lookup still gate every transition.
#[derive(Debug, Clone, Default)]
pub struct SePayConfig {
    pub api_token: Secret<String>,
    /// When false, the token check is skipped entirely. Only ever disable this in tests.
    pub token_checks: bool,
}

impl SePayConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_token = Secret::new(std::env::var("GNP_SEPAY_API_TOKEN").unwrap_or_else(|_| {
            warn!("GNP_SEPAY_API_TOKEN not set. All SePay webhooks will be rejected.");
            String::default()
        }));
        let token_checks =
            gnp_common::helpers::parse_boolean_flag(std::env::var("GNP_SEPAY_TOKEN_CHECKS").ok(), true);
        Self { api_token, token_checks }
    }
}

/// Bank routing fields for the VietQR image service, used for manual bank transfers and as the fallback when
/// a gateway create-call fails.
#[derive(Debug, Clone, Default)]
pub struct VietQrConfig {
    /// VietQR bank identifier, e.g. `970422` (MB Bank).
    pub bank_id: String,
    pub account_no: String,
    pub account_name: String,
    /// Image template, e.g. `compact2`.
    pub template: String,
}

impl VietQrConfig {
    pub fn new_from_env_or_default() -> Self {
        let bank_id = std::env::var("GNP_VIETQR_BANK_ID").unwrap_or_else(|_| {
            warn!("GNP_VIETQR_BANK_ID not set, bank QR codes will not resolve");
            String::default()
        });
        let account_no = std::env::var("GNP_VIETQR_ACCOUNT_NO").unwrap_or_else(|_| {
            warn!("GNP_VIETQR_ACCOUNT_NO not set, bank QR codes will not resolve");
            String::default()
        });
        let account_name = std::env::var("GNP_VIETQR_ACCOUNT_NAME").unwrap_or_default();
        let template = std::env::var("GNP_VIETQR_TEMPLATE").unwrap_or_else(|_| "compact2".to_string());
        Self { bank_id, account_no, account_name, template }
    }
}
