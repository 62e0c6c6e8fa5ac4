//! VietQR bank-QR URLs.
//!
//! The QR image itself is rendered by the img.vietqr.io service; all we produce is a deterministic URL from
//! the bank routing fields, the amount, and the transfer reference that later lets the SePay webhook
//! correlate the transfer back to the order.

use gnp_common::Vnd;

use crate::config::VietQrConfig;

/// `https://img.vietqr.io/image/{bankId}-{accountNo}-{template}.png?amount=…&addInfo=…&accountName=…`
pub fn qr_image_url(config: &VietQrConfig, amount: Vnd, transfer_reference: &str) -> String {
    format!(
        "https://img.vietqr.io/image/{}-{}-{}.png?amount={}&addInfo={}&accountName={}",
        config.bank_id,
        config.account_no,
        config.template,
        amount.value(),
        urlencoding::encode(transfer_reference),
        urlencoding::encode(&config.account_name),
    )
}
