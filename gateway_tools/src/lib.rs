//! Payment provider integrations for the GiftNest payment gateway.
//!
//! Each provider module carries three things:
//! * typed callback payloads, parsed and validated before anything else sees them,
//! * a signature verifier (pure, deterministic, fail-closed), and
//! * the outbound side: payment-creation calls or redirect/QR URL construction.
//!
//! Provider secrets are injected via the config structs in [`config`]; nothing in this crate reads the
//! environment at call time.

mod config;
mod error;

pub mod helpers;
pub mod momo;
pub mod sepay;
pub mod vietqr;
pub mod vnpay;

pub use config::{MomoConfig, SePayConfig, VietQrConfig, VnPayConfig};
pub use error::GatewayError;
pub use momo::{MomoApi, MomoIpn, MomoPayRequest, MomoPayResponse};
pub use sepay::SePayWebhook;
pub use vnpay::{VnPay, VnPayCallback};
