//! HMAC primitives shared by the provider signature schemes.
//!
//! MoMo signs with HMAC-SHA256 over a fixed-order canonical string; VNPay signs with HMAC-SHA512 over a
//! sorted, URL-encoded parameter string. Both transmit lowercase hex digests.

use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha512};

type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

pub fn hmac_sha256_hex(key: &str, data: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC can take a key of any size");
    mac.update(data.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

pub fn hmac_sha512_hex(key: &str, data: &str) -> String {
    let mut mac = HmacSha512::new_from_slice(key.as_bytes()).expect("HMAC can take a key of any size");
    mac.update(data.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-style comparison of hex digests. Providers send lowercase hex, but VNPay's older SDKs upper-case
/// theirs, so the comparison is case-insensitive.
pub fn digests_match(expected: &str, provided: &str) -> bool {
    expected.len() == provided.len() && expected.eq_ignore_ascii_case(provided)
}
