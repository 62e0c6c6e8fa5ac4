//! Order-code generation and recovery.
//!
//! MoMo and VNPay require a unique transaction reference per payment attempt, so the outbound side sends
//! `{order_code}_{unix_millis}` and the inbound side splits on the underscore to recover the code. SePay
//! bank transfers have no structured field at all; the code is fished out of the free-text transfer content
//! by pattern match. Both extractors are strict about the `GN<digits>` shape — provider callbacks are
//! untrusted input and garbage must fail cleanly, not panic.

use chrono::Utc;
use rand::Rng;
use regex::Regex;

use crate::db_types::OrderCode;

pub const ORDER_CODE_PREFIX: &str = "GN";

/// Generates a fresh order code: `GN` + millisecond timestamp + 4 random digits.
pub fn new_order_code() -> OrderCode {
    let mut rng = rand::thread_rng();
    OrderCode(format!("{ORDER_CODE_PREFIX}{}{:04}", Utc::now().timestamp_millis(), rng.gen_range(0..10_000)))
}

/// Recovers the order code from a composite transaction reference of the form `{order_code}_{unix_millis}`.
/// Returns `None` if the delimiter is missing or the prefix is not a well-formed order code.
pub fn extract_order_code(reference: &str) -> Option<OrderCode> {
    let (code, _suffix) = reference.split_once('_')?;
    is_order_code(code).then(|| OrderCode(code.to_string()))
}

/// Recovers the order code from free-text bank transfer content, e.g.
/// `"NGUYEN VAN AN GN1700000000001234"`. The first `GN<digits>` run wins.
pub fn extract_order_code_from_content(content: &str) -> Option<OrderCode> {
    let re = Regex::new(r"GN\d+").expect("order code pattern is valid");
    re.find(content).map(|m| OrderCode(m.as_str().to_string()))
}

fn is_order_code(s: &str) -> bool {
    s.strip_prefix(ORDER_CODE_PREFIX).map(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())).unwrap_or(false)
}
