//! The bank transfer reference.
//!
//! Bank transfer content must survive systems that strip diacritics and fold case, so the reference is the
//! customer's name folded to plain ASCII uppercase, followed by the order code. It is derived on demand from
//! the order record — never stored — and the derivation must be byte-identical at checkout (when it goes
//! into the QR code) and at reconciliation (when the SePay webhook echoes the content back).

use crate::db_types::Order;

const VIETNAMESE_FOLDS: [(&str, char); 7] = [
    ("àáạảãâầấậẩẫăằắặẳẵ", 'a'),
    ("èéẹẻẽêềếệểễ", 'e'),
    ("ìíịỉĩ", 'i'),
    ("òóọỏõôồốộổỗơờớợởỡ", 'o'),
    ("ùúụủũưừứựửữ", 'u'),
    ("ỳýỵỷỹ", 'y'),
    ("đ", 'd'),
];

/// `"{ASCII_UPPER_NAME} {ORDER_CODE}"`, e.g. `"NGUYEN VAN AN GN1700000000001234"`.
pub fn transfer_reference(customer_name: &str, order: &Order) -> String {
    let name = fold_to_ascii_upper(customer_name);
    if name.is_empty() {
        order.order_code.to_string()
    } else {
        format!("{name} {}", order.order_code)
    }
}

/// Strips Vietnamese diacritics, uppercases, drops everything that is not ASCII alphanumeric, and collapses
/// runs of whitespace to a single space.
pub fn fold_to_ascii_upper(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_space = false;
    for raw in s.chars() {
        for c in raw.to_lowercase() {
            let folded = fold_char(c);
            if folded.is_ascii_alphanumeric() {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(folded.to_ascii_uppercase());
            } else if folded.is_whitespace() {
                pending_space = true;
            }
            // Anything else (punctuation, non-Vietnamese symbols) is dropped outright.
        }
    }
    out
}

fn fold_char(c: char) -> char {
    for (variants, base) in VIETNAMESE_FOLDS {
        if variants.contains(c) {
            return base;
        }
    }
    c
}
