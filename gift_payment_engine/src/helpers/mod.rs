mod order_code;
mod transfer_reference;

pub use order_code::{extract_order_code, extract_order_code_from_content, new_order_code};
pub use transfer_reference::transfer_reference;
