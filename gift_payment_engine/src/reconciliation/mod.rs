//! The reconciliation API.
//!
//! Provider-specific parsing and signature checks happen at the server boundary; what arrives here is a
//! normalized [`PaymentNotice`]. What leaves is a [`SettlementOutcome`] that the boundary translates back
//! into whatever acknowledgement shape the provider demands.

mod api;
mod objects;

pub use api::ReconciliationApi;
pub use objects::{PaymentNotice, PaymentProvider, SettlementOutcome};
