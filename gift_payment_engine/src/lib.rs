//! GiftNest Payment Engine
//!
//! The payment engine owns the order records of the GiftNest storefront and the one state transition that
//! matters: `Pending → Paid`. Payment providers (MoMo, VNPay, SePay bank transfers) deliver notifications
//! at least once, in any order, over multiple channels at the same time; the engine turns each of them into
//! at most one settlement per order.
//!
//! The library is divided into three main sections:
//! 1. Database management ([`mod@sqlite`] behind the [`traits::PaymentGatewayDatabase`] contract). The
//!    critical piece is the conditional `mark_order_paid` update: the WHERE clause excludes orders that are
//!    already paid, so a duplicate or concurrent delivery becomes a no-op at the storage layer, not by luck
//!    in application code.
//! 2. The reconciliation API ([`mod@reconciliation`]): normalized payment notices in, typed settlement
//!    outcomes out. Provider parsing and signature checks happen before this layer; HTTP shapes after it.
//! 3. Events ([`mod@events`]): a small pub/sub channel that carries `OrderPaid` events to side-effect
//!    handlers (the confirmation email). Handlers are fire-and-forget and can never affect a settlement.

pub mod db_types;
pub mod events;
pub mod helpers;
mod reconciliation;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use reconciliation::{PaymentNotice, PaymentProvider, ReconciliationApi, SettlementOutcome};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
