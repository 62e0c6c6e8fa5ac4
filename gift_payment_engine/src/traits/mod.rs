//! The behaviour contract that storage backends must satisfy.
//!
//! The reconciliation API is generic over [`PaymentGatewayDatabase`], so the HTTP layer and the tests can
//! swap the SQLite implementation for mocks without touching any settlement logic.

mod payment_gateway_database;

pub use payment_gateway_database::{PaymentGatewayDatabase, PaymentGatewayError};
