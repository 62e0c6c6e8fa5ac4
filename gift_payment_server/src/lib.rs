//! # GiftNest payment server
//!
//! The HTTP boundary of the GiftNest payment gateway. It is responsible for:
//! * Creating pending orders at checkout and handing back the provider-specific payment instruction.
//! * Listening for payment notifications from MoMo, VNPay and SePay, verifying their authenticity, and
//!   handing normalized notices to the reconciliation engine.
//! * Answering each provider in the exact acknowledgement shape it documents, regardless of the internal
//!   outcome.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/checkout`: Creates a pending order and returns payment instructions.
//! * `/orders/{order_code}/status`: Read-only payment status polling.
//! * `/momo/ipn`, `/vnpay/ipn`, `/vnpay/return`, `/sepay/webhook`: Provider notification endpoints.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;

pub mod helpers;
pub mod integrations;
pub mod ipn_routes;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
