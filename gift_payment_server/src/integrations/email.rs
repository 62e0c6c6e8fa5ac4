//! Order-confirmation email dispatch.
//!
//! The server does not speak SMTP. When an order is paid, the [`Mailer`] POSTs a JSON payload to a mail
//! webhook (configured via `GNP_MAIL_WEBHOOK_URL`) and lets that service do the actual delivery.
//!
//! Delivery is strictly fire-and-forget: it runs inside the engine's event handler, failures are logged and
//! dropped, and nothing here can affect a settlement that has already happened.
use gift_payment_engine::events::OrderPaidEvent;
use log::*;
use reqwest::Client;
use serde_json::json;

use crate::config::MailConfig;

#[derive(Clone)]
pub struct Mailer {
    config: MailConfig,
    client: Client,
}

impl Mailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config, client: Client::new() }
    }

    /// Sends the order-confirmation payload for a paid order. Never returns an error; failure is a log line.
    pub async fn send_order_confirmation(&self, event: OrderPaidEvent) {
        if !self.config.is_configured() {
            debug!("📧️ No mail webhook configured. Skipping confirmation for [{}]", event.order.order_code);
            return;
        }
        let order = &event.order;
        let payload = json!({
            "template": "order_confirmation",
            "to": order.customer_email,
            "customer_name": order.customer_name,
            "order_code": order.order_code.to_string(),
            "total_amount": order.total_amount.value(),
            "total_display": order.total_amount.to_string(),
            "payment_method": order.payment_method.to_string(),
            "paid_at": order.paid_at,
            "transaction_id": order.transaction_id,
        });
        match self.client.post(&self.config.webhook_url).json(&payload).send().await {
            Ok(res) if res.status().is_success() => {
                info!("📧️ Confirmation email queued for order [{}]", order.order_code);
            },
            Ok(res) => {
                warn!("📧️ Mail webhook answered {} for order [{}]", res.status(), order.order_code);
            },
            Err(e) => {
                warn!("📧️ Could not reach mail webhook for order [{}]: {e}", order.order_code);
            },
        }
    }
}
