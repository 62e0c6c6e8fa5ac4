use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewOrder, NewOrderItem, Order, OrderCode, OrderItem},
    events::{EventProducers, OrderPaidEvent},
    reconciliation::{PaymentNotice, SettlementOutcome},
    traits::{PaymentGatewayDatabase, PaymentGatewayError},
};

/// `ReconciliationApi` is the primary API for creating orders and settling payment notifications against
/// them.
pub struct ReconciliationApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for ReconciliationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi")
    }
}

impl<B> ReconciliationApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> ReconciliationApi<B>
where B: PaymentGatewayDatabase
{
    /// Submit a new pending order with its line items.
    ///
    /// The call is idempotent on the order code; resubmitting an existing order returns the stored record
    /// unchanged.
    pub async fn process_new_order(
        &self,
        order: NewOrder,
        items: &[NewOrderItem],
    ) -> Result<Order, PaymentGatewayError> {
        let (order, inserted) = self.db.insert_order(order, items).await?;
        if inserted {
            debug!("🔄️📦️ Order [{}] created, awaiting payment via {}", order.order_code, order.payment_method);
        } else {
            debug!("🔄️📦️ Order [{}] resubmitted, returning existing record", order.order_code);
        }
        Ok(order)
    }

    pub async fn fetch_order(&self, code: &OrderCode) -> Result<Option<Order>, PaymentGatewayError> {
        self.db.fetch_order_by_code(code).await
    }

    pub async fn fetch_order_items(&self, order: &Order) -> Result<Vec<OrderItem>, PaymentGatewayError> {
        self.db.fetch_items_for_order(order.id).await
    }

    /// Settle a verified payment notice against its order.
    ///
    /// Every invocation re-reads the current order state; nothing is cached between calls. The method never
    /// mutates anything except through the conditional `mark_order_paid` update, so it is safe to call any
    /// number of times, from any number of concurrent deliveries, for the same notification.
    pub async fn settle(&self, notice: PaymentNotice) -> Result<SettlementOutcome, PaymentGatewayError> {
        let Some(order) = self.db.fetch_order_by_code(&notice.order_code).await? else {
            warn!("🔄️💰️ {} notice [{}] references unknown order [{}]", notice.provider, notice.txid, notice.order_code);
            return Ok(SettlementOutcome::UnknownOrder(notice.order_code));
        };
        if order.is_paid() {
            debug!("🔄️💰️ Order [{}] is already settled. Ignoring {} notice [{}]", order.order_code, notice.provider, notice.txid);
            return Ok(SettlementOutcome::AlreadySettled(order));
        }
        if !notice.success {
            info!("🔄️💰️ {} reports payment [{}] for order [{}] as unsuccessful", notice.provider, notice.txid, order.order_code);
            return Ok(SettlementOutcome::Declined(order));
        }
        if let Some(paid) = notice.amount_paid {
            // A surplus fulfils the order; only a shortfall blocks settlement.
            if paid < order.total_amount {
                warn!(
                    "🔄️💰️ Order [{}] underpaid via {}: expected {}, got {}",
                    order.order_code, notice.provider, order.total_amount, paid
                );
                return Ok(SettlementOutcome::Underpaid { expected: order.total_amount, paid, order });
            }
        }
        match self.db.mark_order_paid(&order.order_code, &notice.txid).await? {
            Some(paid_order) => {
                info!(
                    "🔄️💰️ Order [{}] settled via {} with transaction id [{}]",
                    paid_order.order_code, notice.provider, notice.txid
                );
                self.call_order_paid_hook(&paid_order).await;
                Ok(SettlementOutcome::Settled(paid_order))
            },
            None => {
                // A concurrent delivery won the race between our status read and the update.
                debug!("🔄️💰️ Order [{}] was settled concurrently. Ignoring notice [{}]", order.order_code, notice.txid);
                let order = self
                    .db
                    .fetch_order_by_code(&order.order_code)
                    .await?
                    .unwrap_or(order);
                Ok(SettlementOutcome::AlreadySettled(order))
            },
        }
    }

    async fn call_order_paid_hook(&self, paid_order: &Order) {
        for emitter in &self.producers.order_paid_producer {
            debug!("🔄️📦️ Notifying order paid hook subscribers");
            let event = OrderPaidEvent::new(paid_order.clone());
            emitter.publish_event(event).await;
        }
    }
}
