use crate::db_types::Order;

/// Fired exactly once per order, when the settlement update succeeds. Duplicate notification deliveries
/// never reach this point, so handlers may treat the event as unique per order without deduplicating.
#[derive(Debug, Clone)]
pub struct OrderPaidEvent {
    pub order: Order,
}

impl OrderPaidEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}
