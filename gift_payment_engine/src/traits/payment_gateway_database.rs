use thiserror::Error;

use crate::db_types::{NewOrder, NewOrderItem, Order, OrderCode, OrderItem};

/// This trait defines the storage behaviour backends must provide to support order reconciliation.
///
/// This behaviour includes:
/// * Creating pending orders with their line items.
/// * Looking orders up by their external order code.
/// * The single settlement transition, `Pending → Paid`, expressed as a conditional update.
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayDatabase: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Takes a new order and its line items and, in a single atomic transaction, stores them in the
    /// database. This call is idempotent on the order code.
    ///
    /// Returns `true` in the second parameter if the order was inserted, or `false` if it already existed.
    async fn insert_order(
        &self,
        order: NewOrder,
        items: &[NewOrderItem],
    ) -> Result<(Order, bool), PaymentGatewayError>;

    /// Fetches the order with the given order code, if it exists.
    async fn fetch_order_by_code(&self, code: &OrderCode) -> Result<Option<Order>, PaymentGatewayError>;

    /// Fetches the line items belonging to the order with the given row id.
    async fn fetch_items_for_order(&self, order_id: i64) -> Result<Vec<OrderItem>, PaymentGatewayError>;

    /// Marks the order as paid and confirmed, recording the provider transaction id and the payment time.
    ///
    /// The update only applies while the order is still `Pending`. If another delivery of the same
    /// notification has already settled the order, `None` is returned and nothing is changed. This is the
    /// idempotency guarantee of the whole engine; callers must not re-check and update in separate steps.
    async fn mark_order_paid(&self, code: &OrderCode, txid: &str) -> Result<Option<Order>, PaymentGatewayError>;
}

#[derive(Debug, Error)]
pub enum PaymentGatewayError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order [{0}] already exists")]
    OrderAlreadyExists(OrderCode),
}

impl From<sqlx::Error> for PaymentGatewayError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}
