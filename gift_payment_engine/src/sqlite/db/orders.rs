use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, NewOrderItem, Order, OrderCode, OrderItem},
    traits::PaymentGatewayError,
};

/// Inserts the order into the database, returning `false` in the second parameter if an order with the same
/// code already exists.
pub async fn idempotent_insert(
    order: NewOrder,
    conn: &mut SqliteConnection,
) -> Result<(Order, bool), PaymentGatewayError> {
    let inserted = match fetch_order_by_code(&order.order_code, conn).await? {
        Some(order) => (order, false),
        None => {
            let order = insert_order(order, conn).await?;
            debug!("📝️ Order [{}] inserted with id {}", order.order_code, order.id);
            (order, true)
        },
    };
    Ok(inserted)
}

/// Inserts a new order into the database using the given connection. This is not atomic. You can embed this
/// call inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
///
/// Orders always start out `Pending`/`Pending` on both status axes; the schema defaults take care of that.
async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, PaymentGatewayError> {
    let order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_code,
                customer_name,
                customer_email,
                total_amount,
                discount_amount,
                payment_method,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(order.order_code)
    .bind(order.customer_name)
    .bind(order.customer_email)
    .bind(order.total_amount.value())
    .bind(order.discount_amount.value())
    .bind(order.payment_method)
    .bind(order.created_at)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

/// Inserts a line item for the given order row id.
pub async fn insert_order_item(
    order_id: i64,
    item: &NewOrderItem,
    conn: &mut SqliteConnection,
) -> Result<OrderItem, PaymentGatewayError> {
    let item = sqlx::query_as(
        r#"
            INSERT INTO order_items (order_id, name, unit_price, quantity, image_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(&item.name)
    .bind(item.unit_price.value())
    .bind(item.quantity)
    .bind(&item.image_url)
    .fetch_one(conn)
    .await?;
    Ok(item)
}

/// Returns the order with the given order code, if any.
pub async fn fetch_order_by_code(code: &OrderCode, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE order_code = $1").bind(code.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

/// Returns the line items for the order with the given row id, in insertion order.
pub async fn fetch_items_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

/// The settlement update. The `payment_status = 'Pending'` guard in the WHERE clause is what makes duplicate
/// and concurrent notification deliveries harmless: whichever delivery runs first flips the row, every later
/// one matches nothing and gets `None` back.
pub async fn mark_order_paid(
    code: &OrderCode,
    txid: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, PaymentGatewayError> {
    let order: Option<Order> = sqlx::query_as(
        r#"
            UPDATE orders SET
                payment_status = 'Paid',
                fulfilment_status = 'Confirmed',
                transaction_id = $2,
                paid_at = CURRENT_TIMESTAMP,
                updated_at = CURRENT_TIMESTAMP
            WHERE order_code = $1 AND payment_status = 'Pending'
            RETURNING *;
        "#,
    )
    .bind(code.as_str())
    .bind(txid)
    .fetch_optional(conn)
    .await?;
    if let Some(o) = &order {
        debug!("🗃️ Order [{}] settled with transaction id {txid}", o.order_code);
    }
    Ok(order)
}
