use gift_payment_engine::{
    db_types::{NewOrder, NewOrderItem, Order, OrderCode, OrderItem},
    traits::{PaymentGatewayDatabase, PaymentGatewayError},
};
use mockall::mock;

mock! {
    pub PaymentDb {}

    impl Clone for PaymentDb {
        fn clone(&self) -> Self;
    }

    impl PaymentGatewayDatabase for PaymentDb {
        fn url(&self) -> &str;
        async fn insert_order(&self, order: NewOrder, items: &[NewOrderItem]) -> Result<(Order, bool), PaymentGatewayError>;
        async fn fetch_order_by_code(&self, code: &OrderCode) -> Result<Option<Order>, PaymentGatewayError>;
        async fn fetch_items_for_order(&self, order_id: i64) -> Result<Vec<OrderItem>, PaymentGatewayError>;
        async fn mark_order_paid(&self, code: &OrderCode, txid: &str) -> Result<Option<Order>, PaymentGatewayError>;
    }
}
