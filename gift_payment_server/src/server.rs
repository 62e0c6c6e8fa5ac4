use std::time::Duration;

use actix_web::{http::KeepAlive, middleware::Logger, web, App, HttpServer};
use gateway_tools::{MomoApi, VnPay};
use gift_payment_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    ReconciliationApi,
    SqliteDatabase,
};
use log::info;

use crate::{
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    integrations::email::Mailer,
    ipn_routes::{MomoIpnRoute, SepayWebhookRoute, VnpayIpnRoute, VnpayReturnRoute},
    middleware::ApiTokenMiddlewareFactory,
    routes::{health, CheckoutRoute, OrderStatusRoute},
};

const EVENT_BUFFER_SIZE: usize = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, configure_hooks(&config));
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Wires the side-effect handlers for payment events. Currently just the confirmation mailer.
pub fn configure_hooks(config: &ServerConfig) -> EventHooks {
    let mailer = Mailer::new(config.mail.clone());
    let mut hooks = EventHooks::default();
    hooks.on_order_paid(move |event| {
        let mailer = mailer.clone();
        Box::pin(async move {
            mailer.send_order_confirmation(event).await;
        })
    });
    hooks
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<actix_web::dev::Server, ServerError> {
    // Fail fast on a broken HTTP client rather than inside the first checkout.
    let momo_api = MomoApi::new(config.momo.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("🚀️ Database URL: {}", config.database_url);
    let (host, port) = (config.host.clone(), config.port);
    let srv = HttpServer::new(move || {
        let api = ReconciliationApi::new(db.clone(), producers.clone());
        let vnpay = VnPay::new(config.vnpay.clone());
        let options = ServerOptions::from_config(&config);
        let sepay_scope = web::scope("/sepay")
            .wrap(ApiTokenMiddlewareFactory::new(config.sepay.clone()))
            .service(SepayWebhookRoute::<SqliteDatabase>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("gnp::access_log"))
            .app_data(web::Data::new(api))
            .app_data(web::Data::new(momo_api.clone()))
            .app_data(web::Data::new(vnpay))
            .app_data(web::Data::new(config.vietqr.clone()))
            .app_data(web::Data::new(options))
            .service(health)
            .service(CheckoutRoute::<SqliteDatabase>::new())
            .service(OrderStatusRoute::<SqliteDatabase>::new())
            .service(MomoIpnRoute::<SqliteDatabase>::new())
            .service(VnpayIpnRoute::<SqliteDatabase>::new())
            .service(VnpayReturnRoute::<SqliteDatabase>::new())
            .service(sepay_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
