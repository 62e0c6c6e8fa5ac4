//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will
//! cause the current worker to stop processing new requests. Any long, non-cpu-bound operation (e.g. I/O,
//! database operations, gateway calls) must be expressed as futures or asynchronous functions.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use gateway_tools::{vietqr::qr_image_url, MomoApi, MomoPayRequest, VietQrConfig, VnPay};
use gift_payment_engine::{
    db_types::{NewOrder, NewOrderItem, Order, OrderCode, PaymentMethod},
    helpers::transfer_reference,
    traits::PaymentGatewayDatabase,
    ReconciliationApi,
};
use log::*;

use crate::{
    config::ServerOptions,
    data_objects::{CheckoutRequest, CheckoutResponse, OrderStatusResponse, PaymentInstruction},
    errors::ServerError,
    helpers::get_remote_ip,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout => Post "/checkout" impl PaymentGatewayDatabase);
/// Route handler for the checkout endpoint
///
/// Creates the pending order first, then works out the payment instruction for the chosen method. The order
/// always exists before any provider callback can arrive for it.
///
/// A MoMo create-payment failure does not fail the checkout: the customer is handed the manual bank QR as a
/// fallback and the order stays payable.
pub async fn checkout<B: PaymentGatewayDatabase>(
    req: HttpRequest,
    body: web::Json<CheckoutRequest>,
    api: web::Data<ReconciliationApi<B>>,
    momo: web::Data<MomoApi>,
    vnpay: web::Data<VnPay>,
    vietqr: web::Data<VietQrConfig>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    if request.items.is_empty() {
        return Err(ServerError::InvalidRequestBody("An order needs at least one item".to_string()));
    }
    let total = request.total_amount();
    if total.value() <= 0 {
        return Err(ServerError::InvalidRequestBody(format!("Invalid order total: {total}")));
    }
    let mut new_order = NewOrder::new(
        request.customer_name.clone(),
        request.customer_email.clone(),
        total,
        request.payment_method,
    );
    new_order.discount_amount = request.discount_amount.unwrap_or_default();
    let items = request
        .items
        .iter()
        .map(|i| NewOrderItem {
            name: i.name.clone(),
            unit_price: i.unit_price,
            quantity: i.quantity,
            image_url: i.image_url.clone(),
        })
        .collect::<Vec<NewOrderItem>>();
    let order = api.process_new_order(new_order, &items).await?;
    info!("💻️📦️ Order [{}] created for {} via {}", order.order_code, order.total_amount, order.payment_method);

    let client_ip = get_remote_ip(&req, options.use_x_forwarded_for, options.use_forwarded)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let payment = payment_instruction(&order, &momo, &vnpay, &vietqr, &client_ip).await;
    let response =
        CheckoutResponse { order_code: order.order_code.to_string(), total_amount: order.total_amount, payment };
    Ok(HttpResponse::Ok().json(response))
}

async fn payment_instruction(
    order: &Order,
    momo: &MomoApi,
    vnpay: &VnPay,
    vietqr: &VietQrConfig,
    client_ip: &str,
) -> PaymentInstruction {
    let order_info = format!("Thanh toan don hang {}", order.order_code);
    match order.payment_method {
        PaymentMethod::Momo => {
            let request = MomoPayRequest {
                order_code: order.order_code.to_string(),
                amount: order.total_amount,
                order_info,
            };
            match momo.create_payment(request).await {
                Ok(response) if response.pay_url.is_some() => PaymentInstruction::Momo {
                    pay_url: response.pay_url.unwrap_or_default(),
                    deeplink: response.deeplink,
                    qr_code_url: response.qr_code_url,
                },
                Ok(response) => {
                    warn!(
                        "💻️💸️ MoMo accepted order [{}] but returned no payUrl ({}). Falling back to bank QR.",
                        order.order_code, response.message
                    );
                    bank_instruction(order, vietqr)
                },
                Err(e) => {
                    warn!("💻️💸️ MoMo create-payment failed for [{}]: {e}. Falling back to bank QR.", order.order_code);
                    bank_instruction(order, vietqr)
                },
            }
        },
        PaymentMethod::Vnpay => {
            let pay_url =
                vnpay.build_payment_url(order.order_code.as_str(), order.total_amount, &order_info, client_ip, Utc::now());
            PaymentInstruction::Vnpay { pay_url }
        },
        PaymentMethod::Bank => bank_instruction(order, vietqr),
        PaymentMethod::Cod | PaymentMethod::Visa => PaymentInstruction::PayOnDelivery,
    }
}

fn bank_instruction(order: &Order, vietqr: &VietQrConfig) -> PaymentInstruction {
    let reference = transfer_reference(&order.customer_name, order);
    let qr = qr_image_url(vietqr, order.total_amount, &reference);
    PaymentInstruction::BankTransfer { qr_image_url: qr, transfer_reference: reference }
}

//----------------------------------------------   Order status  ----------------------------------------------------
route!(order_status => Get "/orders/{order_code}/status" impl PaymentGatewayDatabase);
/// Read-only polling endpoint for the storefront while the customer is off paying.
pub async fn order_status<B: PaymentGatewayDatabase>(
    path: web::Path<String>,
    api: web::Data<ReconciliationApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let code = OrderCode::from(path.into_inner());
    trace!("💻️ Status request for order [{code}]");
    let order = api
        .fetch_order(&code)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No order with code {code}")))?;
    Ok(HttpResponse::Ok().json(OrderStatusResponse::from(&order)))
}
