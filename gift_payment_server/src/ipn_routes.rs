//! Provider notification handlers.
//!
//! Each provider dictates its own acknowledgement contract, and none of them want our internal errors:
//! * MoMo gets `204 No Content`, always. Anything else triggers its retry storm.
//! * VNPay gets HTTP 200 with `{RspCode, Message}`, always — internal failures become RspCode "99".
//! * SePay gets `{"success": bool}`.
//!
//! Whatever happens in here, state only ever changes through [`ReconciliationApi::settle`], so a handler bug
//! can produce a wrong acknowledgement but never a wrong settlement.
use std::collections::HashMap;

use actix_web::{web, HttpRequest, HttpResponse};
use gateway_tools::{vnpay::rsp, MomoApi, MomoIpn, SePayWebhook, VnPay, VnPayCallback};
use gift_payment_engine::{
    helpers::{extract_order_code, extract_order_code_from_content},
    traits::PaymentGatewayDatabase,
    PaymentNotice,
    PaymentProvider,
    ReconciliationApi,
    SettlementOutcome,
};
use log::*;

use crate::{
    config::ServerOptions,
    data_objects::{JsonResponse, VnPayIpnResponse},
    route,
};

//----------------------------------------------   MoMo  ----------------------------------------------------
route!(momo_ipn => Post "/momo/ipn" impl PaymentGatewayDatabase);
/// MoMo's server-to-server payment notification.
///
/// The body is parsed by hand from raw bytes so that even a malformed payload gets the documented `204`
/// acknowledgement instead of an actix-generated 400.
pub async fn momo_ipn<B: PaymentGatewayDatabase>(
    body: web::Bytes,
    momo: web::Data<MomoApi>,
    api: web::Data<ReconciliationApi<B>>,
) -> HttpResponse {
    let ipn = match serde_json::from_slice::<MomoIpn>(&body) {
        Ok(ipn) => ipn,
        Err(e) => {
            warn!("📬️💸️ Discarding malformed MoMo IPN: {e}");
            return HttpResponse::NoContent().finish();
        },
    };
    if !ipn.verify_signature(momo.config()) {
        warn!("📬️💸️ Discarding MoMo IPN with invalid signature for orderId {}", ipn.order_id);
        return HttpResponse::NoContent().finish();
    }
    let Some(order_code) = extract_order_code(&ipn.order_id) else {
        warn!("📬️💸️ MoMo IPN orderId [{}] does not contain an order code", ipn.order_id);
        return HttpResponse::NoContent().finish();
    };
    let notice = PaymentNotice {
        order_code,
        provider: PaymentProvider::Momo,
        txid: ipn.trans_id.to_string(),
        amount_paid: Some(ipn.amount()),
        success: ipn.is_success(),
    };
    match api.settle(notice).await {
        Ok(outcome) => debug!("📬️💸️ MoMo IPN for [{}] processed: {}", ipn.order_id, outcome_label(&outcome)),
        Err(e) => error!("📬️💸️ Error settling MoMo IPN for [{}]: {e}", ipn.order_id),
    }
    HttpResponse::NoContent().finish()
}

//----------------------------------------------   VNPay  ----------------------------------------------------
route!(vnpay_ipn => Get "/vnpay/ipn" impl PaymentGatewayDatabase);
/// VNPay's server-to-server notification. Parameters arrive in the query string.
pub async fn vnpay_ipn<B: PaymentGatewayDatabase>(
    query: web::Query<HashMap<String, String>>,
    vnpay: web::Data<VnPay>,
    api: web::Data<ReconciliationApi<B>>,
) -> HttpResponse {
    let response = process_vnpay_callback(&query, &vnpay, &api).await;
    debug!("📬️🧾️ VNPay IPN answered with RspCode {}", response.rsp_code);
    HttpResponse::Ok().json(response)
}

route!(vnpay_return => Get "/vnpay/return" impl PaymentGatewayDatabase);
/// The customer's browser coming back from the VNPay payment page.
///
/// Runs the same verification and settlement as the IPN (either may arrive first; the loser's update is a
/// no-op), then sends the browser on to the storefront result page.
pub async fn vnpay_return<B: PaymentGatewayDatabase>(
    query: web::Query<HashMap<String, String>>,
    vnpay: web::Data<VnPay>,
    api: web::Data<ReconciliationApi<B>>,
    options: web::Data<ServerOptions>,
) -> HttpResponse {
    let response = process_vnpay_callback(&query, &vnpay, &api).await;
    let order_code =
        query.get("vnp_TxnRef").and_then(|r| extract_order_code(r)).map(|c| c.to_string()).unwrap_or_default();
    let (status, message) = match response.rsp_code.as_str() {
        rsp::CONFIRMED => {
            if query.get("vnp_ResponseCode").map(|c| c == "00").unwrap_or(false) {
                ("success", "payment_confirmed")
            } else {
                ("failed", "payment_declined")
            }
        },
        rsp::ALREADY_CONFIRMED => ("success", "already_paid"),
        rsp::ORDER_NOT_FOUND => ("failed", "order_not_found"),
        rsp::INVALID_AMOUNT => ("failed", "invalid_amount"),
        rsp::INVALID_SIGNATURE => ("failed", "invalid_signature"),
        _ => ("failed", "unknown_error"),
    };
    let target =
        format!("{}/payment/result?status={status}&orderCode={order_code}&message={message}", options.frontend_url);
    debug!("📬️🧾️ VNPay return for [{order_code}] redirecting with status={status}");
    HttpResponse::Found().insert_header(("Location", target)).finish()
}

/// Verification, parsing and settlement shared by the VNPay IPN and return handlers. Never returns an error;
/// every failure mode maps onto a VNPay response code.
async fn process_vnpay_callback<B: PaymentGatewayDatabase>(
    params: &HashMap<String, String>,
    vnpay: &VnPay,
    api: &ReconciliationApi<B>,
) -> VnPayIpnResponse {
    if !vnpay.verify_secure_hash(params) {
        return VnPayIpnResponse::new(rsp::INVALID_SIGNATURE, "Invalid signature");
    }
    let callback = match VnPayCallback::from_params(params) {
        Ok(cb) => cb,
        Err(e) => {
            warn!("📬️🧾️ Could not parse VNPay callback: {e}");
            return VnPayIpnResponse::new(rsp::UNKNOWN_ERROR, "Invalid callback data");
        },
    };
    let Some(order_code) = extract_order_code(&callback.txn_ref) else {
        warn!("📬️🧾️ VNPay txnRef [{}] does not contain an order code", callback.txn_ref);
        return VnPayIpnResponse::new(rsp::ORDER_NOT_FOUND, "Order not found");
    };
    let notice = PaymentNotice {
        order_code,
        provider: PaymentProvider::VnPay,
        txid: callback.transaction_no.clone(),
        amount_paid: Some(callback.amount),
        success: callback.is_success(),
    };
    match api.settle(notice).await {
        Ok(SettlementOutcome::Settled(_)) => VnPayIpnResponse::new(rsp::CONFIRMED, "Confirm Success"),
        // A declined payment is still a successfully received notification.
        Ok(SettlementOutcome::Declined(_)) => VnPayIpnResponse::new(rsp::CONFIRMED, "Confirm Success"),
        Ok(SettlementOutcome::AlreadySettled(_)) => {
            VnPayIpnResponse::new(rsp::ALREADY_CONFIRMED, "Order already confirmed")
        },
        Ok(SettlementOutcome::UnknownOrder(_)) => VnPayIpnResponse::new(rsp::ORDER_NOT_FOUND, "Order not found"),
        Ok(SettlementOutcome::Underpaid { .. }) => VnPayIpnResponse::new(rsp::INVALID_AMOUNT, "Invalid amount"),
        Err(e) => {
            error!("📬️🧾️ Error settling VNPay callback: {e}");
            VnPayIpnResponse::new(rsp::UNKNOWN_ERROR, "Unknown error")
        },
    }
}

//----------------------------------------------   SePay  ----------------------------------------------------
// Mounted under the `/sepay` scope, which carries the token middleware.
route!(sepay_webhook => Post "/webhook" impl PaymentGatewayDatabase);
/// SePay's bank transfer notification. Token authentication happens in the
/// [`crate::middleware::ApiTokenMiddlewareFactory`] wrapping this route.
pub async fn sepay_webhook<B: PaymentGatewayDatabase>(
    _req: HttpRequest,
    body: web::Json<SePayWebhook>,
    api: web::Data<ReconciliationApi<B>>,
) -> HttpResponse {
    let hook = body.into_inner();
    if !hook.is_incoming() {
        debug!("📬️🏦️ Ignoring outbound transfer [{}]", hook.reference_code);
        return HttpResponse::Ok().json(JsonResponse::success("Outbound transfer ignored"));
    }
    let Some(order_code) = extract_order_code_from_content(&hook.content) else {
        warn!("📬️🏦️ No order code in transfer content: {}", hook.content);
        return HttpResponse::Ok().json(JsonResponse::failure("No order code in transfer content"));
    };
    let notice = PaymentNotice {
        order_code,
        provider: PaymentProvider::SePay,
        txid: hook.reference_code.clone(),
        amount_paid: Some(hook.amount()),
        success: true,
    };
    match api.settle(notice).await {
        Ok(SettlementOutcome::Settled(o)) => {
            HttpResponse::Ok().json(JsonResponse::success(format!("Order {} settled", o.order_code)))
        },
        Ok(SettlementOutcome::AlreadySettled(o)) => {
            HttpResponse::Ok().json(JsonResponse::success(format!("Order {} was already settled", o.order_code)))
        },
        Ok(SettlementOutcome::UnknownOrder(code)) => {
            HttpResponse::Ok().json(JsonResponse::failure(format!("No order with code {code}")))
        },
        Ok(SettlementOutcome::Underpaid { order, expected, paid }) => HttpResponse::Ok().json(JsonResponse::failure(
            format!("Transfer for {} covers {paid} of {expected}", order.order_code),
        )),
        Ok(SettlementOutcome::Declined(_)) => HttpResponse::Ok().json(JsonResponse::failure("Transfer not settled")),
        Err(e) => {
            error!("📬️🏦️ Error settling bank transfer [{}]: {e}", hook.reference_code);
            HttpResponse::Ok().json(JsonResponse::failure("Internal error"))
        },
    }
}

fn outcome_label(outcome: &SettlementOutcome) -> &'static str {
    match outcome {
        SettlementOutcome::Settled(_) => "settled",
        SettlementOutcome::AlreadySettled(_) => "already settled",
        SettlementOutcome::UnknownOrder(_) => "unknown order",
        SettlementOutcome::Underpaid { .. } => "underpaid",
        SettlementOutcome::Declined(_) => "declined",
    }
}
