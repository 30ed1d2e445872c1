use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::payment_service::PaymentService;
use crate::domain::caller::Caller;
use crate::domain::money::format_money;
use crate::domain::payment::{InitializedCharge, PaymentLogView, VerificationOutcome};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct InitializePaymentRequest {
    /// Major units as a decimal string, e.g. "25.00".
    pub amount: String,
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InitializePaymentResponse {
    pub reference: String,
    pub authorization_url: String,
    pub access_code: String,
    /// The gateway's own response data, passed through unchanged.
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
}

impl From<InitializedCharge> for InitializePaymentResponse {
    fn from(charge: InitializedCharge) -> Self {
        InitializePaymentResponse {
            reference: charge.reference,
            authorization_url: charge.authorization_url,
            access_code: charge.access_code,
            data: charge.payload,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyPaymentRequest {
    pub reference: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyPaymentResponse {
    /// Always `success`; failed verifications answer 400.
    pub status: String,
    pub reference: String,
    pub amount: String,
    /// Wallet balance after the credit.
    pub balance: String,
    pub currency: String,
    /// True when the reference had already been credited before this call.
    pub already_settled: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentLogResponse {
    pub id: Uuid,
    pub user_id: i64,
    pub gateway: String,
    pub reference: String,
    pub amount: String,
    /// `pending`, `success` or `failed`.
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<PaymentLogView> for PaymentLogResponse {
    fn from(log: PaymentLogView) -> Self {
        PaymentLogResponse {
            id: log.id,
            user_id: log.user_id,
            gateway: log.gateway,
            reference: log.reference,
            amount: format_money(&log.amount),
            status: log.status.to_string(),
            created_at: log.created_at,
        }
    }
}

fn log_list(logs: Vec<PaymentLogView>) -> Vec<PaymentLogResponse> {
    logs.into_iter().map(Into::into).collect()
}

// ── Handlers ─────────────────────────────────────────────────────────────────
//
// PaymentService is async (it awaits the gateway and moves Diesel work onto
// the blocking pool itself), so these handlers call it directly.

/// POST /paystack/initialize
#[utoipa::path(
    post,
    path = "/paystack/initialize",
    request_body = InitializePaymentRequest,
    responses(
        (status = 200, description = "Charge initialized; redirect the payer to authorization_url", body = InitializePaymentResponse),
        (status = 400, description = "Invalid amount or email"),
        (status = 401, description = "Missing caller identity"),
        (status = 502, description = "Gateway unreachable or rejected the request"),
    ),
    tag = "payments"
)]
pub async fn initialize_payment(
    svc: web::Data<PaymentService>,
    caller: Caller,
    body: web::Json<InitializePaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let charge = svc.initialize(&caller, &body.amount, &body.email).await?;
    Ok(HttpResponse::Ok().json(InitializePaymentResponse::from(charge)))
}

/// POST /paystack/verify
///
/// Safe to call repeatedly: a reference is credited to the wallet at most once.
#[utoipa::path(
    post,
    path = "/paystack/verify",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Payment settled into the wallet", body = VerifyPaymentResponse),
        (status = 400, description = "Payment not successful"),
        (status = 401, description = "Missing caller identity"),
        (status = 404, description = "Unknown reference"),
        (status = 502, description = "Gateway unreachable"),
    ),
    tag = "payments"
)]
pub async fn verify_payment(
    svc: web::Data<PaymentService>,
    caller: Caller,
    body: web::Json<VerifyPaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let reference = body.into_inner().reference;
    match svc.verify(&caller, &reference).await? {
        VerificationOutcome::Settled {
            reference,
            amount,
            balance,
            currency,
            already_settled,
        } => Ok(HttpResponse::Ok().json(VerifyPaymentResponse {
            status: "success".to_string(),
            reference,
            amount: format_money(&amount),
            balance: format_money(&balance),
            currency,
            already_settled,
        })),
        VerificationOutcome::Failed { .. } => Ok(HttpResponse::BadRequest().json(json!({
            "status": "failed",
            "message": "Payment not successful",
        }))),
    }
}

/// GET /paystack/history
///
/// Newest first.
#[utoipa::path(
    get,
    path = "/paystack/history",
    responses(
        (status = 200, description = "Caller's payment attempts", body = [PaymentLogResponse]),
        (status = 401, description = "Missing caller identity"),
    ),
    tag = "payments"
)]
pub async fn payment_history(
    svc: web::Data<PaymentService>,
    caller: Caller,
) -> Result<HttpResponse, AppError> {
    let logs = svc.history(&caller).await?;
    Ok(HttpResponse::Ok().json(log_list(logs)))
}

/// GET /payments
#[utoipa::path(
    get,
    path = "/payments",
    responses(
        (status = 200, description = "Caller's payment logs", body = [PaymentLogResponse]),
        (status = 401, description = "Missing caller identity"),
    ),
    tag = "payments"
)]
pub async fn list_payment_logs(
    svc: web::Data<PaymentService>,
    caller: Caller,
) -> Result<HttpResponse, AppError> {
    let logs = svc.history(&caller).await?;
    Ok(HttpResponse::Ok().json(log_list(logs)))
}

/// GET /payments/{id}
#[utoipa::path(
    get,
    path = "/payments/{id}",
    params(("id" = Uuid, Path, description = "Payment log UUID")),
    responses(
        (status = 200, description = "Payment log", body = PaymentLogResponse),
        (status = 401, description = "Missing caller identity"),
        (status = 404, description = "No such log for the caller"),
    ),
    tag = "payments"
)]
pub async fn get_payment_log(
    svc: web::Data<PaymentService>,
    caller: Caller,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let log = svc.get_log(&caller, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(PaymentLogResponse::from(log)))
}
