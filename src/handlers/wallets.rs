use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::wallet_service::WalletService;
use crate::domain::caller::Caller;
use crate::domain::money::format_money;
use crate::domain::wallet::{WalletAudit, WalletTransactionView, WalletView};
use crate::errors::AppError;

use super::run_blocking;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateWalletRequest {
    /// ISO 4217 code. Falls back to the configured wallet currency.
    pub currency: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WalletResponse {
    pub id: Uuid,
    pub user_id: i64,
    pub balance: String,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl From<WalletView> for WalletResponse {
    fn from(wallet: WalletView) -> Self {
        WalletResponse {
            id: wallet.id,
            user_id: wallet.user_id,
            balance: format_money(&wallet.balance),
            currency: wallet.currency,
            created_at: wallet.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceResponse {
    pub balance: String,
    pub currency: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WalletAuditResponse {
    pub wallet_id: Uuid,
    pub balance: String,
    pub ledger_balance: String,
    pub consistent: bool,
}

impl From<WalletAudit> for WalletAuditResponse {
    fn from(audit: WalletAudit) -> Self {
        WalletAuditResponse {
            consistent: audit.is_consistent(),
            wallet_id: audit.wallet_id,
            balance: format_money(&audit.balance),
            ledger_balance: format_money(&audit.ledger_balance),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WalletTransactionResponse {
    pub id: Uuid,
    pub wallet_id: Uuid,
    /// `CREDIT` or `DEBIT`.
    pub transaction_type: String,
    pub amount: String,
    pub reference: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<WalletTransactionView> for WalletTransactionResponse {
    fn from(tx: WalletTransactionView) -> Self {
        WalletTransactionResponse {
            id: tx.id,
            wallet_id: tx.wallet_id,
            transaction_type: tx.transaction_type.to_string(),
            amount: format_money(&tx.amount),
            reference: tx.reference,
            description: tx.description,
            created_at: tx.created_at,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /wallet
#[utoipa::path(
    get,
    path = "/wallet",
    responses(
        (status = 200, description = "Caller's wallet", body = WalletResponse),
        (status = 401, description = "Missing caller identity"),
        (status = 404, description = "Caller has no wallet yet"),
    ),
    tag = "wallet"
)]
pub async fn get_wallet(
    svc: web::Data<WalletService>,
    caller: Caller,
) -> Result<HttpResponse, AppError> {
    let wallet = run_blocking(move || svc.get_wallet(&caller)).await?;
    Ok(HttpResponse::Ok().json(WalletResponse::from(wallet)))
}

/// POST /wallet
#[utoipa::path(
    post,
    path = "/wallet",
    request_body = CreateWalletRequest,
    responses(
        (status = 201, description = "Wallet opened with a zero balance", body = WalletResponse),
        (status = 400, description = "Invalid currency code"),
        (status = 401, description = "Missing caller identity"),
        (status = 409, description = "Caller already has a wallet"),
    ),
    tag = "wallet"
)]
pub async fn create_wallet(
    svc: web::Data<WalletService>,
    caller: Caller,
    body: Option<web::Json<CreateWalletRequest>>,
) -> Result<HttpResponse, AppError> {
    let currency = body.and_then(|b| b.into_inner().currency);
    let wallet = run_blocking(move || svc.create_wallet(&caller, currency.as_deref())).await?;
    Ok(HttpResponse::Created().json(WalletResponse::from(wallet)))
}

/// GET /wallet/balance
#[utoipa::path(
    get,
    path = "/wallet/balance",
    responses(
        (status = 200, description = "Current balance", body = BalanceResponse),
        (status = 401, description = "Missing caller identity"),
        (status = 404, description = "Caller has no wallet yet"),
    ),
    tag = "wallet"
)]
pub async fn get_balance(
    svc: web::Data<WalletService>,
    caller: Caller,
) -> Result<HttpResponse, AppError> {
    let wallet = run_blocking(move || svc.get_wallet(&caller)).await?;
    Ok(HttpResponse::Ok().json(BalanceResponse {
        balance: format_money(&wallet.balance),
        currency: wallet.currency,
    }))
}

/// GET /wallet/audit
///
/// Compares the stored balance with the sum of the ledger.
#[utoipa::path(
    get,
    path = "/wallet/audit",
    responses(
        (status = 200, description = "Balance against ledger", body = WalletAuditResponse),
        (status = 401, description = "Missing caller identity"),
        (status = 404, description = "Caller has no wallet yet"),
    ),
    tag = "wallet"
)]
pub async fn audit_wallet(
    svc: web::Data<WalletService>,
    caller: Caller,
) -> Result<HttpResponse, AppError> {
    let audit = run_blocking(move || svc.audit(&caller)).await?;
    Ok(HttpResponse::Ok().json(WalletAuditResponse::from(audit)))
}

/// GET /wallet/transactions
///
/// Newest first.
#[utoipa::path(
    get,
    path = "/wallet/transactions",
    responses(
        (status = 200, description = "Ledger entries of the caller's wallet", body = [WalletTransactionResponse]),
        (status = 401, description = "Missing caller identity"),
    ),
    tag = "wallet"
)]
pub async fn list_transactions(
    svc: web::Data<WalletService>,
    caller: Caller,
) -> Result<HttpResponse, AppError> {
    let txs = run_blocking(move || svc.transactions(&caller)).await?;
    let body: Vec<WalletTransactionResponse> = txs.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    get,
    path = "/wallet/transactions/{id}",
    params(("id" = Uuid, Path, description = "Wallet transaction UUID")),
    responses(
        (status = 200, description = "Ledger entry", body = WalletTransactionResponse),
        (status = 401, description = "Missing caller identity"),
        (status = 404, description = "No such entry in the caller's wallet"),
    ),
    tag = "wallet"
)]
pub async fn get_transaction(
    svc: web::Data<WalletService>,
    caller: Caller,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let tx = run_blocking(move || svc.transaction(&caller, id)).await?;
    Ok(HttpResponse::Ok().json(WalletTransactionResponse::from(tx)))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    use crate::handlers::auth::USER_ID_HEADER;
    use crate::handlers::test_support::services;

    #[actix_web::test]
    async fn wallet_lifecycle() {
        let (services, _, _) = services();
        let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

        let req = test::TestRequest::get()
            .uri("/wallet")
            .insert_header((USER_ID_HEADER, "4"))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );

        let req = test::TestRequest::post()
            .uri("/wallet")
            .insert_header((USER_ID_HEADER, "4"))
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let wallet: Value = test::read_body_json(resp).await;
        assert_eq!(wallet["balance"], "0.00");
        assert_eq!(wallet["currency"], "GHS");

        let req = test::TestRequest::post()
            .uri("/wallet")
            .insert_header((USER_ID_HEADER, "4"))
            .set_json(json!({ "currency": "USD" }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CONFLICT
        );

        let req = test::TestRequest::get()
            .uri("/wallet/balance")
            .insert_header((USER_ID_HEADER, "4"))
            .to_request();
        let balance: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(balance, json!({ "balance": "0.00", "currency": "GHS" }));

        let req = test::TestRequest::get()
            .uri("/wallet/audit")
            .insert_header((USER_ID_HEADER, "4"))
            .to_request();
        let audit: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(audit["consistent"], true);

        let req = test::TestRequest::get()
            .uri("/wallet/transactions")
            .insert_header((USER_ID_HEADER, "4"))
            .to_request();
        let txs: Value = test::call_and_read_body_json(&app, req).await;
        assert!(txs.as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn invalid_currency_is_rejected() {
        let (services, _, _) = services();
        let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

        let req = test::TestRequest::post()
            .uri("/wallet")
            .insert_header((USER_ID_HEADER, "4"))
            .set_json(json!({ "currency": "cedi" }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[actix_web::test]
    async fn wallet_requires_identity() {
        let (services, _, _) = services();
        let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

        let req = test::TestRequest::get().uri("/wallet/balance").to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
