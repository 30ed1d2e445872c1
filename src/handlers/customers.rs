use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::customer_service::CustomerService;
use crate::domain::caller::Caller;
use crate::domain::customer::{CustomerProfile, CustomerView, Membership};
use crate::domain::errors::DomainError;
use crate::errors::AppError;

use super::run_blocking;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CustomerRequest {
    #[serde(default)]
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
    /// One of `B`, `S`, `G`. Defaults to `B`.
    pub membership: Option<String>,
}

impl CustomerRequest {
    fn into_profile(self) -> Result<CustomerProfile, DomainError> {
        let membership = match self.membership.as_deref() {
            Some(code) => code.parse::<Membership>()?,
            None => Membership::default(),
        };
        Ok(CustomerProfile {
            phone: self.phone,
            birth_date: self.birth_date,
            membership,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerResponse {
    pub id: Uuid,
    pub user_id: i64,
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
    pub membership: String,
}

impl From<CustomerView> for CustomerResponse {
    fn from(view: CustomerView) -> Self {
        CustomerResponse {
            id: view.id,
            user_id: view.user_id,
            phone: view.phone,
            birth_date: view.birth_date,
            membership: view.membership.to_string(),
        }
    }
}

/// POST /customers
#[utoipa::path(
    post,
    path = "/customers",
    request_body = CustomerRequest,
    responses(
        (status = 201, description = "Profile created for the caller", body = CustomerResponse),
        (status = 400, description = "Invalid membership or phone"),
        (status = 401, description = "Missing caller identity"),
        (status = 409, description = "Caller already has a profile"),
    ),
    tag = "customers"
)]
pub async fn create_customer(
    svc: web::Data<CustomerService>,
    caller: Caller,
    body: web::Json<CustomerRequest>,
) -> Result<HttpResponse, AppError> {
    let profile = body.into_inner().into_profile()?;
    let customer = run_blocking(move || svc.create(&caller, profile)).await?;
    Ok(HttpResponse::Created().json(CustomerResponse::from(customer)))
}

/// GET /customers/me
///
/// Creates the profile on first access.
#[utoipa::path(
    get,
    path = "/customers/me",
    responses(
        (status = 200, description = "Caller's profile", body = CustomerResponse),
        (status = 401, description = "Missing caller identity"),
    ),
    tag = "customers"
)]
pub async fn get_me(
    svc: web::Data<CustomerService>,
    caller: Caller,
) -> Result<HttpResponse, AppError> {
    let customer = run_blocking(move || svc.me(&caller)).await?;
    Ok(HttpResponse::Ok().json(CustomerResponse::from(customer)))
}

/// PUT /customers/me
#[utoipa::path(
    put,
    path = "/customers/me",
    request_body = CustomerRequest,
    responses(
        (status = 200, description = "Profile updated", body = CustomerResponse),
        (status = 400, description = "Invalid membership or phone"),
        (status = 401, description = "Missing caller identity"),
    ),
    tag = "customers"
)]
pub async fn update_me(
    svc: web::Data<CustomerService>,
    caller: Caller,
    body: web::Json<CustomerRequest>,
) -> Result<HttpResponse, AppError> {
    let profile = body.into_inner().into_profile()?;
    let customer = run_blocking(move || svc.update_me(&caller, profile)).await?;
    Ok(HttpResponse::Ok().json(CustomerResponse::from(customer)))
}

#[utoipa::path(
    get,
    path = "/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer UUID")),
    responses(
        (status = 200, description = "Customer found", body = CustomerResponse),
        (status = 401, description = "Missing caller identity"),
        (status = 404, description = "Customer not found or not visible to the caller"),
    ),
    tag = "customers"
)]
pub async fn get_customer(
    svc: web::Data<CustomerService>,
    caller: Caller,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let customer = run_blocking(move || svc.get(&caller, id)).await?;
    Ok(HttpResponse::Ok().json(CustomerResponse::from(customer)))
}

#[utoipa::path(
    put,
    path = "/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer UUID")),
    request_body = CustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = CustomerResponse),
        (status = 400, description = "Invalid membership or phone"),
        (status = 401, description = "Missing caller identity"),
        (status = 404, description = "Customer not found or not visible to the caller"),
    ),
    tag = "customers"
)]
pub async fn update_customer(
    svc: web::Data<CustomerService>,
    caller: Caller,
    path: web::Path<Uuid>,
    body: web::Json<CustomerRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let profile = body.into_inner().into_profile()?;
    let customer = run_blocking(move || svc.update(&caller, id, profile)).await?;
    Ok(HttpResponse::Ok().json(CustomerResponse::from(customer)))
}
