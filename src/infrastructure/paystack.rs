use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::PaystackConfig;
use crate::domain::errors::DomainError;
use crate::domain::payment::{ChargeRequest, ChargeVerification, InitializedCharge};
use crate::domain::ports::PaymentGateway;

/// Every Paystack response wraps its payload the same way.
#[derive(Debug, Deserialize)]
struct Envelope {
    status: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Serialize)]
struct InitializeBody<'a> {
    email: &'a str,
    /// Minor units, sent as a string.
    amount: String,
    metadata: Metadata,
}

#[derive(Debug, Serialize)]
struct Metadata {
    user_id: i64,
    custom_fields: Vec<CustomField>,
}

#[derive(Debug, Serialize)]
struct CustomField {
    display_name: &'static str,
    variable_name: &'static str,
    value: i64,
}

#[derive(Debug, Deserialize)]
struct InitializeData {
    reference: String,
    authorization_url: String,
    access_code: String,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    #[serde(default)]
    status: String,
    #[serde(default)]
    amount: i64,
}

/// `PaymentGateway` backed by the Paystack REST API.
pub struct PaystackClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl PaystackClient {
    pub fn new(config: &PaystackConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        })
    }

    /// `{base_url}/transaction/verify/{reference}` with the reference encoded
    /// as a single path segment.
    fn verify_url(&self, reference: &str) -> Result<reqwest::Url, DomainError> {
        let mut url = reqwest::Url::parse(&format!("{}/transaction/verify", self.base_url))
            .map_err(|e| DomainError::Gateway(format!("Invalid Paystack base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| DomainError::Gateway("Invalid Paystack base URL".to_string()))?
            .push(reference);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Envelope, DomainError> {
        let response = request
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| DomainError::Gateway(format!("Paystack request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            log::warn!("Paystack responded {status}: {body}");
            return Err(DomainError::Gateway(format!("Paystack responded {status}")));
        }

        response
            .json::<Envelope>()
            .await
            .map_err(|e| DomainError::Gateway(format!("Failed to parse Paystack response: {e}")))
    }
}

fn data<T: DeserializeOwned>(envelope: &Envelope) -> Result<T, DomainError> {
    serde_json::from_value(envelope.data.clone())
        .map_err(|e| DomainError::Gateway(format!("Unexpected Paystack payload: {e}")))
}

#[async_trait]
impl PaymentGateway for PaystackClient {
    fn name(&self) -> &'static str {
        "paystack"
    }

    async fn initialize(&self, request: ChargeRequest) -> Result<InitializedCharge, DomainError> {
        let body = InitializeBody {
            email: &request.email,
            amount: request.amount_minor.to_string(),
            metadata: Metadata {
                user_id: request.user_id,
                custom_fields: vec![CustomField {
                    display_name: "User ID",
                    variable_name: "user_id",
                    value: request.user_id,
                }],
            },
        };

        let envelope = self
            .send(
                self.http
                    .post(format!("{}/transaction/initialize", self.base_url))
                    .json(&body),
            )
            .await?;
        if !envelope.status {
            return Err(DomainError::Gateway(format!(
                "Paystack rejected the charge: {}",
                envelope.message
            )));
        }

        let init: InitializeData = data(&envelope)?;
        Ok(InitializedCharge {
            reference: init.reference,
            authorization_url: init.authorization_url,
            access_code: init.access_code,
            payload: envelope.data,
        })
    }

    async fn verify(&self, reference: &str) -> Result<ChargeVerification, DomainError> {
        let envelope = self
            .send(self.http.get(self.verify_url(reference)?))
            .await?;

        let verified: VerifyData = if envelope.status {
            data(&envelope)?
        } else {
            VerifyData {
                status: String::new(),
                amount: 0,
            }
        };
        let gateway_status = if verified.status.is_empty() {
            envelope.message.clone()
        } else {
            verified.status
        };

        Ok(ChargeVerification {
            reference: reference.to_string(),
            successful: envelope.status && gateway_status == "success",
            gateway_status,
            amount_minor: verified.amount,
        })
    }
}
