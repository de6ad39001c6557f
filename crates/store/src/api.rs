//! REST API client for the Rule Store HTTP endpoints.
//!
//! Wraps rule upsert/delete/listing and the car and plan lookups using
//! [`reqwest`].

use std::time::Duration;

use brokerage_core::catalog::{CarMake, CarModel, ModelYear, Plan, PlansResponse};
use brokerage_core::error::RuleValidationError;
use brokerage_core::payload::CarRulePayload;
use brokerage_core::rules::RulesListing;
use brokerage_core::scope::{InsuranceType, PlanScope};
use brokerage_core::types::DbId;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;

use crate::config::StoreConfig;

/// Shown when the store fails without a message of its own.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong";

/// HTTP client for one Rule Store deployment.
#[derive(Clone)]
pub struct StoreClient {
    client: reqwest::Client,
    base_url: String,
}

/// Errors from the Rule Store REST layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The store returned a non-2xx status code.
    #[error("Rule Store error ({status}): {body}")]
    Api {
        status: u16,
        /// The store's `message` field, when the body carried one.
        message: Option<String>,
        /// Raw response body for debugging.
        body: String,
    },

    /// The payload failed boundary validation and was not sent.
    #[error(transparent)]
    InvalidPayload(#[from] RuleValidationError),

    /// The client could not be built from its configuration.
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl StoreError {
    /// Message to show the user: the store's own message verbatim, or a
    /// generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            StoreError::Api {
                message: Some(message),
                ..
            } => message.clone(),
            StoreError::InvalidPayload(err) => err.to_string(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Error body shape of the store. `message` is a string or a list of them.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<ErrorMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ErrorMessage {
    fn into_text(self) -> String {
        match self {
            ErrorMessage::One(s) => s,
            ErrorMessage::Many(parts) => parts.join(", "),
        }
    }
}

/// Extract the user-facing `message` from an error body, if any.
fn extract_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .map(ErrorMessage::into_text)
        .filter(|m| !m.trim().is_empty())
}

impl StoreClient {
    /// Build a client from configuration (timeout and bearer token).
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| StoreError::Config(format!("invalid token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::Config(e.to_string()))?;

        Ok(Self::with_client(client, config.base_url.clone()))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create or replace a car rule.
    ///
    /// Sends `POST /rules/car`. The payload is boundary-validated first and
    /// never sent when invalid. Returns the store's response body (`null`
    /// when empty).
    pub async fn upsert_car_rule(
        &self,
        payload: &CarRulePayload,
    ) -> Result<serde_json::Value, StoreError> {
        payload.validate_boundary()?;

        let scope = payload.scope();
        tracing::debug!(
            rule_type = payload.rule_type(),
            rule_id = ?payload.id(),
            plan_id = scope.plan_id,
            insurance_company_id = scope.insurance_company_id,
            condition = %scope.condition,
            "Upserting car rule",
        );

        let response = self
            .client
            .post(self.url("/rules/car"))
            .json(payload)
            .send()
            .await?;

        Self::parse_optional_json(response).await
    }

    /// Delete car rules by id via `POST /rules/car/delete`.
    pub async fn delete_car_rules(&self, ids: &[DbId]) -> Result<(), StoreError> {
        tracing::debug!(?ids, "Deleting car rules");

        let response = self
            .client
            .post(self.url("/rules/car/delete"))
            .json(&serde_json::json!({ "ids": ids }))
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// Fetch every rule of a plan scope via `GET /rules/getRules`.
    pub async fn get_rules(&self, scope: PlanScope) -> Result<RulesListing, StoreError> {
        let response = self
            .client
            .get(self.url("/rules/getRules"))
            .query(&[
                ("insuranceCompanyId", scope.insurance_company_id),
                ("planId", scope.plan_id),
            ])
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// `GET /cars/makes`.
    pub async fn get_makes(&self) -> Result<Vec<CarMake>, StoreError> {
        let response = self.client.get(self.url("/cars/makes")).send().await?;
        Self::parse_response(response).await
    }

    /// `GET /cars/models/{make_id}`.
    pub async fn get_models(&self, make_id: DbId) -> Result<Vec<CarModel>, StoreError> {
        let response = self
            .client
            .get(self.url(&format!("/cars/models/{make_id}")))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `GET /cars/years/{model_id}`.
    pub async fn get_years(&self, model_id: DbId) -> Result<Vec<ModelYear>, StoreError> {
        let response = self
            .client
            .get(self.url(&format!("/cars/years/{model_id}")))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// List insurance plans, optionally filtered by insurance type.
    pub async fn get_plans(
        &self,
        insurance_type: Option<InsuranceType>,
    ) -> Result<Vec<Plan>, StoreError> {
        let mut request = self.client.get(self.url("/insurance-plans/getAll"));
        if let Some(t) = insurance_type {
            request = request.query(&[("type", t.as_str())]);
        }
        let response = request.send().await?;
        let plans: PlansResponse = Self::parse_response(response).await?;
        Ok(plans.results)
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Ensure the response has a success status code, turning failures into
    /// [`StoreError::Api`] with the store's message extracted.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            let message = extract_message(&body);
            tracing::warn!(status = status.as_u16(), ?message, "Rule Store request failed");
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, StoreError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Parse a JSON body that may legitimately be empty.
    async fn parse_optional_json(
        response: reqwest::Response,
    ) -> Result<serde_json::Value, StoreError> {
        let response = Self::ensure_success(response).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text)))
    }

    async fn check_status(response: reqwest::Response) -> Result<(), StoreError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}
