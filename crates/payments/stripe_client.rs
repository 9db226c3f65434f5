use std::time::Duration;

use anyhow::Result;
use reqwest::{
    StatusCode,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::Deserialize;
use tracing::{debug, error};

use crate::domain::value_objects::enums::payment_intent_statuses::PaymentIntentStatus;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Minimal Stripe client built on reqwest.
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    api_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StripeCustomer {
    pub id: String,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StripePaymentIntent {
    pub id: String,
    pub client_secret: Option<String>,
    pub status: PaymentIntentStatus,
    pub amount: i64,
    #[serde(default)]
    pub amount_received: i64,
    pub currency: String,
    pub customer: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeEphemeralKey {
    secret: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorDetails,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetails {
    #[serde(rename = "type")]
    type_: Option<String>,
    code: Option<String>,
    message: Option<String>,
    param: Option<String>,
    decline_code: Option<String>,
}

impl StripeClient {
    pub fn new(secret_key: String, api_version: String, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            secret_key,
            api_version,
        })
    }

    async fn ensure_success(
        resp: reqwest::Response,
        context: &str,
    ) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let request_id = resp
            .headers()
            .get("request-id")
            .or_else(|| resp.headers().get("stripe-request-id"))
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let details = serde_json::from_str::<StripeErrorEnvelope>(&body)
            .ok()
            .map(|envelope| envelope.error);

        error!(
            status = %status,
            stripe_request_id = ?request_id,
            stripe_error_type = ?details.as_ref().and_then(|d| d.type_.as_deref()),
            stripe_error_code = ?details.as_ref().and_then(|d| d.code.as_deref()),
            stripe_error_param = ?details.as_ref().and_then(|d| d.param.as_deref()),
            stripe_error_message = ?details.as_ref().and_then(|d| d.message.as_deref()),
            stripe_decline_code = ?details.as_ref().and_then(|d| d.decline_code.as_deref()),
            response_body = %body,
            context = %context,
            "stripe api request failed"
        );

        anyhow::bail!(
            "Stripe API request failed: {} (status {}, request_id={:?})",
            context,
            status,
            request_id
        );
    }

    /// Creates an ephemeral key so the mobile SDK can act on behalf of the customer.
    pub async fn create_ephemeral_key(&self, customer_id: &str) -> Result<String> {
        // https://stripe.com/docs/payments/accept-a-payment?platform=react-native
        let body = [("customer", customer_id.to_string())];

        let resp = self
            .http
            .post(format!("{STRIPE_API_BASE}/ephemeral_keys"))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("Stripe-Version", &self.api_version)
            .form(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create ephemeral key").await?;

        let parsed: StripeEphemeralKey = resp.json().await?;
        Ok(parsed.secret)
    }

    /// Returns `None` when Stripe has no customer with this id.
    pub async fn retrieve_customer(&self, customer_id: &str) -> Result<Option<StripeCustomer>> {
        // https://stripe.com/docs/api/customers/retrieve
        let resp = self
            .http
            .get(format!("{STRIPE_API_BASE}/customers/{customer_id}"))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            debug!(%customer_id, "stripe customer not found");
            return Ok(None);
        }
        let resp = Self::ensure_success(resp, "retrieve customer").await?;

        let customer: StripeCustomer = resp.json().await?;
        Ok(Some(customer))
    }

    pub async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
        customer_id: &str,
        idempotency_key: &str,
    ) -> Result<StripePaymentIntent> {
        // https://stripe.com/docs/api/payment_intents/create
        let body = [
            ("amount", amount.to_string()),
            ("currency", currency.to_string()),
            ("customer", customer_id.to_string()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
        ];

        let resp = self
            .http
            .post(format!("{STRIPE_API_BASE}/payment_intents"))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("Idempotency-Key", idempotency_key)
            .form(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create payment intent").await?;

        let intent: StripePaymentIntent = resp.json().await?;
        Ok(intent)
    }

    /// Returns `None` when Stripe has no payment intent with this id.
    pub async fn retrieve_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<StripePaymentIntent>> {
        // https://stripe.com/docs/api/payment_intents/retrieve
        let resp = self
            .http
            .get(format!("{STRIPE_API_BASE}/payment_intents/{payment_intent_id}"))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            debug!(%payment_intent_id, "stripe payment intent not found");
            return Ok(None);
        }
        let resp = Self::ensure_success(resp, "retrieve payment intent").await?;

        let intent: StripePaymentIntent = resp.json().await?;
        Ok(Some(intent))
    }

    pub async fn cancel_payment_intent(&self, payment_intent_id: &str) -> Result<()> {
        // https://stripe.com/docs/api/payment_intents/cancel
        let body = [("cancellation_reason", "abandoned".to_string())];

        let resp = self
            .http
            .post(format!(
                "{STRIPE_API_BASE}/payment_intents/{payment_intent_id}/cancel"
            ))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&body)
            .send()
            .await?;
        Self::ensure_success(resp, "cancel payment intent").await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_intent_payload_is_parsed() {
        let payload = r#"{
            "id": "pi_3MtwBwLkdIwHu7ix28a3tqPa",
            "object": "payment_intent",
            "amount": 2000,
            "amount_received": 2000,
            "client_secret": "pi_3MtwBwLkdIwHu7ix28a3tqPa_secret_YrKJUKribcBjcG8HVhfZluoGH",
            "currency": "xof",
            "customer": "cus_NffrFeUfNV2Hib",
            "status": "succeeded"
        }"#;

        let intent: StripePaymentIntent = serde_json::from_str(payload).unwrap();
        assert_eq!(intent.id, "pi_3MtwBwLkdIwHu7ix28a3tqPa");
        assert_eq!(intent.amount_received, 2000);
        assert!(intent.status.is_succeeded());
        assert_eq!(intent.customer.as_deref(), Some("cus_NffrFeUfNV2Hib"));
    }

    #[test]
    fn missing_amount_received_defaults_to_zero() {
        let payload = r#"{
            "id": "pi_1",
            "amount": 500,
            "client_secret": null,
            "currency": "xof",
            "customer": null,
            "status": "requires_payment_method"
        }"#;

        let intent: StripePaymentIntent = serde_json::from_str(payload).unwrap();
        assert_eq!(intent.amount_received, 0);
        assert_eq!(intent.status, PaymentIntentStatus::RequiresPaymentMethod);
    }

    #[test]
    fn deleted_customer_is_flagged() {
        let customer: StripeCustomer =
            serde_json::from_str(r#"{"id": "cus_1", "object": "customer", "deleted": true}"#)
                .unwrap();
        assert!(customer.deleted);
        assert_eq!(customer.id, "cus_1");
    }
}
