// storefront/src/gateway/paystack.rs

//! Reqwest-backed Paystack adapter. Owns transport details only: bearer auth, timeout,
//! envelope decoding and mapping of non-2xx answers.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{instrument, warn};

use super::{GatewayError, PaymentGateway, PaymentSession, SessionMetadata, SessionRequest, VerifiedPayment};

/// Every Paystack response is wrapped in `{status, message, data}`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
  status: bool,
  #[serde(default)]
  message: String,
  data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct InitializeData {
  authorization_url: String,
  reference: String,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
  status: String,
  reference: String,
  amount: i64,
  #[serde(default)]
  metadata: Value,
  #[serde(default)]
  paid_at: Option<DateTime<Utc>>,
}

pub struct PaystackGateway {
  client: Client,
  base_url: Url,
  secret_key: String,
}

impl PaystackGateway {
  pub fn new(base_url: &str, secret_key: String, timeout: Duration) -> Result<Self, GatewayError> {
    let mut base_url =
      Url::parse(base_url).map_err(|e| GatewayError::Configuration(format!("invalid PAYSTACK_BASE_URL: {}", e)))?;
    if base_url.cannot_be_a_base() {
      return Err(GatewayError::Configuration(
        "PAYSTACK_BASE_URL must be an http(s) URL".to_string(),
      ));
    }
    if !base_url.path().ends_with('/') {
      let path = format!("{}/", base_url.path());
      base_url.set_path(&path);
    }
    let client = Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| GatewayError::Configuration(e.to_string()))?;
    Ok(Self {
      client,
      base_url,
      secret_key,
    })
  }

  fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
    let mut url = self.base_url.clone();
    url
      .path_segments_mut()
      .map_err(|_| GatewayError::Configuration("PAYSTACK_BASE_URL cannot be a base".to_string()))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }
}

#[async_trait]
impl PaymentGateway for PaystackGateway {
  #[instrument(name = "paystack::initialize", skip_all, fields(amount_minor = request.amount_minor))]
  async fn initialize_session(&self, request: &SessionRequest) -> Result<PaymentSession, GatewayError> {
    let url = self.endpoint(&["transaction", "initialize"])?;
    let body = json!({
      "email": request.email,
      "amount": request.amount_minor,
      "metadata": request.metadata,
      "callback_url": request.callback_url,
    });
    let response = self
      .client
      .post(url)
      .bearer_auth(&self.secret_key)
      .json(&body)
      .send()
      .await
      .map_err(map_transport_error)?;

    let status = response.status();
    let bytes = response.bytes().await.map_err(map_transport_error)?;
    if !status.is_success() {
      return Err(map_status_error(status, &bytes, "Payment initialization failed"));
    }
    let data: InitializeData = decode_envelope(&bytes)?;
    tracing::info!(reference = %data.reference, "Payment session initialized.");
    Ok(PaymentSession {
      reference: data.reference,
      authorization_url: data.authorization_url,
    })
  }

  #[instrument(name = "paystack::verify", skip(self))]
  async fn verify_session(&self, reference: &str) -> Result<VerifiedPayment, GatewayError> {
    let url = self.endpoint(&["transaction", "verify", reference])?;
    let response = self
      .client
      .get(url)
      .bearer_auth(&self.secret_key)
      .send()
      .await
      .map_err(map_transport_error)?;

    let status = response.status();
    let bytes = response.bytes().await.map_err(map_transport_error)?;
    if !status.is_success() {
      return Err(map_status_error(status, &bytes, "Payment verification failed"));
    }
    let data: VerifyData = decode_envelope(&bytes)?;
    Ok(verified_payment(data))
  }
}

fn decode_envelope<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T, GatewayError> {
  let envelope: Envelope<T> =
    serde_json::from_slice(bytes).map_err(|e| GatewayError::Decode(format!("invalid Paystack JSON payload: {}", e)))?;
  if !envelope.status {
    return Err(GatewayError::Rejected {
      status: StatusCode::OK.as_u16(),
      message: envelope.message,
    });
  }
  envelope
    .data
    .ok_or_else(|| GatewayError::Decode("Paystack response has no data".to_string()))
}

/// Paystack sends `""` for metadata it did not receive, so anything that is not our own
/// shape is dropped.
fn verified_payment(data: VerifyData) -> VerifiedPayment {
  let metadata = match data.metadata {
    Value::Object(_) => match serde_json::from_value::<SessionMetadata>(data.metadata) {
      Ok(metadata) => Some(metadata),
      Err(e) => {
        warn!(reference = %data.reference, error = %e, "Ignoring unrecognised payment metadata.");
        None
      }
    },
    _ => None,
  };
  VerifiedPayment {
    reference: data.reference,
    status: data.status,
    amount_minor: data.amount,
    metadata,
    paid_at: data.paid_at,
  }
}

fn map_transport_error(error: reqwest::Error) -> GatewayError {
  if error.is_timeout() {
    GatewayError::Transport(format!("payment gateway timed out: {}", error))
  } else {
    GatewayError::Transport(error.to_string())
  }
}

fn map_status_error(status: StatusCode, body: &[u8], fallback: &str) -> GatewayError {
  let message = serde_json::from_slice::<Value>(body)
    .ok()
    .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
    .filter(|m| !m.is_empty())
    .unwrap_or_else(|| fallback.to_string());
  GatewayError::Rejected {
    status: status.as_u16(),
    message,
  }
}
