// storefront/src/gateway/mock.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{GatewayError, PaymentGateway, PaymentSession, SessionRequest, VerifiedPayment, SUCCESS_STATUS};

#[derive(Debug, Clone)]
struct MockSession {
  request: SessionRequest,
  status: String,
  paid_at: Option<DateTime<Utc>>,
}

/// In-process gateway for local runs and tests. Sessions settle immediately, except
/// amounts whose minor units end in 123 per thousand, which report `failed`.
#[derive(Default)]
pub struct MockGateway {
  sessions: Mutex<HashMap<String, MockSession>>,
  abandoned: Mutex<Vec<String>>,
  unavailable: AtomicBool,
}

impl MockGateway {
  pub fn new() -> Self {
    Self::default()
  }

  /// While set, every call fails with a transport error.
  pub fn set_unavailable(&self, unavailable: bool) {
    self.unavailable.store(unavailable, Ordering::SeqCst);
  }

  /// Overrides the status the next verification of `reference` reports.
  pub fn set_status(&self, reference: &str, status: &str) {
    if let Some(session) = self.sessions.lock().get_mut(reference) {
      session.status = status.to_string();
    }
  }

  pub fn session_request(&self, reference: &str) -> Option<SessionRequest> {
    self.sessions.lock().get(reference).map(|s| s.request.clone())
  }

  pub fn session_count(&self) -> usize {
    self.sessions.lock().len()
  }

  pub fn abandoned_references(&self) -> Vec<String> {
    self.abandoned.lock().clone()
  }

  fn check_available(&self) -> Result<(), GatewayError> {
    if self.unavailable.load(Ordering::SeqCst) {
      return Err(GatewayError::Transport("mock gateway unavailable".to_string()));
    }
    Ok(())
  }
}

#[async_trait]
impl PaymentGateway for MockGateway {
  #[instrument(name = "mock_gateway::initialize", skip_all, fields(amount_minor = request.amount_minor))]
  async fn initialize_session(&self, request: &SessionRequest) -> Result<PaymentSession, GatewayError> {
    self.check_available()?;
    if request.amount_minor <= 0 {
      return Err(GatewayError::Rejected {
        status: 400,
        message: "Amount must be greater than zero".to_string(),
      });
    }

    let reference = format!("mock_ref_{}", Uuid::new_v4().simple());
    let status = if request.amount_minor % 1000 == 123 {
      "failed"
    } else {
      SUCCESS_STATUS
    };
    self.sessions.lock().insert(
      reference.clone(),
      MockSession {
        request: request.clone(),
        status: status.to_string(),
        paid_at: None,
      },
    );
    info!(%reference, "Mock payment session opened.");
    Ok(PaymentSession {
      authorization_url: format!("https://checkout.mock.invalid/{}", reference),
      reference,
    })
  }

  #[instrument(name = "mock_gateway::verify", skip(self))]
  async fn verify_session(&self, reference: &str) -> Result<VerifiedPayment, GatewayError> {
    self.check_available()?;
    let mut sessions = self.sessions.lock();
    let session = sessions.get_mut(reference).ok_or_else(|| GatewayError::Rejected {
      status: 404,
      message: "Transaction reference not found".to_string(),
    })?;
    if session.status == SUCCESS_STATUS && session.paid_at.is_none() {
      session.paid_at = Some(Utc::now());
    }
    Ok(VerifiedPayment {
      reference: reference.to_string(),
      status: session.status.clone(),
      amount_minor: session.request.amount_minor,
      metadata: Some(session.request.metadata.clone()),
      paid_at: session.paid_at,
    })
  }

  async fn abandon_session(&self, reference: &str) -> Result<(), GatewayError> {
    self.check_available()?;
    if let Some(session) = self.sessions.lock().get_mut(reference) {
      session.status = "abandoned".to_string();
    }
    self.abandoned.lock().push(reference.to_string());
    info!(%reference, "Mock payment session abandoned.");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::gateway::SessionMetadata;

  fn request(amount_minor: i64) -> SessionRequest {
    SessionRequest {
      email: "buyer@example.com".to_string(),
      amount_minor,
      metadata: SessionMetadata::new(Uuid::new_v4(), None, &[]).unwrap(),
      callback_url: "http://localhost:5173/payment/callback".to_string(),
    }
  }

  #[tokio::test]
  async fn sessions_settle_unless_amount_hits_failure_pattern() {
    let gateway = MockGateway::new();
    let ok = gateway.initialize_session(&request(20_000)).await.unwrap();
    let failing = gateway.initialize_session(&request(5_123)).await.unwrap();

    let verified = gateway.verify_session(&ok.reference).await.unwrap();
    assert!(verified.is_successful());
    assert_eq!(verified.amount_minor, 20_000);
    assert!(verified.paid_at.is_some());

    let rejected = gateway.verify_session(&failing.reference).await.unwrap();
    assert_eq!(rejected.status, "failed");
    assert!(rejected.paid_at.is_none());
  }

  #[tokio::test]
  async fn zero_amount_and_unknown_reference_are_rejected() {
    let gateway = MockGateway::new();
    assert!(matches!(
      gateway.initialize_session(&request(0)).await,
      Err(GatewayError::Rejected { status: 400, .. })
    ));
    assert!(matches!(
      gateway.verify_session("nope").await,
      Err(GatewayError::Rejected { status: 404, .. })
    ));
  }

  #[tokio::test]
  async fn abandon_marks_session() {
    let gateway = MockGateway::new();
    let session = gateway.initialize_session(&request(1_000)).await.unwrap();
    gateway.abandon_session(&session.reference).await.unwrap();

    assert_eq!(gateway.abandoned_references(), vec![session.reference.clone()]);
    assert_eq!(gateway.verify_session(&session.reference).await.unwrap().status, "abandoned");
  }

  #[tokio::test]
  async fn set_status_overrides_reported_status() {
    let gateway = MockGateway::new();
    let session = gateway.initialize_session(&request(2_500)).await.unwrap();
    gateway.set_status(&session.reference, "reversed");

    let verified = gateway.verify_session(&session.reference).await.unwrap();
    assert_eq!(verified.status, "reversed");
    assert!(!verified.is_successful());
    assert!(verified.paid_at.is_none());
  }

  #[tokio::test]
  async fn unavailable_gateway_fails_with_transport_error() {
    let gateway = MockGateway::new();
    gateway.set_unavailable(true);
    assert!(matches!(
      gateway.initialize_session(&request(1_000)).await,
      Err(GatewayError::Transport(_))
    ));
  }
}
