//! Payment gateway adapter.
//!
//! The gateway owns checkout sessions: the backend opens one with priced
//! line items and metadata, hands the buyer the redirect URL, and later
//! reads the session back to learn whether it was paid. Amounts at this
//! boundary are integers in minor currency units.

pub mod error;
pub mod session;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

pub use error::GatewayError;
pub use session::{
    CheckoutSession, CreateSession, CreatedSession, PaymentStatus, SessionLineItem,
    SessionMetadata,
};

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Trait for payment gateway operations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Opens a checkout session and returns its id and redirect URL.
    async fn create_session(&self, request: CreateSession) -> Result<CreatedSession>;

    /// Retrieves a session by id, including its payment status.
    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession>;
}

#[derive(Debug, Default)]
struct InMemoryGatewayState {
    sessions: HashMap<String, CheckoutSession>,
    next_id: u32,
    fail_on_create: bool,
}

/// In-memory payment gateway.
///
/// The default collaborator for database-less runs and tests; payment
/// completion is driven explicitly through [`mark_paid`].
///
/// [`mark_paid`]: InMemoryPaymentGateway::mark_paid
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<RwLock<InMemoryGatewayState>>,
}

impl InMemoryPaymentGateway {
    /// Creates a new in-memory payment gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to fail on the next create call.
    pub fn set_fail_on_create(&self, fail: bool) {
        self.state.write().unwrap().fail_on_create = fail;
    }

    /// Marks a session as paid, as the buyer completing payment would.
    pub fn mark_paid(&self, session_id: &str) -> bool {
        let mut state = self.state.write().unwrap();
        match state.sessions.get_mut(session_id) {
            Some(session) => {
                session.payment_status = PaymentStatus::Paid;
                true
            }
            None => false,
        }
    }

    /// Marks a session as expired.
    pub fn mark_expired(&self, session_id: &str) -> bool {
        let mut state = self.state.write().unwrap();
        match state.sessions.get_mut(session_id) {
            Some(session) => {
                session.payment_status = PaymentStatus::Expired;
                true
            }
            None => false,
        }
    }

    /// Returns the number of open sessions.
    pub fn session_count(&self) -> usize {
        self.state.read().unwrap().sessions.len()
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn create_session(&self, request: CreateSession) -> Result<CreatedSession> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_create {
            return Err(GatewayError::Provider("session creation declined".to_string()));
        }

        state.next_id += 1;
        let session_id = format!("cs_{:06}", state.next_id);
        let amount_total = request
            .line_items
            .iter()
            .map(|item| item.unit_amount * i64::from(item.quantity))
            .sum();

        let session = CheckoutSession {
            id: session_id.clone(),
            payment_status: PaymentStatus::Unpaid,
            amount_total,
            currency: request.currency.clone(),
            metadata: request.metadata,
        };
        state.sessions.insert(session_id.clone(), session);

        Ok(CreatedSession {
            id: session_id.clone(),
            url: format!("https://pay.invalid/session/{session_id}"),
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession> {
        let state = self.state.read().unwrap();
        state
            .sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| GatewayError::SessionNotFound(session_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{CartId, UserId};

    fn request() -> CreateSession {
        CreateSession {
            line_items: vec![
                SessionLineItem {
                    name: "Widget (red, md)".to_string(),
                    unit_amount: 1000,
                    quantity: 2,
                },
                SessionLineItem {
                    name: "Gadget".to_string(),
                    unit_amount: 2500,
                    quantity: 1,
                },
            ],
            success_url: "https://shop.example/checkout/success".to_string(),
            cancel_url: "https://shop.example/checkout/cancel".to_string(),
            customer_email: Some("buyer@example.com".to_string()),
            currency: "usd".to_string(),
            metadata: SessionMetadata {
                user_id: UserId::new(),
                cart_id: CartId::new(),
            },
        }
    }

    #[tokio::test]
    async fn create_and_retrieve() {
        let gateway = InMemoryPaymentGateway::new();

        let created = gateway.create_session(request()).await.unwrap();
        assert!(created.id.starts_with("cs_"));
        assert_eq!(gateway.session_count(), 1);

        let session = gateway.retrieve_session(&created.id).await.unwrap();
        assert_eq!(session.payment_status, PaymentStatus::Unpaid);
        assert_eq!(session.amount_total, 4500);
        assert_eq!(session.currency, "usd");
    }

    #[tokio::test]
    async fn mark_paid_flips_status() {
        let gateway = InMemoryPaymentGateway::new();
        let created = gateway.create_session(request()).await.unwrap();

        assert!(gateway.mark_paid(&created.id));
        let session = gateway.retrieve_session(&created.id).await.unwrap();
        assert_eq!(session.payment_status, PaymentStatus::Paid);

        assert!(!gateway.mark_paid("cs_999999"));
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let gateway = InMemoryPaymentGateway::new();
        let result = gateway.retrieve_session("cs_000000").await;
        assert!(matches!(result, Err(GatewayError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn fail_on_create() {
        let gateway = InMemoryPaymentGateway::new();
        gateway.set_fail_on_create(true);

        let result = gateway.create_session(request()).await;
        assert!(matches!(result, Err(GatewayError::Provider(_))));
        assert_eq!(gateway.session_count(), 0);
    }

    #[tokio::test]
    async fn sequential_session_ids() {
        let gateway = InMemoryPaymentGateway::new();
        let first = gateway.create_session(request()).await.unwrap();
        let second = gateway.create_session(request()).await.unwrap();

        assert_eq!(first.id, "cs_000001");
        assert_eq!(second.id, "cs_000002");
    }
}
