use thiserror::Error;

/// Errors that can occur when talking to the payment gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway does not know the session.
    #[error("Checkout session not found: {0}")]
    SessionNotFound(String),

    /// The provider call itself failed.
    #[error("Payment provider error: {0}")]
    Provider(String),
}
