//! Checkout session types exchanged with the payment gateway.

use serde::{Deserialize, Serialize};

use common::{CartId, UserId};

/// One priced line of a checkout session. `unit_amount` is in minor
/// currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLineItem {
    pub name: String,
    pub unit_amount: i64,
    pub quantity: u32,
}

/// Metadata attached to a session so the originating cart can be
/// resolved at confirmation time without re-deriving it from the live,
/// possibly since-mutated cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub user_id: UserId,
    pub cart_id: CartId,
}

/// Request to open a checkout session.
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub line_items: Vec<SessionLineItem>,
    pub success_url: String,
    pub cancel_url: String,
    pub customer_email: Option<String>,
    pub currency: String,
    pub metadata: SessionMetadata,
}

/// A freshly opened session: the id is the capability the caller holds,
/// the URL is where the buyer completes payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedSession {
    pub id: String,
    pub url: String,
}

/// Payment status as reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    Expired,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Unpaid => "unpaid",
            Self::Expired => "expired",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A session as read back from the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub payment_status: PaymentStatus,
    pub amount_total: i64,
    pub currency: String,
    pub metadata: SessionMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_status_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&PaymentStatus::Paid).unwrap(), "\"paid\"");
        assert_eq!(PaymentStatus::Expired.to_string(), "expired");
    }

    #[test]
    fn metadata_roundtrip() {
        let metadata = SessionMetadata {
            user_id: UserId::new(),
            cart_id: CartId::new(),
        };
        let json = serde_json::to_string(&metadata).unwrap();
        let back: SessionMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(metadata, back);
    }
}
