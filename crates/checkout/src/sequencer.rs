//! Checkout sequencing: validate the cart, open a gateway session,
//! and reconcile stock once payment is confirmed.
//!
//! Nothing is reserved when a session is opened. Stock is validated at
//! session creation and adjusted only on confirmed payment, so two
//! buyers can race for the last unit; the loser's confirmation still
//! succeeds with stock clamped at zero.

use std::sync::Arc;

use serde::Serialize;

use common::UserId;
use domain::{Cart, CartLine, OrderSummary, Product};
use gateway::{
    CreateSession, PaymentGateway, PaymentStatus, SessionLineItem, SessionMetadata,
};
use store::{CartStore, CatalogStore};

use crate::error::{CheckoutError, Result};

/// Smallest amount, in minor currency units, the gateway will charge.
pub const MINIMUM_CHARGE_CENTS: i64 = 50;

/// Static parameters for opening gateway sessions.
#[derive(Debug, Clone)]
pub struct CheckoutPolicy {
    /// Where the gateway redirects after a completed payment.
    pub success_url: String,
    /// Where the gateway redirects after an abandoned payment.
    pub cancel_url: String,
    /// ISO 4217 currency code, lowercase.
    pub currency: String,
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        Self {
            success_url: "http://localhost:3000/checkout/success".to_string(),
            cancel_url: "http://localhost:3000/checkout/cancel".to_string(),
            currency: "usd".to_string(),
        }
    }
}

/// A freshly opened checkout session: the id to poll, the URL the
/// buyer is sent to, and the summary the session was priced from.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedCheckout {
    pub session_id: String,
    pub url: String,
    pub summary: OrderSummary,
}

/// What confirming a session produced.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConfirmationOutcome {
    /// Payment completed; stock was reconciled and the cart cleared.
    Paid { amount_total: f64, currency: String },
    /// The session has not been paid; nothing was changed.
    NotPaid { payment_status: PaymentStatus },
}

/// A session's current state as reported by the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentStatusView {
    pub session_id: String,
    pub payment_status: PaymentStatus,
    pub amount_total: f64,
    pub currency: String,
}

/// Drives the checkout flow against the stores and the payment gateway.
#[derive(Clone)]
pub struct CheckoutService {
    catalog: Arc<dyn CatalogStore>,
    carts: Arc<dyn CartStore>,
    gateway: Arc<dyn PaymentGateway>,
    policy: CheckoutPolicy,
}

impl CheckoutService {
    /// Creates a checkout service over the given collaborators.
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        carts: Arc<dyn CartStore>,
        gateway: Arc<dyn PaymentGateway>,
        policy: CheckoutPolicy,
    ) -> Self {
        Self {
            catalog,
            carts,
            gateway,
            policy,
        }
    }

    /// Prices the user's cart as it stands. A preview only; nothing is
    /// reserved.
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn order_summary(&self, user_id: UserId) -> Result<OrderSummary> {
        let (_, lines) = self.validated_lines(user_id).await?;
        Ok(OrderSummary::from_lines(&lines))
    }

    /// Validates the cart and opens a gateway session for it.
    ///
    /// Every line must reference a live product with enough stock at
    /// this moment, and the total must clear the gateway minimum. The
    /// session carries the user and cart ids so confirmation can find
    /// its way back without any server-side session table.
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn create_session(
        &self,
        user_id: UserId,
        customer_email: Option<String>,
    ) -> Result<CreatedCheckout> {
        let (cart, lines) = self.validated_lines(user_id).await?;

        let total_cents: i64 = lines
            .iter()
            .map(|(line, product)| product.price.multiply(line.quantity).cents())
            .sum();
        if total_cents < MINIMUM_CHARGE_CENTS {
            return Err(CheckoutError::BelowMinimum {
                total_cents,
                minimum_cents: MINIMUM_CHARGE_CENTS,
            });
        }

        let line_items = lines
            .iter()
            .map(|(line, product)| SessionLineItem {
                name: display_name(line, product),
                unit_amount: product.price.cents(),
                quantity: line.quantity,
            })
            .collect();

        let created = self
            .gateway
            .create_session(CreateSession {
                line_items,
                success_url: self.policy.success_url.clone(),
                cancel_url: self.policy.cancel_url.clone(),
                customer_email,
                currency: self.policy.currency.clone(),
                metadata: SessionMetadata {
                    user_id,
                    cart_id: cart.id,
                },
            })
            .await?;

        metrics::counter!("checkout_sessions_created_total").increment(1);
        metrics::histogram!("checkout_session_amount_cents").record(total_cents as f64);
        tracing::info!(session_id = %created.id, total_cents, "checkout session created");

        Ok(CreatedCheckout {
            session_id: created.id,
            url: created.url,
            summary: OrderSummary::from_lines(&lines),
        })
    }

    /// Reads a session back from the gateway and, if it was paid,
    /// records the sale: each line's stock is decremented and the cart
    /// is cleared.
    ///
    /// Reconciliation is per line and best effort. A line whose product
    /// has vanished is logged and skipped; the payment already happened,
    /// so one bad line must not fail the rest. Confirming an already
    /// confirmed session finds an empty cart and changes nothing.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_payment(&self, session_id: &str) -> Result<ConfirmationOutcome> {
        let started = std::time::Instant::now();
        let session = self.gateway.retrieve_session(session_id).await?;

        if session.payment_status != PaymentStatus::Paid {
            metrics::counter!("checkout_payments_rejected_total").increment(1);
            tracing::info!(
                session_id,
                payment_status = %session.payment_status,
                "confirmation requested for unpaid session"
            );
            return Ok(ConfirmationOutcome::NotPaid {
                payment_status: session.payment_status,
            });
        }

        let mut cart = self
            .carts
            .find_by_id(session.metadata.cart_id)
            .await?
            .ok_or(CheckoutError::SessionCartGone)?;

        for line in &cart.items {
            match self.catalog.apply_sale(line.product_id, line.quantity).await {
                Ok(product) => {
                    tracing::debug!(
                        product_id = %product.id,
                        quantity = line.quantity,
                        remaining = product.total_stock,
                        "stock reconciled"
                    );
                }
                Err(err) => {
                    tracing::warn!(
                        session_id,
                        product_id = %line.product_id,
                        error = %err,
                        "failed to reconcile stock for paid line"
                    );
                }
            }
        }

        cart.clear();
        self.carts.save(&cart).await?;

        metrics::counter!("checkout_payments_confirmed_total").increment(1);
        metrics::histogram!("checkout_confirmation_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        tracing::info!(session_id, amount_total = session.amount_total, "payment confirmed");

        Ok(ConfirmationOutcome::Paid {
            amount_total: session.amount_total as f64 / 100.0,
            currency: session.currency,
        })
    }

    /// Reports a session's payment status without side effects.
    #[tracing::instrument(skip(self))]
    pub async fn payment_status(&self, session_id: &str) -> Result<PaymentStatusView> {
        let session = self.gateway.retrieve_session(session_id).await?;
        Ok(PaymentStatusView {
            session_id: session.id,
            payment_status: session.payment_status,
            amount_total: session.amount_total as f64 / 100.0,
            currency: session.currency,
        })
    }

    /// Loads the user's cart and pairs every line with a product that
    /// exists, is in stock, and can cover the line quantity.
    async fn validated_lines(&self, user_id: UserId) -> Result<(Cart, Vec<(CartLine, Product)>)> {
        let cart = self
            .carts
            .find_by_user(user_id)
            .await?
            .filter(|cart| !cart.is_empty())
            .ok_or(CheckoutError::EmptyCart)?;

        let mut lines = Vec::with_capacity(cart.items.len());
        for line in &cart.items {
            let product = self
                .catalog
                .find_by_id(line.product_id)
                .await?
                .ok_or(CheckoutError::ProductNotFound(line.product_id))?;

            if !product.in_stock {
                return Err(CheckoutError::OutOfStock {
                    name: product.name.clone(),
                });
            }
            if line.quantity > product.total_stock {
                return Err(CheckoutError::InsufficientStock {
                    name: product.name.clone(),
                    available: product.total_stock,
                });
            }
            lines.push((line.clone(), product));
        }

        Ok((cart, lines))
    }
}

/// The name shown on the gateway's payment page, with the chosen
/// variant in parentheses.
fn display_name(line: &CartLine, product: &Product) -> String {
    match (line.colour.as_deref(), line.size.as_deref()) {
        (Some(colour), Some(size)) => format!("{} ({colour}, {size})", product.name),
        (Some(colour), None) => format!("{} ({colour})", product.name),
        (None, Some(size)) => format!("{} ({size})", product.name),
        (None, None) => product.name.clone(),
    }
}
