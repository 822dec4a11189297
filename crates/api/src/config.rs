//! Application configuration loaded from environment variables.

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `DATABASE_URL` — Postgres connection string; when absent the server
///   runs on in-memory stores
/// - `CLIENT_URL` — storefront base URL the gateway redirects back to
///   (default: `"http://localhost:3000"`)
/// - `CURRENCY` — ISO 4217 code, lowercase (default: `"usd"`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub client_url: String,
    pub currency: String,
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_url: std::env::var("DATABASE_URL").ok(),
            client_url: std::env::var("CLIENT_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            currency: std::env::var("CURRENCY").unwrap_or_else(|_| "usd".to_string()),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Checkout session parameters derived from the configured client URL.
    pub fn checkout_policy(&self) -> checkout::CheckoutPolicy {
        checkout::CheckoutPolicy {
            success_url: format!("{}/checkout/success", self.client_url),
            cancel_url: format!("{}/checkout/cancel", self.client_url),
            currency: self.currency.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: None,
            client_url: "http://localhost:3000".to_string(),
            currency: "usd".to_string(),
            log_level: "info".to_string(),
        }
    }
}
