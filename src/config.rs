//! Connection settings for the Netaxept gateway.

use crate::error::{PaymentError, Result};
use reqwest::Url;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://epayment-test.bbs.no/netaxept.svc";
pub const DEFAULT_TERMINAL: &str = "https://epayment-test.bbs.no/Terminal/default.aspx";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Credentials and endpoints handed to the gateway client at construction.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub merchant_id: String,
    pub token: String,
    /// SOAP service endpoint.
    pub endpoint: Url,
    /// Hosted payment page.
    pub terminal: Url,
    /// Upper bound for a single remote call.
    pub timeout: Duration,
}

impl GatewayConfig {
    /// Config against the Netaxept test environment.
    pub fn new(merchant_id: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            merchant_id: merchant_id.into(),
            token: token.into(),
            endpoint: parse_url("endpoint", DEFAULT_ENDPOINT)?,
            terminal: parse_url("terminal", DEFAULT_TERMINAL)?,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.endpoint = parse_url("endpoint", endpoint)?;
        Ok(self)
    }

    pub fn with_terminal(mut self, terminal: &str) -> Result<Self> {
        self.terminal = parse_url("terminal", terminal)?;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn parse_url(name: &str, value: &str) -> Result<Url> {
    Url::parse(value)
        .map_err(|e| PaymentError::ConfigError(format!("invalid {name} url {value:?}: {e}")))
}
