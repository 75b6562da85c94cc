use super::outcome::Outcome;
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const ORDER_NUMBER_MAX_LEN: usize = 32;
pub const DESCRIPTION_MAX_LEN: usize = 4000;

/// A positive amount in the smallest currency unit (e.g. øre for NOK).
///
/// Zero is rejected on construction, so holding an `Amount` means the value
/// can be sent to the processor as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Amount(u64);

impl Amount {
    pub fn new(value: u64) -> Result<Self> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(PaymentError::ValidationError(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for Amount {
    type Error = PaymentError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for u64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Input for registering a new payment with the processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Caller-chosen order reference (max 32 characters).
    pub order_number: String,
    pub amount: Amount,
    /// ISO 4217 currency code, e.g. `NOK`.
    pub currency_code: String,
    /// Where the hosted terminal sends the user afterwards.
    pub redirect_url: String,
    pub description: Option<String>,
    /// Authorize automatically once the user completes the terminal step.
    pub auto_auth: bool,
}

impl PaymentRequest {
    pub fn new(
        order_number: impl Into<String>,
        amount: Amount,
        currency_code: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            order_number: order_number.into(),
            amount,
            currency_code: currency_code.into(),
            redirect_url: redirect_url.into(),
            description: None,
            auto_auth: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_auto_auth(mut self, auto_auth: bool) -> Self {
        self.auto_auth = auto_auth;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let order_len = self.order_number.chars().count();
        if order_len == 0 || order_len > ORDER_NUMBER_MAX_LEN {
            return Err(PaymentError::ValidationError(format!(
                "order_number must be 1 to {ORDER_NUMBER_MAX_LEN} characters"
            )));
        }
        if self.currency_code.len() != 3
            || !self.currency_code.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(PaymentError::ValidationError(
                "currency_code must be a 3 letter code".to_string(),
            ));
        }
        if self.redirect_url.trim().is_empty() {
            return Err(PaymentError::ValidationError(
                "redirect_url must not be empty".to_string(),
            ));
        }
        if let Some(description) = &self.description
            && description.chars().count() > DESCRIPTION_MAX_LEN
        {
            return Err(PaymentError::ValidationError(format!(
                "description must be at most {DESCRIPTION_MAX_LEN} characters"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentState {
    Registered,
    RegistrationFailed,
}

/// One registration attempt with the processor.
///
/// Failed registrations are kept too; they may have no transaction id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub transaction_id: Option<String>,
    pub order_number: String,
    pub amount: Amount,
    pub currency_code: String,
    pub description: Option<String>,
    pub redirect_url: String,
    pub auto_auth: bool,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Payment {
    /// Builds an unsaved payment from a validated request.
    pub fn new(request: PaymentRequest) -> Result<Self> {
        request.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            transaction_id: None,
            order_number: request.order_number,
            amount: request.amount,
            currency_code: request.currency_code.to_ascii_uppercase(),
            description: request.description,
            redirect_url: request.redirect_url,
            auto_auth: request.auto_auth,
            outcome: Outcome::default(),
            created: now,
            modified: now,
        })
    }

    pub fn state(&self) -> PaymentState {
        match (&self.transaction_id, self.outcome.success) {
            (Some(_), true) => PaymentState::Registered,
            _ => PaymentState::RegistrationFailed,
        }
    }

    /// The transaction id, if registration completed.
    pub fn registered_transaction_id(&self) -> Option<&str> {
        match self.state() {
            PaymentState::Registered => self.transaction_id.as_deref(),
            PaymentState::RegistrationFailed => None,
        }
    }

    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }
}

impl fmt::Display for Payment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} - {}",
            self.amount,
            self.currency_code,
            self.transaction_id.as_deref().unwrap_or("-")
        )
    }
}

/// Narrows a listing of stored payments. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentFilter {
    pub success: Option<bool>,
    /// Compared ignoring case.
    pub currency_code: Option<String>,
    /// Case-insensitive substring of the order number or transaction id.
    pub search: Option<String>,
}

impl PaymentFilter {
    pub fn matches(&self, payment: &Payment) -> bool {
        if let Some(success) = self.success
            && payment.outcome.success != success
        {
            return false;
        }
        if let Some(currency_code) = &self.currency_code
            && !payment.currency_code.eq_ignore_ascii_case(currency_code)
        {
            return false;
        }
        match &self.search {
            Some(term) => {
                let term = term.to_lowercase();
                payment.order_number.to_lowercase().contains(&term)
                    || payment
                        .transaction_id
                        .as_deref()
                        .is_some_and(|tx| tx.to_lowercase().contains(&term))
            }
            None => true,
        }
    }
}
