use super::outcome::Outcome;
use super::payment::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationKind {
    Auth,
    Sale,
    Capture,
    Credit,
    Annul,
}

impl OperationKind {
    /// Name the processor expects in a `ProcessRequest`.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Auth => "AUTH",
            OperationKind::Sale => "SALE",
            OperationKind::Capture => "CAPTURE",
            OperationKind::Credit => "CREDIT",
            OperationKind::Annul => "ANNUL",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A monetary action taken against a registered payment.
///
/// Written once, after the remote call has resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub id: Uuid,
    pub payment_id: Uuid,
    /// Copied from the payment when the operation is created.
    pub transaction_id: String,
    pub operation: OperationKind,
    /// `None` means the remaining balance.
    pub amount: Option<Amount>,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Operation {
    pub fn new(
        payment_id: Uuid,
        transaction_id: impl Into<String>,
        operation: OperationKind,
        amount: Option<Amount>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            payment_id,
            transaction_id: transaction_id.into(),
            operation,
            amount,
            outcome: Outcome::default(),
            created: now,
            modified: now,
        }
    }

    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.amount {
            Some(amount) => write!(f, "{} {} - {}", self.operation, amount, self.transaction_id),
            None => write!(f, "{}  - {}", self.operation, self.transaction_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_kind_serialization() {
        let json = serde_json::to_string(&OperationKind::Capture).unwrap();
        assert_eq!(json, "\"CAPTURE\"");

        let kind: OperationKind = serde_json::from_str("\"ANNUL\"").unwrap();
        assert_eq!(kind, OperationKind::Annul);
        assert_eq!(kind.to_string(), "ANNUL");
    }

    #[test]
    fn test_operation_round_trips_through_json() {
        let mut operation = Operation::new(
            Uuid::new_v4(),
            "TX1",
            OperationKind::Credit,
            Some(Amount::new(25).unwrap()),
        );
        operation.outcome = Outcome::succeeded();

        let json = serde_json::to_value(&operation).unwrap();
        assert_eq!(json["operation"], "CREDIT");
        assert_eq!(json["amount"], 25);
        assert_eq!(json["success"], true);

        let back: Operation = serde_json::from_value(json).unwrap();
        assert_eq!(back, operation);
    }
}
