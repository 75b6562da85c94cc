use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// A rejection returned by the remote processor.
///
/// Netaxept either answers with a `BBSException` carrying the full response
/// result, or with some other fault that only has a message. The distinction
/// is made once, where the response is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    Structured {
        code: String,
        source: String,
        text: String,
        message: String,
    },
    Opaque {
        message: String,
    },
}

impl Fault {
    pub fn message(&self) -> &str {
        match self {
            Fault::Structured { message, .. } | Fault::Opaque { message } => message,
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::Structured {
                code,
                source,
                text,
                message,
            } => write!(f, "[{source} {code}] {text}: {message}"),
            Fault::Opaque { message } => write!(f, "{message}"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Gateway fault: {0}")]
    Fault(Fault),
    #[error("Transport error: {0}")]
    Transport(String),
}

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Payment registration not completed for payment {0}")]
    RegistrationNotCompleted(Uuid),
    #[error("Payment {0} not found")]
    PaymentNotFound(Uuid),
    #[error("Transaction {0} not found")]
    TransactionNotFound(String),
    #[error("Transaction id {0} is already held by another payment")]
    DuplicateTransactionId(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = PaymentError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_fault_display() {
        let fault = Fault::Structured {
            code: "14".to_string(),
            source: "Netaxept".to_string(),
            text: "Invalid amount".to_string(),
            message: "Unable to capture".to_string(),
        };
        assert_eq!(
            fault.to_string(),
            "[Netaxept 14] Invalid amount: Unable to capture"
        );
        assert_eq!(fault.message(), "Unable to capture");
    }

    #[test]
    fn test_gateway_error_is_transparent() {
        let err: PaymentError = GatewayError::Fault(Fault::Opaque {
            message: "Transaction not found".to_string(),
        })
        .into();
        assert_eq!(err.to_string(), "Gateway fault: Transaction not found");
    }
}
