use crate::error::{Fault, GatewayError};
use serde::{Deserialize, Serialize};

/// Result of the remote call as recorded on a payment or an operation.
///
/// A successful call leaves every diagnostic field empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    pub response_source: Option<String>,
    pub response_code: Option<String>,
    pub response_text: Option<String>,
    pub message: Option<String>,
}

impl Outcome {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn failed(error: &GatewayError) -> Self {
        match error {
            GatewayError::Fault(Fault::Structured {
                code,
                source,
                text,
                message,
            }) => Self {
                success: false,
                response_source: Some(source.clone()),
                response_code: Some(code.clone()),
                response_text: Some(text.clone()),
                message: Some(message.clone()),
            },
            GatewayError::Fault(Fault::Opaque { message }) | GatewayError::Transport(message) => {
                Self {
                    success: false,
                    response_text: Some(message.clone()),
                    ..Self::default()
                }
            }
        }
    }

    /// Records the result of a gateway call without consuming it.
    pub fn record<T>(&mut self, result: &Result<T, GatewayError>) {
        *self = match result {
            Ok(_) => Self::succeeded(),
            Err(e) => Self::failed(e),
        };
    }
}
