use super::operation::OperationKind;
use super::payment::{Amount, Payment};

/// Arguments of a `Register` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    pub order_number: String,
    pub amount: Amount,
    pub currency_code: String,
    pub redirect_url: String,
    pub description: Option<String>,
    pub auto_auth: bool,
}

impl From<&Payment> for RegisterRequest {
    fn from(payment: &Payment) -> Self {
        Self {
            order_number: payment.order_number.clone(),
            amount: payment.amount,
            currency_code: payment.currency_code.clone(),
            redirect_url: payment.redirect_url.clone(),
            description: payment.description.clone(),
            auto_auth: payment.auto_auth,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub transaction_id: String,
}

/// Arguments of a `Process` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRequest {
    pub transaction_id: String,
    pub operation: OperationKind,
    pub amount: Option<Amount>,
}
