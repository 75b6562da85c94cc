use super::gateway::{ProcessRequest, RegisterRequest, Registration};
use super::operation::Operation;
use super::payment::Payment;
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Creates or replaces the payment. Fails if its transaction id is
    /// already held by a different payment.
    async fn store(&self, payment: Payment) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Payment>>;
    async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<Payment>>;
    async fn all(&self) -> Result<Vec<Payment>>;
    /// Removes the payment together with its operations.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait OperationStore: Send + Sync {
    async fn store(&self, operation: Operation) -> Result<()>;
    /// Operations of one payment, oldest first.
    async fn for_payment(&self, payment_id: Uuid) -> Result<Vec<Operation>>;
}

/// The remote payment processor. Every call is exactly one remote request.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn register(&self, request: &RegisterRequest) -> Result<Registration, GatewayError>;
    async fn process(&self, request: &ProcessRequest) -> Result<(), GatewayError>;
    /// Hosted terminal page the end user is sent to for a registered transaction.
    fn terminal_url(&self, transaction_id: &str) -> String;
}

pub type PaymentStoreBox = Box<dyn PaymentStore>;
pub type OperationStoreBox = Box<dyn OperationStore>;
pub type PaymentGatewayBox = Box<dyn PaymentGateway>;

pub type PaymentStoreFactory = Box<dyn Fn() -> PaymentStoreBox + Send + Sync>;
pub type OperationStoreFactory = Box<dyn Fn() -> OperationStoreBox + Send + Sync>;
