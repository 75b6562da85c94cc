use crate::domain::gateway::{ProcessRequest, RegisterRequest};
use crate::domain::operation::{Operation, OperationKind};
use crate::domain::payment::{Amount, Payment, PaymentFilter, PaymentRequest};
use crate::domain::ports::{OperationStoreBox, PaymentGatewayBox, PaymentStoreBox};
use crate::error::{GatewayError, PaymentError, Result};
use tracing::{error, info};
use uuid::Uuid;

/// The main entry point for moving money through the gateway.
///
/// `PaymentOrchestrator` checks that a payment is in a state that allows the
/// requested action, performs exactly one gateway call, and records the
/// outcome. A record touched by a remote call is persisted on every exit path
/// before a fault is handed back to the caller.
pub struct PaymentOrchestrator {
    payment_store: PaymentStoreBox,
    operation_store: OperationStoreBox,
    gateway: PaymentGatewayBox,
}

impl PaymentOrchestrator {
    /// Creates a new `PaymentOrchestrator` instance.
    ///
    /// # Arguments
    ///
    /// * `payment_store` - The store for payment registrations.
    /// * `operation_store` - The store for operations applied to payments.
    /// * `gateway` - The remote processor.
    pub fn new(
        payment_store: PaymentStoreBox,
        operation_store: OperationStoreBox,
        gateway: PaymentGatewayBox,
    ) -> Self {
        Self {
            payment_store,
            operation_store,
            gateway,
        }
    }

    /// Registers a payment with the processor.
    ///
    /// This is the first step, before the user is taken to the hosted
    /// terminal page. The payment is persisted whether or not the processor
    /// accepts it; a rejected registration is stored with `success = false`
    /// and the fault is returned. A transaction id already held by another
    /// payment is not stored: the payment is kept as failed and
    /// `DuplicateTransactionId` is returned.
    pub async fn register(&self, request: PaymentRequest) -> Result<Payment> {
        info!(
            order_number = %request.order_number,
            amount = %request.amount,
            currency_code = %request.currency_code,
            redirect_url = %request.redirect_url,
            description = ?request.description,
            auto_auth = request.auto_auth,
            "netaxept-register"
        );
        request.validate().inspect_err(|e| {
            error!(
                order_number = %request.order_number,
                error = %e,
                "netaxept-register-invalid-request"
            )
        })?;
        let mut payment = Payment::new(request)?;

        let result = self
            .gateway
            .register(&RegisterRequest::from(&payment))
            .await;
        payment.outcome.record(&result);
        if let Ok(registration) = &result {
            payment.transaction_id = Some(registration.transaction_id.clone());
        }

        payment.touch();
        let stored = self
            .persist(&result, self.payment_store.store(payment.clone()))
            .await;
        if let Err(e @ PaymentError::DuplicateTransactionId(_)) = &stored {
            // The processor accepted the payment, but the id it handed out
            // belongs to another record: keep this attempt as a failure.
            payment.transaction_id = None;
            payment.outcome.success = false;
            payment.outcome.response_text = Some(e.to_string());
            payment.touch();
            self.persist(&result, self.payment_store.store(payment.clone()))
                .await?;
        }
        stored?;
        result.inspect_err(|e| {
            error!(payment_id = %payment.id, error = %e, "netaxept-register-failed")
        })?;

        info!(
            payment_id = %payment.id,
            transaction_id = ?payment.transaction_id,
            "netaxept-registered"
        );
        Ok(payment)
    }

    pub async fn auth(&self, payment_id: Uuid) -> Result<Operation> {
        self.run(payment_id, OperationKind::Auth, None).await
    }

    pub async fn sale(&self, payment_id: Uuid) -> Result<Operation> {
        self.run(payment_id, OperationKind::Sale, None).await
    }

    /// Captures an already authorized payment.
    ///
    /// Authorization is not checked locally: with pre-auth only the processor
    /// knows. Without an amount, the remaining amount is captured. The amount
    /// must not exceed what remains; the processor enforces that.
    pub async fn capture(&self, payment_id: Uuid, amount: Option<Amount>) -> Result<Operation> {
        self.run(payment_id, OperationKind::Capture, amount).await
    }

    /// Credits a payment that was captured or sold.
    ///
    /// Without an amount, the remaining amount is credited.
    pub async fn credit(&self, payment_id: Uuid, amount: Option<Amount>) -> Result<Operation> {
        self.run(payment_id, OperationKind::Credit, amount).await
    }

    /// Cancels an authorization that has not been captured.
    pub async fn annul(&self, payment_id: Uuid) -> Result<Operation> {
        self.run(payment_id, OperationKind::Annul, None).await
    }

    pub async fn payment(&self, payment_id: Uuid) -> Result<Payment> {
        self.payment_store
            .get(payment_id)
            .await?
            .ok_or(PaymentError::PaymentNotFound(payment_id))
    }

    pub async fn operations(&self, payment_id: Uuid) -> Result<Vec<Operation>> {
        self.operation_store.for_payment(payment_id).await
    }

    /// Stored payments matching `filter`, oldest first.
    pub async fn payments(&self, filter: &PaymentFilter) -> Result<Vec<Payment>> {
        let payments = self.payment_store.all().await?;
        Ok(payments.into_iter().filter(|p| filter.matches(p)).collect())
    }

    /// The payment holding `transaction_id`.
    pub async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Payment> {
        self.payment_store
            .find_by_transaction_id(transaction_id)
            .await?
            .ok_or_else(|| PaymentError::TransactionNotFound(transaction_id.to_string()))
    }

    /// Hosted payment page for a registered payment.
    pub async fn terminal_url(&self, payment_id: Uuid) -> Result<String> {
        let payment = self.payment(payment_id).await?;
        match payment.registered_transaction_id() {
            Some(transaction_id) => Ok(self.gateway.terminal_url(transaction_id)),
            None => Err(PaymentError::RegistrationNotCompleted(payment_id)),
        }
    }

    async fn run(
        &self,
        payment_id: Uuid,
        kind: OperationKind,
        amount: Option<Amount>,
    ) -> Result<Operation> {
        info!(
            %payment_id,
            operation = %kind,
            amount = ?amount.map(u64::from),
            "netaxept-operation"
        );
        let payment = self.payment(payment_id).await.inspect_err(|e| {
            error!(
                %payment_id,
                operation = %kind,
                error = %e,
                "netaxept-operation-payment-lookup-failed"
            )
        })?;
        let Some(transaction_id) = payment.registered_transaction_id() else {
            error!(
                %payment_id,
                operation = %kind,
                "netaxept-operation-payment-registration-not-complete"
            );
            return Err(PaymentError::RegistrationNotCompleted(payment_id));
        };

        let mut operation = Operation::new(payment_id, transaction_id, kind, amount);
        let result = self
            .gateway
            .process(&ProcessRequest {
                transaction_id: operation.transaction_id.clone(),
                operation: kind,
                amount,
            })
            .await;
        operation.outcome.record(&result);

        operation.touch();
        self.persist(&result, self.operation_store.store(operation.clone()))
            .await?;
        result.inspect_err(|e| {
            error!(
                %payment_id,
                operation = %kind,
                error = %e,
                "netaxept-gateway-invocation-error"
            )
        })?;

        Ok(operation)
    }

    /// Awaits the write of a record that already carries the gateway outcome.
    ///
    /// A failed write wins over a gateway fault; the fault is logged so it is
    /// not lost.
    async fn persist<T>(
        &self,
        result: &Result<T, GatewayError>,
        write: impl Future<Output = Result<()>>,
    ) -> Result<()> {
        write.await.inspect_err(|e| {
            if let Err(fault) = result {
                error!(
                    error = %e,
                    gateway_error = %fault,
                    "netaxept-persist-failed-after-fault"
                );
            } else {
                error!(error = %e, "netaxept-persist-failed");
            }
        })
    }
}
