use crate::domain::operation::Operation;
use crate::domain::payment::Payment;
use crate::domain::ports::{OperationStore, PaymentStore};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct State {
    payments: HashMap<Uuid, Payment>,
    /// Unique index over the non-null transaction ids.
    transaction_ids: HashMap<String, Uuid>,
    operations: HashMap<Uuid, Vec<Operation>>,
}

/// A thread-safe in-memory store for payments and their operations.
///
/// Implements both store ports over one shared state so that deleting a
/// payment also removes its operations. `Clone` shares the state.
/// Ideal for testing or short-lived processes where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryStore {
    async fn store(&self, payment: Payment) -> Result<()> {
        let mut state = self.state.write().await;

        if let Some(transaction_id) = &payment.transaction_id
            && let Some(holder) = state.transaction_ids.get(transaction_id)
            && *holder != payment.id
        {
            return Err(PaymentError::DuplicateTransactionId(transaction_id.clone()));
        }

        let previous_transaction_id = state
            .payments
            .get(&payment.id)
            .and_then(|previous| previous.transaction_id.clone());
        if let Some(old_id) = previous_transaction_id {
            state.transaction_ids.remove(&old_id);
        }
        if let Some(transaction_id) = &payment.transaction_id {
            state
                .transaction_ids
                .insert(transaction_id.clone(), payment.id);
        }
        state.payments.insert(payment.id, payment);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Payment>> {
        let state = self.state.read().await;
        Ok(state.payments.get(&id).cloned())
    }

    async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<Payment>> {
        let state = self.state.read().await;
        Ok(state
            .transaction_ids
            .get(transaction_id)
            .and_then(|id| state.payments.get(id))
            .cloned())
    }

    async fn all(&self) -> Result<Vec<Payment>> {
        let state = self.state.read().await;
        let mut payments: Vec<Payment> = state.payments.values().cloned().collect();
        payments.sort_by_key(|p| p.created);
        Ok(payments)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let Some(payment) = state.payments.remove(&id) else {
            return Ok(false);
        };
        if let Some(transaction_id) = &payment.transaction_id {
            state.transaction_ids.remove(transaction_id);
        }
        state.operations.remove(&id);
        Ok(true)
    }
}

#[async_trait]
impl OperationStore for InMemoryStore {
    async fn store(&self, operation: Operation) -> Result<()> {
        let mut state = self.state.write().await;
        let operations = state.operations.entry(operation.payment_id).or_default();
        match operations.iter_mut().find(|o| o.id == operation.id) {
            Some(existing) => *existing = operation,
            None => operations.push(operation),
        }
        Ok(())
    }

    async fn for_payment(&self, payment_id: Uuid) -> Result<Vec<Operation>> {
        let state = self.state.read().await;
        let mut operations = state
            .operations
            .get(&payment_id)
            .cloned()
            .unwrap_or_default();
        operations.sort_by_key(|o| o.created);
        Ok(operations)
    }
}
