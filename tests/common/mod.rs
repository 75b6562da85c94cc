#![allow(dead_code)]

use async_trait::async_trait;
use netaxept::application::orchestrator::PaymentOrchestrator;
use netaxept::domain::gateway::{ProcessRequest, RegisterRequest, Registration};
use netaxept::domain::payment::{Amount, Payment, PaymentRequest};
use netaxept::domain::ports::{PaymentGateway, PaymentStore};
use netaxept::error::{Fault, GatewayError};
use netaxept::infrastructure::in_memory::InMemoryStore;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Script {
    register_results: VecDeque<Result<Registration, GatewayError>>,
    process_results: VecDeque<Result<(), GatewayError>>,
    register_calls: Vec<RegisterRequest>,
    process_calls: Vec<ProcessRequest>,
}

/// Scripted stand-in for the remote processor.
///
/// Queued results are returned in order; once the queue is empty
/// registrations succeed with `TX<n>` and process calls succeed.
/// Clones share the script so a test can inspect calls after handing a
/// clone to the orchestrator.
#[derive(Clone, Default)]
pub struct StubGateway {
    script: Arc<Mutex<Script>>,
}

impl StubGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_returns(&self, transaction_id: &str) {
        self.script
            .lock()
            .unwrap()
            .register_results
            .push_back(Ok(Registration {
                transaction_id: transaction_id.to_string(),
            }));
    }

    pub fn register_fails(&self, error: GatewayError) {
        self.script
            .lock()
            .unwrap()
            .register_results
            .push_back(Err(error));
    }

    pub fn process_fails(&self, error: GatewayError) {
        self.script
            .lock()
            .unwrap()
            .process_results
            .push_back(Err(error));
    }

    pub fn register_calls(&self) -> Vec<RegisterRequest> {
        self.script.lock().unwrap().register_calls.clone()
    }

    pub fn process_calls(&self) -> Vec<ProcessRequest> {
        self.script.lock().unwrap().process_calls.clone()
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn register(&self, request: &RegisterRequest) -> Result<Registration, GatewayError> {
        let mut script = self.script.lock().unwrap();
        script.register_calls.push(request.clone());
        let n = script.register_calls.len();
        script.register_results.pop_front().unwrap_or_else(|| {
            Ok(Registration {
                transaction_id: format!("TX{n}"),
            })
        })
    }

    async fn process(&self, request: &ProcessRequest) -> Result<(), GatewayError> {
        let mut script = self.script.lock().unwrap();
        script.process_calls.push(request.clone());
        script.process_results.pop_front().unwrap_or(Ok(()))
    }

    fn terminal_url(&self, transaction_id: &str) -> String {
        format!("https://terminal.test/?merchantId=1&transactionId={transaction_id}")
    }
}

pub fn orchestrator(store: &InMemoryStore, gateway: &StubGateway) -> PaymentOrchestrator {
    PaymentOrchestrator::new(
        Box::new(store.clone()),
        Box::new(store.clone()),
        Box::new(gateway.clone()),
    )
}

pub fn request(order_number: &str) -> PaymentRequest {
    PaymentRequest::new(order_number, Amount::new(100).unwrap(), "NOK", "https://x")
}

pub fn structured_fault() -> GatewayError {
    GatewayError::Fault(Fault::Structured {
        code: "14".to_string(),
        source: "Netaxept".to_string(),
        text: "Invalid amount".to_string(),
        message: "Unable to capture".to_string(),
    })
}

pub fn opaque_fault(message: &str) -> GatewayError {
    GatewayError::Fault(Fault::Opaque {
        message: message.to_string(),
    })
}

/// Stores a payment whose registration did not complete.
pub async fn failed_payment(store: &InMemoryStore) -> Payment {
    let mut payment = Payment::new(request("an-order-number")).unwrap();
    payment.transaction_id = Some("1234567890".to_string());
    payment.outcome.success = false;
    PaymentStore::store(store, payment.clone()).await.unwrap();
    payment
}

/// Stores a payment whose registration succeeded.
pub async fn registered_payment(store: &InMemoryStore, transaction_id: &str) -> Payment {
    let mut payment = Payment::new(request("an-order-number")).unwrap();
    payment.transaction_id = Some(transaction_id.to_string());
    payment.outcome.success = true;
    PaymentStore::store(store, payment.clone()).await.unwrap();
    payment
}
