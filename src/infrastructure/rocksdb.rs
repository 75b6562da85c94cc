use crate::domain::operation::Operation;
use crate::domain::payment::Payment;
use crate::domain::ports::{OperationStore, PaymentStore};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Column Family for storing payments, keyed by payment id.
pub const CF_PAYMENTS: &str = "payments";
/// Column Family for storing operations, keyed by payment id, creation time and operation id.
pub const CF_OPERATIONS: &str = "operations";
/// Column Family mapping transaction ids to the payment holding them.
pub const CF_TRANSACTION_IDS: &str = "transaction_ids";

/// A persistent store implementation using RocksDB.
///
/// Handles storage for both `Payment` and `Operation` entities using
/// separate Column Families. Operation keys are prefixed with the owning
/// payment id so a single range scan yields a payment's operations in order.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
/// Payment writes are serialized so the transaction-id check and the batch
/// that updates the index happen as one step.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    payment_writes: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_PAYMENTS, CF_OPERATIONS, CF_TRANSACTION_IDS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self {
            db: Arc::new(db),
            payment_writes: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            PaymentError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| {
        PaymentError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Serialization error: {}", e),
        )))
    })
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        PaymentError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Deserialization error: {}", e),
        )))
    })
}

fn operation_key(operation: &Operation) -> Vec<u8> {
    let mut key = Vec::with_capacity(40);
    key.extend_from_slice(operation.payment_id.as_bytes());
    // Big-endian so lexicographic order follows creation time; pre-epoch is clamped.
    let created = operation
        .created
        .timestamp_nanos_opt()
        .unwrap_or_default()
        .max(0) as u64;
    key.extend_from_slice(&created.to_be_bytes());
    key.extend_from_slice(operation.id.as_bytes());
    key
}

#[async_trait]
impl PaymentStore for RocksDBStore {
    async fn store(&self, payment: Payment) -> Result<()> {
        let payments = self.cf(CF_PAYMENTS)?;
        let index = self.cf(CF_TRANSACTION_IDS)?;
        let key = payment.id.as_bytes();
        let _guard = self.payment_writes.lock().await;

        if let Some(transaction_id) = &payment.transaction_id
            && let Some(holder) = self.db.get_cf(index, transaction_id.as_bytes())?
            && holder.as_slice() != key.as_slice()
        {
            return Err(PaymentError::DuplicateTransactionId(transaction_id.clone()));
        }

        let mut batch = WriteBatch::default();
        if let Some(bytes) = self.db.get_cf(payments, key)? {
            let previous: Payment = decode(&bytes)?;
            if let Some(old_id) = previous.transaction_id
                && payment.transaction_id.as_deref() != Some(old_id.as_str())
            {
                batch.delete_cf(index, old_id.as_bytes());
            }
        }
        if let Some(transaction_id) = &payment.transaction_id {
            batch.put_cf(index, transaction_id.as_bytes(), key);
        }
        batch.put_cf(payments, key, encode(&payment)?);
        self.db.write(batch)?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Payment>> {
        let cf = self.cf(CF_PAYMENTS)?;
        match self.db.get_cf(cf, id.as_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<Payment>> {
        let index = self.cf(CF_TRANSACTION_IDS)?;
        let Some(holder) = self.db.get_cf(index, transaction_id.as_bytes())? else {
            return Ok(None);
        };
        let id = Uuid::from_slice(&holder).map_err(|e| PaymentError::InternalError(Box::new(e)))?;
        PaymentStore::get(self, id).await
    }

    async fn all(&self) -> Result<Vec<Payment>> {
        let cf = self.cf(CF_PAYMENTS)?;

        let mut payments = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            payments.push(decode::<Payment>(&value)?);
        }
        payments.sort_by_key(|p| p.created);

        Ok(payments)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let _guard = self.payment_writes.lock().await;
        let Some(payment) = PaymentStore::get(self, id).await? else {
            return Ok(false);
        };
        let payments = self.cf(CF_PAYMENTS)?;
        let operations = self.cf(CF_OPERATIONS)?;
        let index = self.cf(CF_TRANSACTION_IDS)?;

        let mut batch = WriteBatch::default();
        for item in self.db.iterator_cf(
            operations,
            IteratorMode::From(id.as_bytes(), Direction::Forward),
        ) {
            let (key, _value) = item?;
            if !key.starts_with(id.as_bytes()) {
                break;
            }
            batch.delete_cf(operations, key);
        }
        if let Some(transaction_id) = &payment.transaction_id {
            batch.delete_cf(index, transaction_id.as_bytes());
        }
        batch.delete_cf(payments, id.as_bytes());
        self.db.write(batch)?;

        Ok(true)
    }
}

#[async_trait]
impl OperationStore for RocksDBStore {
    async fn store(&self, operation: Operation) -> Result<()> {
        let cf = self.cf(CF_OPERATIONS)?;
        self.db.put_cf(cf, operation_key(&operation), encode(&operation)?)?;
        Ok(())
    }

    async fn for_payment(&self, payment_id: Uuid) -> Result<Vec<Operation>> {
        let cf = self.cf(CF_OPERATIONS)?;
        let prefix = payment_id.as_bytes();

        let mut operations = Vec::new();
        for item in self
            .db
            .iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward))
        {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            operations.push(decode::<Operation>(&value)?);
        }

        Ok(operations)
    }
}
