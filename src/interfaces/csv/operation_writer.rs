use crate::domain::operation::Operation;
use crate::error::Result;
use std::io::Write;

const HEADER: [&str; 11] = [
    "id",
    "payment_id",
    "transaction_id",
    "operation",
    "amount",
    "success",
    "response_source",
    "response_code",
    "response_text",
    "message",
    "created",
];

/// Writes the operation audit trail of a payment as CSV.
pub struct OperationWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OperationWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes the header followed by one row per operation, then flushes.
    pub fn write_operations<'a>(
        &mut self,
        operations: impl IntoIterator<Item = &'a Operation>,
    ) -> Result<()> {
        self.writer.write_record(HEADER)?;
        for operation in operations {
            let outcome = &operation.outcome;
            self.writer.write_record([
                operation.id.to_string(),
                operation.payment_id.to_string(),
                operation.transaction_id.clone(),
                operation.operation.to_string(),
                operation.amount.map(|a| a.to_string()).unwrap_or_default(),
                outcome.success.to_string(),
                outcome.response_source.clone().unwrap_or_default(),
                outcome.response_code.clone().unwrap_or_default(),
                outcome.response_text.clone().unwrap_or_default(),
                outcome.message.clone().unwrap_or_default(),
                operation.created.to_rfc3339(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
