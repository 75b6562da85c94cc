//! Domain layer: the payment and operation records, the outcome of a
//! gateway call, and the ports the application layer talks through.

pub mod gateway;
pub mod operation;
pub mod outcome;
pub mod payment;
pub mod ports;
