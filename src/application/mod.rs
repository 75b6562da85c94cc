//! Application layer containing the payment operation state machine.
//!
//! This module defines the `PaymentOrchestrator` which acts as the primary
//! entry point for registering payments and applying operations to them.
//! It decides which operations are legal, calls the gateway once per
//! request, and persists the outcome before returning it.

pub mod orchestrator;
