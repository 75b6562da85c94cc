//! Netaxept payment gateway integration.
//!
//! Registers payments with the Netaxept processor and applies `AUTH`,
//! `SALE`, `CAPTURE`, `CREDIT` and `ANNUL` operations to them, keeping a
//! persisted record of every attempt and its outcome.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
