//! Application layer containing the workflow orchestration.
//!
//! This module defines the `CheckoutSequencer`, which drives a payment
//! attempt through its ordered steps, together with the registration
//! flow and the subscription read model. Everything here talks to the
//! outside world exclusively through the ports in `crate::domain::ports`.

pub mod checkout;
pub mod registration;
pub mod subscription;
