//! Core types for Solstice Labs.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod payment;
pub mod status;

pub use id::*;
pub use money::{cents_to_amount, format_usd_cents};
pub use payment::PaymentMethod;
pub use status::{OrderStatus, TransitionError, TransitionRule, allowed_transition};
