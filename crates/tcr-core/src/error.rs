//! # Error Types — Structured Error Hierarchy
//!
//! Core error types shared by every crate in the stack. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Ledger errors carry the account, the required amount and the amount
//!   that was actually available.
//! - [`CallError`] is the error crossing a collaborator boundary (registry
//!   → arbitrator, arbitrator → registry, registry → hooks). It carries the
//!   component, the operation and the rejection reason, much like a revert
//!   string.

use thiserror::Error;

use crate::capped::Amount;

/// Top-level error type for core primitives.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A hex string could not be decoded.
    #[error("invalid hex {input:?}: {reason}")]
    InvalidHex {
        /// The rejected input.
        input: String,
        /// Why decoding failed.
        reason: String,
    },

    /// A timestamp could not be constructed or parsed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A mutator was entered again before the previous call returned.
    #[error("reentrant call into {component} rejected")]
    Reentrancy {
        /// The guarded component.
        component: &'static str,
    },
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Errors raised by a fungible asset ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The debited account does not hold enough funds.
    #[error("insufficient balance for {account}: required {required}, available {available}")]
    InsufficientBalance {
        /// The debited account (hex).
        account: String,
        /// The amount requested.
        required: Amount,
        /// The balance at the time of the call.
        available: Amount,
    },

    /// The spender has not been approved for enough funds.
    #[error("insufficient allowance from {owner} to {spender}: required {required}, available {available}")]
    InsufficientAllowance {
        /// The account whose funds are being pulled.
        owner: String,
        /// The account pulling the funds.
        spender: String,
        /// The amount requested.
        required: Amount,
        /// The current allowance.
        available: Amount,
    },

    /// Transfers to or from the zero address are not allowed.
    #[error("zero address not allowed as {role}")]
    ZeroAddress {
        /// Which side of the transfer was zero.
        role: &'static str,
    },

    /// The credit would overflow the recipient's balance or the supply.
    #[error("balance overflow for {account}")]
    Overflow {
        /// The credited account (hex).
        account: String,
    },
}

/// A failed call across a collaborator boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{component}.{operation} rejected: {reason}")]
pub struct CallError {
    /// The component that rejected the call (e.g. "arbitrator").
    pub component: String,
    /// The operation that was invoked.
    pub operation: &'static str,
    /// Human-readable rejection reason.
    pub reason: String,
}

impl CallError {
    /// Build a call error from any displayable rejection.
    pub fn new(
        component: impl Into<String>,
        operation: &'static str,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self {
            component: component.into(),
            operation,
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_balance_display() {
        let err = LedgerError::InsufficientBalance {
            account: "0x01".to_string(),
            required: 100,
            available: 40,
        };
        let msg = format!("{err}");
        assert!(msg.contains("0x01"));
        assert!(msg.contains("100"));
        assert!(msg.contains("40"));
    }

    #[test]
    fn call_error_display() {
        let err = CallError::new("arbitrator", "create_dispute", "caller is not the arbitrable");
        assert_eq!(
            err.to_string(),
            "arbitrator.create_dispute rejected: caller is not the arbitrable"
        );
    }

    #[test]
    fn reentrancy_display() {
        let err = CoreError::Reentrancy { component: "registry" };
        assert!(format!("{err}").contains("registry"));
    }

    #[test]
    fn canonicalization_converts_into_core_error() {
        let inner = CanonicalizationError::FloatRejected(0.5);
        let err: CoreError = inner.into();
        assert!(format!("{err}").contains("0.5"));
    }
}
