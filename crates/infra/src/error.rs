//! Infrastructure error model.

use thiserror::Error;

use kitforge_core::{DomainError, LineItemId};

/// Storage-level failure. These are infrastructure errors, as opposed to the
/// deterministic business failures in [`DomainError`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("duplicate {entity} {id}")]
    Duplicate { entity: &'static str, id: String },

    #[error("store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn duplicate(entity: &'static str, id: impl ToString) -> Self {
        Self::Duplicate {
            entity,
            id: id.to_string(),
        }
    }
}

/// Error surface of the application services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The line's variant cannot be resolved; nothing can be reconciled.
    #[error("line {0} cannot be reconciled: variant unresolved")]
    InvalidLine(LineItemId),

    /// The stock determination gateway refused or failed to place a unit.
    /// The enclosing reconciliation is rolled back (nothing was applied).
    #[error("unit placement failed: {0}")]
    Placement(String),

    /// Event publication failed after the state change was committed
    /// (at-least-once: the mutation stands, the caller may republish).
    #[error("event publication failed: {0}")]
    Publish(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
