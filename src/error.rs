// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Failures surfaced by the ledger core.
///
/// Every variant except [`LedgerError::Persistence`] is raised before any
/// row is written. Persistence failures inside a unit of work roll the whole
/// unit back, so no variant ever leaves a partially applied balance behind.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Input rejected before touching the store: non-positive amounts,
    /// a category whose type disagrees with the transaction, bad months,
    /// edits to default categories.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The referenced row does not exist or belongs to another user.
    #[error("{0} not found")]
    NotFound(String),

    /// The row is still referenced and cannot be removed or retyped.
    #[error("{0}")]
    InUse(String),

    /// The store rejected or failed the operation, including constraint
    /// violations such as duplicate names.
    #[error("storage error: {0}")]
    Persistence(#[from] rusqlite::Error),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        LedgerError::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        LedgerError::NotFound(what.into())
    }

    /// True when the store refused the write because of a UNIQUE constraint.
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            LedgerError::Persistence(rusqlite::Error::SqliteFailure(e, _))
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        )
    }
}
