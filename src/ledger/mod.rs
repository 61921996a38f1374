// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Per-user ledger: accounts, categories, transactions and budgets, with
//! account balances kept in step with the transaction history.

pub mod accounts;
pub mod budget;
pub mod categories;
pub mod check;
pub mod effect;
pub mod provisioning;
pub mod reconciler;
pub mod reports;
pub mod store;
pub mod users;

pub use budget::{BudgetReport, budget_status, classify};
pub use effect::{effect, reversal};
pub use provisioning::{Provisioned, ensure_defaults};
pub use reconciler::{create_transaction, delete_transaction, update_transaction};
pub use store::{LedgerStore, SqliteStore};
