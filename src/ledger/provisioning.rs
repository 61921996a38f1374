// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::store::{LedgerStore, SqliteStore};
use crate::error::LedgerResult;
use crate::models::{AccountType, NewAccount, NewCategory, TransactionType, UserId};
use rusqlite::{Connection, TransactionBehavior};
use rust_decimal::Decimal;
use tracing::{debug, info};

pub const DEFAULT_ACCOUNTS: [(&str, AccountType); 3] = [
    ("Cash", AccountType::Cash),
    ("Checking Account", AccountType::Checking),
    ("Savings Account", AccountType::Savings),
];

pub const DEFAULT_EXPENSE_CATEGORIES: [&str; 13] = [
    "Food",
    "Transport",
    "Utilities",
    "Rent",
    "Shopping",
    "Entertainment",
    "Healthcare",
    "Education",
    "Donations",
    "Personal Care",
    "Travel",
    "Bills",
    "Miscellaneous",
];

pub const DEFAULT_INCOME_CATEGORIES: [&str; 6] = [
    "Salary",
    "Freelance",
    "Investments",
    "Gifts",
    "Bonus",
    "Other Income",
];

/// Rows inserted by one provisioning pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Provisioned {
    pub accounts: usize,
    pub categories: usize,
}

/// Seeds the default accounts and categories for `user` unless the user
/// already owns some. Runs on every login, so it must stay idempotent.
pub fn ensure_defaults(conn: &mut Connection, user: UserId) -> LedgerResult<Provisioned> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let done = apply_defaults(&SqliteStore::new(&tx), user)?;
    tx.commit()?;
    if done == Provisioned::default() {
        debug!(user, "defaults already present");
    } else {
        info!(
            user,
            accounts = done.accounts,
            categories = done.categories,
            "default accounts and categories created"
        );
    }
    Ok(done)
}

pub fn apply_defaults<S: LedgerStore>(store: &S, user: UserId) -> LedgerResult<Provisioned> {
    let mut done = Provisioned::default();
    if store.count_accounts(user)? == 0 {
        done.accounts = store.insert_accounts(user, &default_accounts())?;
    }
    if store.count_categories(user)? == 0 {
        done.categories = store.insert_categories(user, &default_categories(), true)?;
    }
    Ok(done)
}

pub fn default_accounts() -> Vec<NewAccount> {
    DEFAULT_ACCOUNTS
        .iter()
        .map(|(name, account_type)| NewAccount {
            name: name.to_string(),
            account_type: *account_type,
            initial_balance: Decimal::ZERO,
        })
        .collect()
}

pub fn default_categories() -> Vec<NewCategory> {
    let expense = DEFAULT_EXPENSE_CATEGORIES.iter().map(|name| NewCategory {
        name: name.to_string(),
        category_type: TransactionType::Expense,
    });
    let income = DEFAULT_INCOME_CATEGORIES.iter().map(|name| NewCategory {
        name: name.to_string(),
        category_type: TransactionType::Income,
    });
    expense.chain(income).collect()
}
