// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Create, edit and delete transactions while keeping every account's
//! current balance equal to its initial balance plus the effects of its
//! live transactions.
//!
//! The public functions open one immediate SQLite transaction per call and
//! commit only after both the row and the balance(s) are written. Any error
//! returns early, the `rusqlite::Transaction` is dropped, and SQLite rolls
//! the whole unit back. The `apply_*` functions hold the actual protocol and
//! work against any [`LedgerStore`].

use super::effect::{effect, reversal};
use super::store::{LedgerStore, SqliteStore};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, NewTransaction, Transaction, TransactionId, UserId};
use rusqlite::{Connection, TransactionBehavior};
use rust_decimal::Decimal;
use tracing::{info, warn};

pub fn create_transaction(
    conn: &mut Connection,
    user: UserId,
    new: &NewTransaction,
) -> LedgerResult<Transaction> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let created = apply_create(&SqliteStore::new(&tx), user, new)?;
    tx.commit()?;
    info!(
        user,
        id = created.id,
        account = created.account_id,
        amount = %created.amount,
        kind = %created.txn_type,
        "transaction created"
    );
    Ok(created)
}

pub fn update_transaction(
    conn: &mut Connection,
    user: UserId,
    id: TransactionId,
    new: &NewTransaction,
) -> LedgerResult<Transaction> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let updated = apply_update(&SqliteStore::new(&tx), user, id, new)?;
    tx.commit()?;
    info!(user, id, account = updated.account_id, amount = %updated.amount, "transaction updated");
    Ok(updated)
}

/// Deletes a transaction and returns the row as it was stored.
pub fn delete_transaction(
    conn: &mut Connection,
    user: UserId,
    id: TransactionId,
) -> LedgerResult<Transaction> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let removed = apply_delete(&SqliteStore::new(&tx), user, id)?;
    tx.commit()?;
    info!(user, id, account = removed.account_id, "transaction deleted");
    Ok(removed)
}

pub fn apply_create<S: LedgerStore>(
    store: &S,
    user: UserId,
    new: &NewTransaction,
) -> LedgerResult<Transaction> {
    let account = validate(store, user, new)?;
    let id = store.insert_transaction(user, new)?;
    store.adjust_account_balance(account.id, effect(new.txn_type, account.account_type, new.amount))?;
    stored(store, id)
}

/// Same end state as deleting the stored transaction and creating `new`,
/// even when the account, type and amount all change at once.
pub fn apply_update<S: LedgerStore>(
    store: &S,
    user: UserId,
    id: TransactionId,
    new: &NewTransaction,
) -> LedgerResult<Transaction> {
    let old = owned_transaction(store, user, id)?;
    let new_account = validate(store, user, new)?;
    let old_account = store
        .get_account(old.account_id)?
        .ok_or_else(|| LedgerError::not_found(format!("account {}", old.account_id)))?;

    store.adjust_account_balance(
        old_account.id,
        reversal(old.txn_type, old_account.account_type, old.amount),
    )?;
    store.update_transaction_row(id, new)?;
    store.adjust_account_balance(
        new_account.id,
        effect(new.txn_type, new_account.account_type, new.amount),
    )?;
    stored(store, id)
}

/// The stored row is the only source for what gets reversed.
pub fn apply_delete<S: LedgerStore>(
    store: &S,
    user: UserId,
    id: TransactionId,
) -> LedgerResult<Transaction> {
    let old = owned_transaction(store, user, id)?;
    let account = store
        .get_account(old.account_id)?
        .ok_or_else(|| LedgerError::not_found(format!("account {}", old.account_id)))?;
    store.adjust_account_balance(
        account.id,
        reversal(old.txn_type, account.account_type, old.amount),
    )?;
    store.delete_transaction_row(id)?;
    Ok(old)
}

fn owned_transaction<S: LedgerStore>(
    store: &S,
    user: UserId,
    id: TransactionId,
) -> LedgerResult<Transaction> {
    match store.get_transaction(id)? {
        Some(t) if t.user_id == user => Ok(t),
        _ => Err(LedgerError::not_found(format!("transaction {}", id))),
    }
}

fn stored<S: LedgerStore>(store: &S, id: TransactionId) -> LedgerResult<Transaction> {
    store
        .get_transaction(id)?
        .ok_or_else(|| LedgerError::not_found(format!("transaction {}", id)))
}

/// Checks `new` against the store and returns the account it will post to.
fn validate<S: LedgerStore>(store: &S, user: UserId, new: &NewTransaction) -> LedgerResult<Account> {
    if new.amount <= Decimal::ZERO {
        warn!(user, amount = %new.amount, "rejected non-positive amount");
        return Err(LedgerError::validation(format!(
            "amount must be greater than zero, got {}",
            new.amount
        )));
    }
    let account = match store.get_account(new.account_id)? {
        Some(a) if a.user_id == user => a,
        _ => return Err(LedgerError::not_found(format!("account {}", new.account_id))),
    };
    let category = match store.get_category(new.category_id)? {
        Some(c) if c.user_id == user => c,
        _ => {
            return Err(LedgerError::not_found(format!(
                "category {}",
                new.category_id
            )));
        }
    };
    if category.category_type != new.txn_type {
        warn!(user, category = %category.name, "rejected type mismatch");
        return Err(LedgerError::validation(format!(
            "category '{}' is an {} category but the transaction is {}",
            category.name, category.category_type, new.txn_type
        )));
    }
    Ok(account)
}
