// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::effect::effect;
use super::store::{
    ACCOUNT_COLUMNS, LedgerStore, SqliteStore, TRANSACTION_COLUMNS, checked_add, checked_sub,
    map_account, map_transaction,
};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, AccountChanges, AccountId, AccountType, NewAccount, UserId};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use rust_decimal::Decimal;
use tracing::info;

pub fn add_account(conn: &Connection, user: UserId, new: &NewAccount) -> LedgerResult<Account> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(LedgerError::validation("account name cannot be empty"));
    }
    conn.execute(
        "INSERT INTO accounts(user_id, name, type, initial_balance, current_balance)
         VALUES (?1, ?2, ?3, ?4, ?4)",
        params![user, name, new.account_type, new.initial_balance.to_string()],
    )?;
    let id = conn.last_insert_rowid();
    info!(user, id, name, kind = %new.account_type, "account added");
    owned_account(&SqliteStore::new(conn), user, id)
}

pub fn list_accounts(conn: &Connection, user: UserId) -> LedgerResult<Vec<Account>> {
    let sql = format!(
        "SELECT {} FROM accounts WHERE user_id=?1 ORDER BY name",
        ACCOUNT_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user], map_account)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn find_account(conn: &Connection, user: UserId, name: &str) -> LedgerResult<Account> {
    let sql = format!(
        "SELECT {} FROM accounts WHERE user_id=?1 AND name=?2",
        ACCOUNT_COLUMNS
    );
    conn.query_row(&sql, params![user, name.trim()], map_account)
        .optional()?
        .ok_or_else(|| LedgerError::not_found(format!("account '{}'", name.trim())))
}

/// Renames, retypes or re-bases an account.
///
/// The current balance moves by exactly the change in initial balance, and
/// by the difference the new account type makes to the effect of every
/// transaction already posted, so it stays equal to initial balance plus
/// the effects of the live transactions.
pub fn edit_account(
    conn: &mut Connection,
    user: UserId,
    id: AccountId,
    changes: &AccountChanges,
) -> LedgerResult<Account> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let store = SqliteStore::new(&tx);
    let old = owned_account(&store, user, id)?;

    let name = match changes.name.as_deref().map(str::trim) {
        Some("") => return Err(LedgerError::validation("account name cannot be empty")),
        Some(n) => n.to_string(),
        None => old.name.clone(),
    };
    let account_type = changes.account_type.unwrap_or(old.account_type);
    let initial = changes.initial_balance.unwrap_or(old.initial_balance);

    let mut delta = checked_sub(initial, old.initial_balance)?;
    if account_type != old.account_type {
        delta = checked_add(delta, retype_delta(&tx, id, old.account_type, account_type)?)?;
    }

    tx.execute(
        "UPDATE accounts SET name=?1, type=?2, initial_balance=?3 WHERE id=?4",
        params![name, account_type, initial.to_string(), id],
    )?;
    if !delta.is_zero() {
        store.adjust_account_balance(id, delta)?;
    }
    let updated = owned_account(&store, user, id)?;
    tx.commit()?;
    info!(user, id, name = %updated.name, %delta, "account edited");
    Ok(updated)
}

fn retype_delta(
    conn: &Connection,
    account: AccountId,
    from: AccountType,
    to: AccountType,
) -> LedgerResult<Decimal> {
    let sql = format!(
        "SELECT {} FROM transactions WHERE account_id=?1",
        TRANSACTION_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![account], map_transaction)?;
    let mut delta = Decimal::ZERO;
    for row in rows {
        let t = row?;
        let shift = checked_sub(
            effect(t.txn_type, to, t.amount),
            effect(t.txn_type, from, t.amount),
        )?;
        delta = checked_add(delta, shift)?;
    }
    Ok(delta)
}

/// Removes an account that no transaction references.
pub fn delete_account(conn: &Connection, user: UserId, id: AccountId) -> LedgerResult<Account> {
    let account = owned_account(&SqliteStore::new(conn), user, id)?;
    let used: i64 = conn.query_row(
        "SELECT COUNT(*) FROM transactions WHERE account_id=?1",
        params![id],
        |r| r.get(0),
    )?;
    if used > 0 {
        return Err(LedgerError::InUse(format!(
            "account '{}' still has {} transaction(s)",
            account.name, used
        )));
    }
    conn.execute("DELETE FROM accounts WHERE id=?1", params![id])?;
    info!(user, id, name = %account.name, "account removed");
    Ok(account)
}

fn owned_account<S: LedgerStore>(store: &S, user: UserId, id: AccountId) -> LedgerResult<Account> {
    match store.get_account(id)? {
        Some(a) if a.user_id == user => Ok(a),
        _ => Err(LedgerError::not_found(format!("account {}", id))),
    }
}
