// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::provisioning::apply_defaults;
use super::store::{SqliteStore, USER_COLUMNS, map_user};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{User, UserId};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use tracing::info;

/// Registers a user and provisions their default accounts and categories.
///
/// Credentials are owned by whatever authenticates users; the ledger only
/// stores the row they hang off.
pub fn add_user(conn: &mut Connection, username: &str, is_admin: bool) -> LedgerResult<User> {
    let username = username.trim();
    if username.is_empty() {
        return Err(LedgerError::validation("username cannot be empty"));
    }
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    tx.execute(
        "INSERT INTO users(username, is_admin) VALUES (?1, ?2)",
        params![username, is_admin],
    )?;
    let id = tx.last_insert_rowid();
    let seeded = apply_defaults(&SqliteStore::new(&tx), id)?;
    tx.commit()?;
    info!(
        id,
        username,
        is_admin,
        accounts = seeded.accounts,
        categories = seeded.categories,
        "user added"
    );
    get_user(conn, id)
}

pub fn get_user(conn: &Connection, id: UserId) -> LedgerResult<User> {
    let sql = format!("SELECT {} FROM users WHERE id=?1", USER_COLUMNS);
    conn.query_row(&sql, params![id], map_user)
        .optional()?
        .ok_or_else(|| LedgerError::not_found(format!("user {}", id)))
}

pub fn find_user(conn: &Connection, username: &str) -> LedgerResult<User> {
    let sql = format!("SELECT {} FROM users WHERE username=?1", USER_COLUMNS);
    conn.query_row(&sql, params![username.trim()], map_user)
        .optional()?
        .ok_or_else(|| LedgerError::not_found(format!("user '{}'", username.trim())))
}

pub fn list_users(conn: &Connection) -> LedgerResult<Vec<User>> {
    let sql = format!("SELECT {} FROM users ORDER BY username", USER_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_user)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Deletes the user; the schema cascades to everything they own.
pub fn delete_user(conn: &Connection, username: &str) -> LedgerResult<User> {
    let user = find_user(conn, username)?;
    conn.execute("DELETE FROM users WHERE id=?1", params![user.id])?;
    info!(id = user.id, username = %user.username, "user removed");
    Ok(user)
}
