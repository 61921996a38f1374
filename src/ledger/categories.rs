// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::store::{CATEGORY_COLUMNS, LedgerStore, SqliteStore, map_category};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Category, CategoryId, NewCategory, TransactionType, UserId};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::info;

pub fn add_category(conn: &Connection, user: UserId, new: &NewCategory) -> LedgerResult<Category> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(LedgerError::validation("category name cannot be empty"));
    }
    conn.execute(
        "INSERT INTO categories(user_id, name, type, is_default) VALUES (?1, ?2, ?3, 0)",
        params![user, name, new.category_type],
    )?;
    let id = conn.last_insert_rowid();
    info!(user, id, name, kind = %new.category_type, "category added");
    owned_category(conn, user, id)
}

pub fn list_categories(
    conn: &Connection,
    user: UserId,
    kind: Option<TransactionType>,
) -> LedgerResult<Vec<Category>> {
    let mut sql = format!("SELECT {} FROM categories WHERE user_id=?1", CATEGORY_COLUMNS);
    if kind.is_some() {
        sql.push_str(" AND type=?2");
    }
    sql.push_str(" ORDER BY type, name");
    let mut stmt = conn.prepare(&sql)?;
    let rows = match kind {
        Some(k) => stmt
            .query_map(params![user, k], map_category)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        None => stmt
            .query_map(params![user], map_category)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
    };
    Ok(rows)
}

pub fn find_category(conn: &Connection, user: UserId, name: &str) -> LedgerResult<Category> {
    let sql = format!(
        "SELECT {} FROM categories WHERE user_id=?1 AND name=?2",
        CATEGORY_COLUMNS
    );
    conn.query_row(&sql, params![user, name.trim()], map_category)
        .optional()?
        .ok_or_else(|| LedgerError::not_found(format!("category '{}'", name.trim())))
}

/// Renames or retypes a user-created category.
pub fn edit_category(
    conn: &Connection,
    user: UserId,
    id: CategoryId,
    name: Option<&str>,
    kind: Option<TransactionType>,
) -> LedgerResult<Category> {
    let old = owned_category(conn, user, id)?;
    if old.is_default {
        return Err(LedgerError::validation(format!(
            "'{}' is a default category and cannot be edited",
            old.name
        )));
    }
    let name = match name.map(str::trim) {
        Some("") => return Err(LedgerError::validation("category name cannot be empty")),
        Some(n) => n.to_string(),
        None => old.name.clone(),
    };
    let kind = kind.unwrap_or(old.category_type);
    if kind != old.category_type {
        let (txns, budgets) = usage(conn, id)?;
        if txns + budgets > 0 {
            return Err(LedgerError::InUse(format!(
                "category '{}' is used by {} transaction(s) and {} budget(s); its type cannot change",
                old.name, txns, budgets
            )));
        }
    }
    conn.execute(
        "UPDATE categories SET name=?1, type=?2 WHERE id=?3",
        params![name, kind, id],
    )?;
    info!(user, id, name = %name, "category edited");
    owned_category(conn, user, id)
}

/// Removes a user-created category nothing references.
pub fn delete_category(conn: &Connection, user: UserId, id: CategoryId) -> LedgerResult<Category> {
    let category = owned_category(conn, user, id)?;
    if category.is_default {
        return Err(LedgerError::validation(format!(
            "'{}' is a default category and cannot be deleted",
            category.name
        )));
    }
    let (txns, budgets) = usage(conn, id)?;
    if txns + budgets > 0 {
        return Err(LedgerError::InUse(format!(
            "category '{}' is used by {} transaction(s) and {} budget(s)",
            category.name, txns, budgets
        )));
    }
    conn.execute("DELETE FROM categories WHERE id=?1", params![id])?;
    info!(user, id, name = %category.name, "category removed");
    Ok(category)
}

fn usage(conn: &Connection, id: CategoryId) -> LedgerResult<(i64, i64)> {
    Ok(conn.query_row(
        "SELECT (SELECT COUNT(*) FROM transactions WHERE category_id=?1),
                (SELECT COUNT(*) FROM budgets WHERE category_id=?1)",
        params![id],
        |r| Ok((r.get::<_, i64>(0)?, r.get::<_, i64>(1)?)),
    )?)
}

fn owned_category(conn: &Connection, user: UserId, id: CategoryId) -> LedgerResult<Category> {
    match SqliteStore::new(conn).get_category(id)? {
        Some(c) if c.user_id == user => Ok(c),
        _ => Err(LedgerError::not_found(format!("category {}", id))),
    }
}
