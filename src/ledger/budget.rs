// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::store::{BUDGET_COLUMNS, LedgerStore, SqliteStore, map_budget};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Budget, BudgetState, BudgetStatus, CategoryId, TransactionType, UserId};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

/// A budget together with its category name and live utilisation.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetReport {
    #[serde(flatten)]
    pub budget: Budget,
    pub category: String,
    #[serde(flatten)]
    pub status: BudgetStatus,
}

/// Spent, remaining and status for `budget`, summed from the live
/// transaction set on every call.
pub fn budget_status<S: LedgerStore>(
    store: &S,
    user: UserId,
    budget: &Budget,
) -> LedgerResult<BudgetStatus> {
    if budget.user_id != user {
        return Err(LedgerError::not_found(format!("budget {}", budget.id)));
    }
    let spent = store.sum_expenses(user, budget.category_id, budget.month, budget.year)?;
    Ok(classify(budget.amount_limit, spent))
}

/// Pure status rule: over when spent exceeds the limit, nearing when what is
/// left is positive and at most a tenth of the limit.
pub fn classify(limit: Decimal, spent: Decimal) -> BudgetStatus {
    let remaining = limit - spent;
    let status = if spent > limit {
        BudgetState::OverBudget
    } else if remaining > Decimal::ZERO && remaining <= limit * Decimal::new(10, 2) {
        BudgetState::NearingLimit
    } else {
        BudgetState::OnTrack
    };
    BudgetStatus {
        spent,
        remaining,
        status,
    }
}

/// Creates the budget for `(user, category, month, year)` or replaces the
/// limit of the existing one.
pub fn set_budget(
    conn: &Connection,
    user: UserId,
    category_id: CategoryId,
    year: i32,
    month: u32,
    limit: Decimal,
) -> LedgerResult<Budget> {
    if !(1..=12).contains(&month) {
        return Err(LedgerError::validation(format!(
            "month must be between 1 and 12, got {}",
            month
        )));
    }
    if limit <= Decimal::ZERO {
        return Err(LedgerError::validation(format!(
            "budget limit must be greater than zero, got {}",
            limit
        )));
    }
    let category = match SqliteStore::new(conn).get_category(category_id)? {
        Some(c) if c.user_id == user => c,
        _ => return Err(LedgerError::not_found(format!("category {}", category_id))),
    };
    if category.category_type != TransactionType::Expense {
        return Err(LedgerError::validation(format!(
            "budgets need an Expense category; '{}' is {}",
            category.name, category.category_type
        )));
    }

    conn.execute(
        "INSERT INTO budgets(user_id, category_id, amount_limit, month, year) VALUES (?1,?2,?3,?4,?5)
         ON CONFLICT(user_id, category_id, month, year) DO UPDATE SET amount_limit=excluded.amount_limit",
        params![user, category_id, limit.to_string(), month, year],
    )?;
    info!(user, category = %category.name, year, month, %limit, "budget set");
    find_budget(conn, user, category_id, year, month)?
        .ok_or_else(|| LedgerError::not_found(format!("budget for {}", category.name)))
}

pub fn find_budget(
    conn: &Connection,
    user: UserId,
    category_id: CategoryId,
    year: i32,
    month: u32,
) -> LedgerResult<Option<Budget>> {
    let sql = format!(
        "SELECT {} FROM budgets WHERE user_id=?1 AND category_id=?2 AND year=?3 AND month=?4",
        BUDGET_COLUMNS
    );
    Ok(conn
        .query_row(&sql, params![user, category_id, year, month], map_budget)
        .optional()?)
}

/// Budgets with live status, newest period first then by category name.
pub fn list_budgets(
    conn: &Connection,
    user: UserId,
    period: Option<(i32, u32)>,
) -> LedgerResult<Vec<BudgetReport>> {
    let mut sql = String::from(
        "SELECT b.id, b.user_id, b.category_id, b.amount_limit, b.month, b.year, b.created_at, c.name
         FROM budgets b JOIN categories c ON b.category_id=c.id
         WHERE b.user_id=?1",
    );
    let (year, month) = period.unwrap_or_default();
    if period.is_some() {
        sql.push_str(" AND b.year=?2 AND b.month=?3");
    }
    sql.push_str(" ORDER BY b.year DESC, b.month DESC, c.name");

    let mut stmt = conn.prepare(&sql)?;
    let rows = if period.is_some() {
        stmt.query_map(params![user, year, month], map_named_budget)?
            .collect::<rusqlite::Result<Vec<_>>>()?
    } else {
        stmt.query_map(params![user], map_named_budget)?
            .collect::<rusqlite::Result<Vec<_>>>()?
    };

    let store = SqliteStore::new(conn);
    let mut out = Vec::with_capacity(rows.len());
    for (budget, category) in rows {
        let status = budget_status(&store, user, &budget)?;
        out.push(BudgetReport {
            budget,
            category,
            status,
        });
    }
    Ok(out)
}

fn map_named_budget(r: &Row) -> rusqlite::Result<(Budget, String)> {
    Ok((map_budget(r)?, r.get(7)?))
}

pub fn delete_budget(
    conn: &Connection,
    user: UserId,
    category_id: CategoryId,
    year: i32,
    month: u32,
) -> LedgerResult<()> {
    let changed = conn.execute(
        "DELETE FROM budgets WHERE user_id=?1 AND category_id=?2 AND year=?3 AND month=?4",
        params![user, category_id, year, month],
    )?;
    if changed == 0 {
        return Err(LedgerError::not_found(format!(
            "budget for category {} in {:04}-{:02}",
            category_id, year, month
        )));
    }
    info!(user, category_id, year, month, "budget removed");
    Ok(())
}
