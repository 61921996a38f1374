// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-only summaries derived from the transaction history.

use super::accounts::list_accounts;
use super::categories::list_categories;
use super::store::{LedgerStore, SqliteStore, checked_add, checked_sub, decimal_at};
use crate::error::LedgerResult;
use crate::models::{AccountType, TransactionType, UserId};
use crate::utils::{month_key, shift_month};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Months of history a spending estimate averages over.
pub const FORECAST_WINDOW: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSummary {
    pub month: String,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotal {
    pub month: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryForecast {
    pub category: String,
    /// Spend in the preceding months, oldest first.
    pub history: Vec<Decimal>,
    pub estimate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub month: String,
    pub categories: Vec<CategoryForecast>,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountBalance {
    pub account: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub initial: Decimal,
    pub current: Decimal,
    pub change: Decimal,
}

pub fn account_balances(conn: &Connection, user: UserId) -> LedgerResult<Vec<AccountBalance>> {
    list_accounts(conn, user)?
        .into_iter()
        .map(|a| {
            Ok(AccountBalance {
                change: checked_sub(a.current_balance, a.initial_balance)?,
                account: a.name,
                account_type: a.account_type,
                initial: a.initial_balance,
                current: a.current_balance,
            })
        })
        .collect()
}

pub fn month_summary(
    conn: &Connection,
    user: UserId,
    year: i32,
    month: u32,
) -> LedgerResult<MonthSummary> {
    let key = month_key(year, month);
    let mut stmt = conn.prepare(
        "SELECT type, amount FROM transactions WHERE user_id=?1 AND substr(date,1,7)=?2",
    )?;
    let rows = stmt.query_map(params![user, key], |r| {
        Ok((r.get::<_, TransactionType>(0)?, decimal_at(r, 1)?))
    })?;
    let mut income = Decimal::ZERO;
    let mut expenses = Decimal::ZERO;
    for row in rows {
        match row? {
            (TransactionType::Income, amt) => income = checked_add(income, amt)?,
            (TransactionType::Expense, amt) => expenses = checked_add(expenses, amt)?,
        }
    }
    Ok(MonthSummary {
        month: key,
        income,
        expenses,
        net: checked_sub(income, expenses)?,
    })
}

/// Expense totals per category for one month, largest first. Categories
/// with nothing spent are left out.
pub fn expense_breakdown(
    conn: &Connection,
    user: UserId,
    year: i32,
    month: u32,
) -> LedgerResult<Vec<CategoryTotal>> {
    let mut stmt = conn.prepare(
        "SELECT c.name, t.amount FROM transactions t JOIN categories c ON t.category_id=c.id
         WHERE t.user_id=?1 AND t.type=?2 AND substr(t.date,1,7)=?3",
    )?;
    let rows = stmt.query_map(
        params![user, TransactionType::Expense, month_key(year, month)],
        |r| Ok((r.get::<_, String>(0)?, decimal_at(r, 1)?)),
    )?;
    let mut agg: BTreeMap<String, Decimal> = BTreeMap::new();
    for row in rows {
        let (cat, amt) = row?;
        let total = agg.entry(cat).or_insert(Decimal::ZERO);
        *total = checked_add(*total, amt)?;
    }
    let mut items: Vec<CategoryTotal> = agg
        .into_iter()
        .filter(|(_, total)| *total > Decimal::ZERO)
        .map(|(category, total)| CategoryTotal { category, total })
        .collect();
    items.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
    Ok(items)
}

/// Expense totals for the `months` months ending with `until`, oldest
/// first. Months without spending appear with a zero total.
pub fn monthly_expenses(
    conn: &Connection,
    user: UserId,
    until: (i32, u32),
    months: u32,
) -> LedgerResult<Vec<MonthTotal>> {
    let months = months.max(1);
    let (y0, m0) = shift_month(until.0, until.1, -(months as i32 - 1));
    let first = month_key(y0, m0);
    let last = month_key(until.0, until.1);

    let mut totals: BTreeMap<String, Decimal> = (0..months)
        .map(|i| {
            let (y, m) = shift_month(y0, m0, i as i32);
            (month_key(y, m), Decimal::ZERO)
        })
        .collect();

    let mut stmt = conn.prepare(
        "SELECT substr(date,1,7), amount FROM transactions
         WHERE user_id=?1 AND type=?2 AND substr(date,1,7) BETWEEN ?3 AND ?4",
    )?;
    let rows = stmt.query_map(
        params![user, TransactionType::Expense, first, last],
        |r| Ok((r.get::<_, String>(0)?, decimal_at(r, 1)?)),
    )?;
    for row in rows {
        let (m, amt) = row?;
        let total = totals.entry(m).or_insert(Decimal::ZERO);
        *total = checked_add(*total, amt)?;
    }
    Ok(totals
        .into_iter()
        .map(|(month, total)| MonthTotal { month, total })
        .collect())
}

/// Next-month spending estimate per expense category: the mean of the
/// [`FORECAST_WINDOW`] months before `(year, month)`, counting months with
/// no spending as zero.
pub fn forecast(conn: &Connection, user: UserId, year: i32, month: u32) -> LedgerResult<Forecast> {
    let store = SqliteStore::new(conn);
    let window: Vec<(i32, u32)> = (1..=FORECAST_WINDOW)
        .rev()
        .map(|back| shift_month(year, month, -(back as i32)))
        .collect();

    let mut categories = Vec::new();
    let mut total = Decimal::ZERO;
    for cat in list_categories(conn, user, Some(TransactionType::Expense))? {
        let mut history = Vec::with_capacity(window.len());
        for (y, m) in &window {
            history.push(store.sum_expenses(user, cat.id, *m, *y)?);
        }
        let sum = history
            .iter()
            .try_fold(Decimal::ZERO, |acc, x| checked_add(acc, *x))?;
        let estimate = (sum / Decimal::from(FORECAST_WINDOW))
            .round_dp(2)
            .max(Decimal::ZERO);
        total = checked_add(total, estimate)?;
        categories.push(CategoryForecast {
            category: cat.name,
            history,
            estimate,
        });
    }
    Ok(Forecast {
        month: month_key(year, month),
        categories,
        total,
    })
}
