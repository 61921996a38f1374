// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::accounts::list_accounts;
use super::effect::effect;
use super::store::{checked_add, decimal_at};
use crate::error::LedgerResult;
use crate::models::{AccountId, AccountType, TransactionType, UserId};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

/// An account's stored balance next to the one its transactions imply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceCheck {
    pub account_id: AccountId,
    pub account: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub stored: Decimal,
    pub expected: Decimal,
}

impl BalanceCheck {
    pub fn drift(&self) -> Decimal {
        self.stored.saturating_sub(self.expected)
    }

    pub fn is_consistent(&self) -> bool {
        self.stored == self.expected
    }
}

/// Recomputes every account balance of `user` from its initial balance and
/// transaction history.
pub fn check_balances(conn: &Connection, user: UserId) -> LedgerResult<Vec<BalanceCheck>> {
    let accounts = list_accounts(conn, user)?;
    let kinds: HashMap<AccountId, AccountType> =
        accounts.iter().map(|a| (a.id, a.account_type)).collect();

    let mut posted: HashMap<AccountId, Decimal> = HashMap::new();
    let mut stmt =
        conn.prepare("SELECT account_id, type, amount FROM transactions WHERE user_id=?1")?;
    let rows = stmt.query_map(params![user], |r| {
        Ok((
            r.get::<_, AccountId>(0)?,
            r.get::<_, TransactionType>(1)?,
            decimal_at(r, 2)?,
        ))
    })?;
    for row in rows {
        let (account, kind, amount) = row?;
        if let Some(account_type) = kinds.get(&account) {
            let sum = posted.entry(account).or_insert(Decimal::ZERO);
            *sum = checked_add(*sum, effect(kind, *account_type, amount))?;
        }
    }

    let checks = accounts
        .into_iter()
        .map(|a| {
            let effects = posted.get(&a.id).copied().unwrap_or(Decimal::ZERO);
            Ok(BalanceCheck {
                expected: checked_add(a.initial_balance, effects)?,
                account_id: a.id,
                account: a.name,
                account_type: a.account_type,
                stored: a.current_balance,
            })
        })
        .collect::<LedgerResult<Vec<BalanceCheck>>>()?;
    for c in checks.iter().filter(|c| !c.is_consistent()) {
        warn!(user, account = %c.account, stored = %c.stored, expected = %c.expected, "balance drift");
    }
    Ok(checks)
}

/// Overwrites drifted balances with the recomputed value. Returns how many
/// accounts were corrected.
pub fn repair_balances(conn: &mut Connection, user: UserId) -> LedgerResult<usize> {
    let tx = conn.transaction()?;
    let mut fixed = 0;
    for c in check_balances(&tx, user)? {
        if !c.is_consistent() {
            tx.execute(
                "UPDATE accounts SET current_balance=?1 WHERE id=?2",
                params![c.expected.to_string(), c.account_id],
            )?;
            fixed += 1;
        }
    }
    tx.commit()?;
    Ok(fixed)
}
