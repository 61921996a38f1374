// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    Account, AccountId, Budget, Category, CategoryId, NewAccount, NewCategory, NewTransaction,
    Transaction, TransactionId, TransactionType, User, UserId,
};
use crate::utils::month_key;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

/// Row access the reconciler, budget aggregator and provisioning rely on.
///
/// Implementations run every call against one connection or open
/// transaction, so a sequence of calls commits or rolls back together.
pub trait LedgerStore {
    fn get_account(&self, id: AccountId) -> LedgerResult<Option<Account>>;
    fn get_category(&self, id: CategoryId) -> LedgerResult<Option<Category>>;
    fn insert_transaction(&self, user: UserId, txn: &NewTransaction)
    -> LedgerResult<TransactionId>;
    fn get_transaction(&self, id: TransactionId) -> LedgerResult<Option<Transaction>>;
    fn update_transaction_row(&self, id: TransactionId, txn: &NewTransaction) -> LedgerResult<()>;
    fn delete_transaction_row(&self, id: TransactionId) -> LedgerResult<()>;
    /// Adds `delta` to the account's current balance and returns the new value.
    fn adjust_account_balance(&self, account: AccountId, delta: Decimal) -> LedgerResult<Decimal>;
    fn sum_expenses(
        &self,
        user: UserId,
        category: CategoryId,
        month: u32,
        year: i32,
    ) -> LedgerResult<Decimal>;

    fn count_accounts(&self, user: UserId) -> LedgerResult<i64>;
    fn count_categories(&self, user: UserId) -> LedgerResult<i64>;
    fn insert_accounts(&self, user: UserId, accounts: &[NewAccount]) -> LedgerResult<usize>;
    fn insert_categories(
        &self,
        user: UserId,
        categories: &[NewCategory],
        is_default: bool,
    ) -> LedgerResult<usize>;
}

/// [`LedgerStore`] over a SQLite connection. Pass a `rusqlite::Transaction`
/// (it derefs to `Connection`) to scope the calls to one unit of work.
pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        SqliteStore { conn }
    }
}

pub(crate) const USER_COLUMNS: &str = "id, username, is_admin, created_at";
pub(crate) const ACCOUNT_COLUMNS: &str =
    "id, user_id, name, type, initial_balance, current_balance, created_at";
pub(crate) const CATEGORY_COLUMNS: &str = "id, user_id, name, type, is_default, created_at";
pub(crate) const TRANSACTION_COLUMNS: &str =
    "id, user_id, account_id, category_id, amount, type, description, date, created_at";
pub(crate) const BUDGET_COLUMNS: &str =
    "id, user_id, category_id, amount_limit, month, year, created_at";

/// Amounts are stored as TEXT to keep them exact.
pub(crate) fn decimal_at(r: &Row, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = r.get(idx)?;
    raw.trim()
        .parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn checked_add(a: Decimal, b: Decimal) -> LedgerResult<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| LedgerError::validation("balance out of range"))
}

pub(crate) fn checked_sub(a: Decimal, b: Decimal) -> LedgerResult<Decimal> {
    a.checked_sub(b)
        .ok_or_else(|| LedgerError::validation("balance out of range"))
}

pub(crate) fn map_user(r: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: r.get(0)?,
        username: r.get(1)?,
        is_admin: r.get(2)?,
        created_at: r.get(3)?,
    })
}

pub(crate) fn map_account(r: &Row) -> rusqlite::Result<Account> {
    Ok(Account {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
        account_type: r.get(3)?,
        initial_balance: decimal_at(r, 4)?,
        current_balance: decimal_at(r, 5)?,
        created_at: r.get(6)?,
    })
}

pub(crate) fn map_category(r: &Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
        category_type: r.get(3)?,
        is_default: r.get(4)?,
        created_at: r.get(5)?,
    })
}

pub(crate) fn map_transaction(r: &Row) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: r.get(0)?,
        user_id: r.get(1)?,
        account_id: r.get(2)?,
        category_id: r.get(3)?,
        amount: decimal_at(r, 4)?,
        txn_type: r.get(5)?,
        description: r.get(6)?,
        date: r.get(7)?,
        created_at: r.get(8)?,
    })
}

pub(crate) fn map_budget(r: &Row) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: r.get(0)?,
        user_id: r.get(1)?,
        category_id: r.get(2)?,
        amount_limit: decimal_at(r, 3)?,
        month: r.get(4)?,
        year: r.get(5)?,
        created_at: r.get(6)?,
    })
}

impl LedgerStore for SqliteStore<'_> {
    fn get_account(&self, id: AccountId) -> LedgerResult<Option<Account>> {
        let sql = format!("SELECT {} FROM accounts WHERE id=?1", ACCOUNT_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, params![id], map_account)
            .optional()?)
    }

    fn get_category(&self, id: CategoryId) -> LedgerResult<Option<Category>> {
        let sql = format!("SELECT {} FROM categories WHERE id=?1", CATEGORY_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, params![id], map_category)
            .optional()?)
    }

    fn insert_transaction(
        &self,
        user: UserId,
        txn: &NewTransaction,
    ) -> LedgerResult<TransactionId> {
        self.conn.execute(
            "INSERT INTO transactions(user_id, account_id, category_id, amount, type, description, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user,
                txn.account_id,
                txn.category_id,
                txn.amount.to_string(),
                txn.txn_type,
                txn.description,
                txn.date
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_transaction(&self, id: TransactionId) -> LedgerResult<Option<Transaction>> {
        let sql = format!(
            "SELECT {} FROM transactions WHERE id=?1",
            TRANSACTION_COLUMNS
        );
        Ok(self
            .conn
            .query_row(&sql, params![id], map_transaction)
            .optional()?)
    }

    fn update_transaction_row(&self, id: TransactionId, txn: &NewTransaction) -> LedgerResult<()> {
        let changed = self.conn.execute(
            "UPDATE transactions
             SET account_id=?1, category_id=?2, amount=?3, type=?4, description=?5, date=?6
             WHERE id=?7",
            params![
                txn.account_id,
                txn.category_id,
                txn.amount.to_string(),
                txn.txn_type,
                txn.description,
                txn.date,
                id
            ],
        )?;
        if changed == 0 {
            return Err(LedgerError::not_found(format!("transaction {}", id)));
        }
        Ok(())
    }

    fn delete_transaction_row(&self, id: TransactionId) -> LedgerResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM transactions WHERE id=?1", params![id])?;
        if changed == 0 {
            return Err(LedgerError::not_found(format!("transaction {}", id)));
        }
        Ok(())
    }

    fn adjust_account_balance(&self, account: AccountId, delta: Decimal) -> LedgerResult<Decimal> {
        let current = self
            .conn
            .query_row(
                "SELECT current_balance FROM accounts WHERE id=?1",
                params![account],
                |r| decimal_at(r, 0),
            )
            .optional()?
            .ok_or_else(|| LedgerError::not_found(format!("account {}", account)))?;
        let updated = checked_add(current, delta)?;
        self.conn.execute(
            "UPDATE accounts SET current_balance=?1 WHERE id=?2",
            params![updated.to_string(), account],
        )?;
        tracing::debug!(account, %delta, %current, %updated, "balance adjusted");
        Ok(updated)
    }

    fn sum_expenses(
        &self,
        user: UserId,
        category: CategoryId,
        month: u32,
        year: i32,
    ) -> LedgerResult<Decimal> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT amount FROM transactions
             WHERE user_id=?1 AND category_id=?2 AND type=?3 AND substr(date,1,7)=?4",
        )?;
        let amounts = stmt.query_map(
            params![
                user,
                category,
                TransactionType::Expense,
                month_key(year, month)
            ],
            |r| decimal_at(r, 0),
        )?;
        let mut total = Decimal::ZERO;
        for amount in amounts {
            total = checked_add(total, amount?)?;
        }
        Ok(total)
    }

    fn count_accounts(&self, user: UserId) -> LedgerResult<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM accounts WHERE user_id=?1",
            params![user],
            |r| r.get(0),
        )?)
    }

    fn count_categories(&self, user: UserId) -> LedgerResult<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM categories WHERE user_id=?1",
            params![user],
            |r| r.get(0),
        )?)
    }

    fn insert_accounts(&self, user: UserId, accounts: &[NewAccount]) -> LedgerResult<usize> {
        let mut insert = self.conn.prepare_cached(
            "INSERT INTO accounts(user_id, name, type, initial_balance, current_balance)
             VALUES (?1, ?2, ?3, ?4, ?4)",
        )?;
        for acct in accounts {
            insert.execute(params![
                user,
                acct.name,
                acct.account_type,
                acct.initial_balance.to_string()
            ])?;
        }
        Ok(accounts.len())
    }

    fn insert_categories(
        &self,
        user: UserId,
        categories: &[NewCategory],
        is_default: bool,
    ) -> LedgerResult<usize> {
        let mut insert = self.conn.prepare_cached(
            "INSERT INTO categories(user_id, name, type, is_default) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for cat in categories {
            insert.execute(params![user, cat.name, cat.category_type, is_default])?;
        }
        Ok(categories.len())
    }
}
