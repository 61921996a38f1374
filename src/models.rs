// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::LedgerError;
use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type UserId = i64;
pub type AccountId = i64;
pub type CategoryId = i64;
pub type TransactionId = i64;
pub type BudgetId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    Checking,
    Savings,
    #[serde(rename = "Credit Card")]
    CreditCard,
    Cash,
    Investment,
    Loan,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Checking => "Checking",
            AccountType::Savings => "Savings",
            AccountType::CreditCard => "Credit Card",
            AccountType::Cash => "Cash",
            AccountType::Investment => "Investment",
            AccountType::Loan => "Loan",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match norm.as_str() {
            "checking" => Ok(AccountType::Checking),
            "savings" => Ok(AccountType::Savings),
            "creditcard" => Ok(AccountType::CreditCard),
            "cash" => Ok(AccountType::Cash),
            "investment" => Ok(AccountType::Investment),
            "loan" => Ok(AccountType::Loan),
            _ => Err(LedgerError::validation(format!(
                "unknown account type '{}' (expected one of: Checking, Savings, Credit Card, Cash, Investment, Loan)",
                s.trim()
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(LedgerError::validation(format!(
                "unknown transaction type '{}' (expected Income or Expense)",
                s.trim()
            ))),
        }
    }
}

macro_rules! text_enum_sql {
    ($t:ty) => {
        impl ToSql for $t {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $t {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse::<$t>()
                    .map_err(|e: LedgerError| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

text_enum_sql!(AccountType);
text_enum_sql!(TransactionType);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub is_admin: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub user_id: UserId,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub initial_balance: Decimal,
    pub current_balance: Decimal,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub name: String,
    pub account_type: AccountType,
    pub initial_balance: Decimal,
}

/// Field changes for an existing account; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub account_type: Option<AccountType>,
    pub initial_balance: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub user_id: UserId,
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: TransactionType,
    pub is_default: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub category_type: TransactionType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub account_id: AccountId,
    pub category_id: CategoryId,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub txn_type: TransactionType,
    pub description: String,
    pub date: NaiveDate,
    pub created_at: String,
}

/// The caller-controlled fields of a transaction, used for both create and
/// update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub account_id: AccountId,
    pub category_id: CategoryId,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub txn_type: TransactionType,
    pub description: String,
    pub date: NaiveDate,
}

impl From<&Transaction> for NewTransaction {
    fn from(t: &Transaction) -> Self {
        NewTransaction {
            account_id: t.account_id,
            category_id: t.category_id,
            amount: t.amount,
            txn_type: t.txn_type,
            description: t.description.clone(),
            date: t.date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,
    pub user_id: UserId,
    pub category_id: CategoryId,
    pub amount_limit: Decimal,
    pub month: u32,
    pub year: i32,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetState {
    #[serde(rename = "On Track")]
    OnTrack,
    #[serde(rename = "Nearing Limit")]
    NearingLimit,
    #[serde(rename = "Over Budget")]
    OverBudget,
}

impl BudgetState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetState::OnTrack => "On Track",
            BudgetState::NearingLimit => "Nearing Limit",
            BudgetState::OverBudget => "Over Budget",
        }
    }
}

impl fmt::Display for BudgetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub spent: Decimal,
    pub remaining: Decimal,
    pub status: BudgetState,
}
