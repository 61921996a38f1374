// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The sign rule that turns a transaction into a balance delta.
//!
//! Credit card balances are stored as outstanding debt: spending on a card
//! grows the stored number the same way income grows a checking balance.
//! Every other account type loses money on an expense.

use crate::models::{AccountType, TransactionType};
use rust_decimal::Decimal;

/// Signed change `amount` of type `txn_type` makes to an account of
/// `account_type`.
pub fn effect(txn_type: TransactionType, account_type: AccountType, amount: Decimal) -> Decimal {
    match (txn_type, account_type) {
        (TransactionType::Income, _) => amount,
        (TransactionType::Expense, AccountType::CreditCard) => amount,
        (TransactionType::Expense, _) => -amount,
    }
}

/// Delta that undoes [`effect`] for the same triple.
pub fn reversal(txn_type: TransactionType, account_type: AccountType, amount: Decimal) -> Decimal {
    -effect(txn_type, account_type, amount)
}
