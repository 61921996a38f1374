// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use fintrack::LedgerError;
use fintrack::db::init_schema;
use fintrack::ledger::accounts::{add_account, find_account};
use fintrack::ledger::categories::find_category;
use fintrack::ledger::check::check_balances;
use fintrack::ledger::users::add_user;
use fintrack::ledger::{create_transaction, delete_transaction, update_transaction};
use fintrack::models::{
    AccountType, NewAccount, NewTransaction, Transaction, TransactionType, UserId,
};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> (Connection, UserId) {
    let mut conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    let user = add_user(&mut conn, "alice", false).unwrap();
    (conn, user.id)
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn txn(
    conn: &Connection,
    user: UserId,
    account: &str,
    category: &str,
    amount: &str,
) -> NewTransaction {
    let category = find_category(conn, user, category).unwrap();
    NewTransaction {
        account_id: find_account(conn, user, account).unwrap().id,
        category_id: category.id,
        amount: dec(amount),
        txn_type: category.category_type,
        description: String::new(),
        date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
    }
}

fn post(
    conn: &mut Connection,
    user: UserId,
    account: &str,
    category: &str,
    amount: &str,
) -> Transaction {
    let new = txn(conn, user, account, category, amount);
    create_transaction(conn, user, &new).unwrap()
}

fn balance(conn: &Connection, user: UserId, account: &str) -> Decimal {
    find_account(conn, user, account).unwrap().current_balance
}

fn tx_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap()
}

#[test]
fn expense_edit_and_delete_walkthrough() {
    let (mut conn, user) = setup();
    assert_eq!(balance(&conn, user, "Checking Account"), Decimal::ZERO);

    let new = txn(&conn, user, "Checking Account", "Food", "30");
    let t = create_transaction(&mut conn, user, &new).unwrap();
    assert_eq!(balance(&conn, user, "Checking Account"), dec("-30"));

    let edited = NewTransaction {
        amount: dec("50"),
        ..new
    };
    update_transaction(&mut conn, user, t.id, &edited).unwrap();
    assert_eq!(balance(&conn, user, "Checking Account"), dec("-50"));

    let removed = delete_transaction(&mut conn, user, t.id).unwrap();
    assert_eq!(removed.amount, dec("50"));
    assert_eq!(balance(&conn, user, "Checking Account"), Decimal::ZERO);
    assert_eq!(tx_count(&conn), 0);
}

#[test]
fn create_then_delete_restores_balance() {
    let (mut conn, user) = setup();
    add_account(
        &conn,
        user,
        &NewAccount {
            name: "Brokerage".into(),
            account_type: AccountType::Investment,
            initial_balance: dec("1234.56"),
        },
    )
    .unwrap();
    let before = balance(&conn, user, "Brokerage");
    let t = post(&mut conn, user, "Brokerage", "Investments", "99.99");
    assert_eq!(balance(&conn, user, "Brokerage"), dec("1334.55"));
    delete_transaction(&mut conn, user, t.id).unwrap();
    assert_eq!(balance(&conn, user, "Brokerage"), before);
}

#[test]
fn credit_card_expense_grows_debt() {
    let (mut conn, user) = setup();
    for (name, kind) in [("Visa", AccountType::CreditCard), ("Main", AccountType::Checking)] {
        add_account(
            &conn,
            user,
            &NewAccount {
                name: name.into(),
                account_type: kind,
                initial_balance: dec("100"),
            },
        )
        .unwrap();
    }
    post(&mut conn, user, "Visa", "Shopping", "50");
    post(&mut conn, user, "Main", "Shopping", "50");
    assert_eq!(balance(&conn, user, "Visa"), dec("150"));
    assert_eq!(balance(&conn, user, "Main"), dec("50"));

    // Income is added whatever the account type.
    post(&mut conn, user, "Visa", "Other Income", "20");
    assert_eq!(balance(&conn, user, "Visa"), dec("170"));
}

fn add_visa_and_main(conn: &Connection, user: UserId) {
    for (name, kind) in [("Visa", AccountType::CreditCard), ("Main", AccountType::Checking)] {
        add_account(
            conn,
            user,
            &NewAccount {
                name: name.into(),
                account_type: kind,
                initial_balance: dec("100"),
            },
        )
        .unwrap();
    }
}

#[test]
fn credit_card_expense_reverses_on_delete_and_move() {
    let (mut conn, user) = setup();
    add_visa_and_main(&conn, user);

    let t = post(&mut conn, user, "Visa", "Shopping", "50");
    assert_eq!(balance(&conn, user, "Visa"), dec("150"));
    delete_transaction(&mut conn, user, t.id).unwrap();
    assert_eq!(balance(&conn, user, "Visa"), dec("100"));

    let t = post(&mut conn, user, "Visa", "Shopping", "50");
    let to_main = txn(&conn, user, "Main", "Shopping", "50");
    update_transaction(&mut conn, user, t.id, &to_main).unwrap();
    assert_eq!(balance(&conn, user, "Visa"), dec("100"));
    assert_eq!(balance(&conn, user, "Main"), dec("50"));

    let (mut other, other_user) = setup();
    add_visa_and_main(&other, other_user);
    let t2 = post(&mut other, other_user, "Visa", "Shopping", "50");
    delete_transaction(&mut other, other_user, t2.id).unwrap();
    post(&mut other, other_user, "Main", "Shopping", "50");
    for name in ["Visa", "Main"] {
        assert_eq!(
            balance(&conn, user, name),
            balance(&other, other_user, name),
            "{}",
            name
        );
    }

    let back_to_visa = txn(&conn, user, "Visa", "Shopping", "50");
    update_transaction(&mut conn, user, t.id, &back_to_visa).unwrap();
    assert_eq!(balance(&conn, user, "Visa"), dec("150"));
    assert_eq!(balance(&conn, user, "Main"), dec("100"));
}

#[test]
fn balance_overflow_is_rejected_without_writing() {
    let (mut conn, user) = setup();
    let huge = NewTransaction {
        amount: Decimal::MAX,
        ..txn(&conn, user, "Cash", "Salary", "1")
    };
    create_transaction(&mut conn, user, &huge).unwrap();
    assert_eq!(balance(&conn, user, "Cash"), Decimal::MAX);

    let err = create_transaction(&mut conn, user, &huge).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)), "{:?}", err);
    assert_eq!(balance(&conn, user, "Cash"), Decimal::MAX);
    assert_eq!(tx_count(&conn), 1);
}

#[test]
fn update_across_accounts_matches_delete_plus_create() {
    let (mut conn, user) = setup();
    let t = post(&mut conn, user, "Cash", "Food", "20");
    assert_eq!(balance(&conn, user, "Cash"), dec("-20"));

    let moved = txn(&conn, user, "Savings Account", "Salary", "100");
    let updated = update_transaction(&mut conn, user, t.id, &moved).unwrap();
    assert_eq!(updated.txn_type, TransactionType::Income);
    assert_eq!(updated.account_id, moved.account_id);
    assert_eq!(balance(&conn, user, "Cash"), Decimal::ZERO);
    assert_eq!(balance(&conn, user, "Savings Account"), dec("100"));

    // Same end state through a fresh ledger doing delete + create.
    let (mut other, other_user) = setup();
    let t2 = post(&mut other, other_user, "Cash", "Food", "20");
    delete_transaction(&mut other, other_user, t2.id).unwrap();
    post(&mut other, other_user, "Savings Account", "Salary", "100");
    for name in ["Cash", "Checking Account", "Savings Account"] {
        assert_eq!(
            balance(&conn, user, name),
            balance(&other, other_user, name),
            "{}",
            name
        );
    }
}

#[test]
fn balances_stay_consistent_over_a_sequence() {
    let (mut conn, user) = setup();
    let a = post(&mut conn, user, "Cash", "Food", "12.40");
    let b = post(&mut conn, user, "Checking Account", "Salary", "2500");
    post(&mut conn, user, "Checking Account", "Rent", "900");
    let to_checking = txn(&conn, user, "Checking Account", "Food", "15");
    update_transaction(&mut conn, user, a.id, &to_checking).unwrap();
    let to_savings = txn(&conn, user, "Savings Account", "Bonus", "300");
    update_transaction(&mut conn, user, b.id, &to_savings).unwrap();
    delete_transaction(&mut conn, user, a.id).unwrap();

    let checks = check_balances(&conn, user).unwrap();
    assert_eq!(checks.len(), 3);
    assert!(checks.iter().all(|c| c.is_consistent()), "{:?}", checks);
    assert_eq!(balance(&conn, user, "Checking Account"), dec("-900"));
    assert_eq!(balance(&conn, user, "Savings Account"), dec("300"));
    assert_eq!(balance(&conn, user, "Cash"), Decimal::ZERO);
}

#[test]
fn rejects_bad_input_without_writing() {
    let (mut conn, user) = setup();

    let zero = txn(&conn, user, "Cash", "Food", "0");
    assert!(matches!(
        create_transaction(&mut conn, user, &zero),
        Err(LedgerError::Validation(_))
    ));

    let negative = txn(&conn, user, "Cash", "Food", "-5");
    assert!(matches!(
        create_transaction(&mut conn, user, &negative),
        Err(LedgerError::Validation(_))
    ));

    let mismatched = NewTransaction {
        txn_type: TransactionType::Income,
        ..txn(&conn, user, "Cash", "Food", "10")
    };
    assert!(matches!(
        create_transaction(&mut conn, user, &mismatched),
        Err(LedgerError::Validation(_))
    ));

    assert_eq!(tx_count(&conn), 0);
    assert_eq!(balance(&conn, user, "Cash"), Decimal::ZERO);
}

#[test]
fn other_users_rows_are_not_found() {
    let (mut conn, alice) = setup();
    let bob = add_user(&mut conn, "bob", false).unwrap().id;
    let bobs = post(&mut conn, bob, "Cash", "Food", "10");

    assert!(matches!(
        delete_transaction(&mut conn, alice, bobs.id),
        Err(LedgerError::NotFound(_))
    ));

    // Alice posting to Bob's account.
    let foreign = NewTransaction {
        account_id: find_account(&conn, bob, "Cash").unwrap().id,
        ..txn(&conn, alice, "Cash", "Food", "10")
    };
    assert!(matches!(
        create_transaction(&mut conn, alice, &foreign),
        Err(LedgerError::NotFound(_))
    ));
    assert!(matches!(
        delete_transaction(&mut conn, alice, 9999),
        Err(LedgerError::NotFound(_))
    ));

    assert_eq!(balance(&conn, bob, "Cash"), dec("-10"));
    assert_eq!(balance(&conn, alice, "Cash"), Decimal::ZERO);
}

#[test]
fn failed_update_rolls_back_both_balances() {
    let (mut conn, user) = setup();
    let t = post(&mut conn, user, "Cash", "Food", "40");
    conn.execute_batch(
        "CREATE TRIGGER fail_update BEFORE UPDATE ON transactions
         BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
    )
    .unwrap();

    let moved = txn(&conn, user, "Checking Account", "Food", "70");
    let err = update_transaction(&mut conn, user, t.id, &moved).unwrap_err();
    assert!(matches!(err, LedgerError::Persistence(_)), "{:?}", err);

    assert_eq!(balance(&conn, user, "Cash"), dec("-40"));
    assert_eq!(balance(&conn, user, "Checking Account"), Decimal::ZERO);
    let amount: String = conn
        .query_row("SELECT amount FROM transactions WHERE id=?1", [t.id], |r| r.get(0))
        .unwrap();
    assert_eq!(dec(&amount), dec("40"));
}

#[test]
fn failed_delete_keeps_balance() {
    let (mut conn, user) = setup();
    let t = post(&mut conn, user, "Cash", "Salary", "500");
    conn.execute_batch(
        "CREATE TRIGGER fail_delete BEFORE DELETE ON transactions
         BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
    )
    .unwrap();

    assert!(delete_transaction(&mut conn, user, t.id).is_err());
    assert_eq!(balance(&conn, user, "Cash"), dec("500"));
    assert_eq!(tx_count(&conn), 1);
}
