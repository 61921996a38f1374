// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use fintrack::LedgerError;
use fintrack::db::init_schema;
use fintrack::ledger::accounts::find_account;
use fintrack::ledger::budget::{classify, delete_budget, find_budget, list_budgets, set_budget};
use fintrack::ledger::categories::find_category;
use fintrack::ledger::users::add_user;
use fintrack::ledger::{create_transaction, delete_transaction};
use fintrack::models::{BudgetState, NewTransaction, Transaction, UserId};
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

fn spend(conn: &mut Connection, user: UserId, category: &str, amount: &str, date: &str) -> Transaction {
    let category = find_category(conn, user, category).unwrap();
    let new = NewTransaction {
        account_id: find_account(conn, user, "Checking Account").unwrap().id,
        category_id: category.id,
        amount: dec(amount),
        txn_type: category.category_type,
        description: String::new(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
    };
    create_transaction(conn, user, &new).unwrap()
}

#[test]
fn status_boundaries() {
    let limit = dec("100");

    let exact = classify(limit, dec("100"));
    assert_eq!(exact.status, BudgetState::OnTrack);
    assert_eq!(exact.remaining, Decimal::ZERO);

    let near = classify(limit, dec("91"));
    assert_eq!(near.status, BudgetState::NearingLimit);
    assert_eq!(near.remaining, dec("9"));

    let edge = classify(limit, dec("90"));
    assert_eq!(edge.status, BudgetState::NearingLimit);

    let comfortable = classify(limit, dec("89.99"));
    assert_eq!(comfortable.status, BudgetState::OnTrack);

    let over = classify(limit, dec("101"));
    assert_eq!(over.status, BudgetState::OverBudget);
    assert_eq!(over.remaining, dec("-1"));

    assert_eq!(classify(limit, Decimal::ZERO).status, BudgetState::OnTrack);
}

#[test]
fn spent_counts_only_the_month_and_category() {
    let (mut conn, user) = setup();
    let food = find_category(&conn, user, "Food").unwrap();
    set_budget(&conn, user, food.id, 2024, 3, dec("100")).unwrap();

    spend(&mut conn, user, "Food", "60", "2024-03-02");
    spend(&mut conn, user, "Food", "31", "2024-03-31");
    spend(&mut conn, user, "Food", "500", "2024-04-01");
    spend(&mut conn, user, "Food", "500", "2024-02-29");
    spend(&mut conn, user, "Transport", "500", "2024-03-10");

    let reports = list_budgets(&conn, user, Some((2024, 3))).unwrap();
    assert_eq!(reports.len(), 1);
    let r = &reports[0];
    assert_eq!(r.category, "Food");
    assert_eq!(r.status.spent, dec("91"));
    assert_eq!(r.status.remaining, dec("9"));
    assert_eq!(r.status.status, BudgetState::NearingLimit);
}

#[test]
fn status_follows_live_transactions() {
    let (mut conn, user) = setup();
    let food = find_category(&conn, user, "Food").unwrap();
    set_budget(&conn, user, food.id, 2024, 3, dec("100")).unwrap();

    spend(&mut conn, user, "Food", "80", "2024-03-05");
    let big = spend(&mut conn, user, "Food", "21", "2024-03-06");
    assert_eq!(
        list_budgets(&conn, user, Some((2024, 3))).unwrap()[0].status.status,
        BudgetState::OverBudget
    );

    delete_transaction(&mut conn, user, big.id).unwrap();
    let after = &list_budgets(&conn, user, Some((2024, 3))).unwrap()[0];
    assert_eq!(after.status.spent, dec("80"));
    assert_eq!(after.status.status, BudgetState::OnTrack);
}

#[test]
fn set_replaces_existing_limit() {
    let (conn, user) = setup();
    let food = find_category(&conn, user, "Food").unwrap();
    let first = set_budget(&conn, user, food.id, 2024, 5, dec("100")).unwrap();
    let second = set_budget(&conn, user, food.id, 2024, 5, dec("250")).unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.amount_limit, dec("250"));

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM budgets", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 1);

    delete_budget(&conn, user, food.id, 2024, 5).unwrap();
    assert!(find_budget(&conn, user, food.id, 2024, 5).unwrap().is_none());
    assert!(matches!(
        delete_budget(&conn, user, food.id, 2024, 5),
        Err(LedgerError::NotFound(_))
    ));
}

#[test]
fn set_rejects_bad_input() {
    let (mut conn, user) = setup();
    let food = find_category(&conn, user, "Food").unwrap();
    let salary = find_category(&conn, user, "Salary").unwrap();

    assert!(matches!(
        set_budget(&conn, user, food.id, 2024, 13, dec("100")),
        Err(LedgerError::Validation(_))
    ));
    assert!(matches!(
        set_budget(&conn, user, food.id, 2024, 1, Decimal::ZERO),
        Err(LedgerError::Validation(_))
    ));
    assert!(matches!(
        set_budget(&conn, user, salary.id, 2024, 1, dec("100")),
        Err(LedgerError::Validation(_))
    ));

    let bob = add_user(&mut conn, "bob", false).unwrap().id;
    assert!(matches!(
        set_budget(&conn, bob, food.id, 2024, 1, dec("100")),
        Err(LedgerError::NotFound(_))
    ));
}

#[test]
fn list_orders_newest_period_first() {
    let (conn, user) = setup();
    for (name, year, month) in [("Rent", 2024, 1), ("Food", 2024, 2), ("Bills", 2024, 2)] {
        let cat = find_category(&conn, user, name).unwrap();
        set_budget(&conn, user, cat.id, year, month, dec("10")).unwrap();
    }
    let all = list_budgets(&conn, user, None).unwrap();
    let order: Vec<(u32, &str)> = all
        .iter()
        .map(|b| (b.budget.month, b.category.as_str()))
        .collect();
    assert_eq!(order, vec![(2, "Bills"), (2, "Food"), (1, "Rent")]);
}
