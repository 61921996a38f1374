// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::accounts::find_account;
use crate::ledger::categories::find_category;
use crate::ledger::store::{LedgerStore, SqliteStore};
use crate::ledger::{create_transaction, delete_transaction, update_transaction};
use crate::models::{NewTransaction, TransactionId, TransactionType, UserId};
use crate::utils::{
    arg, currency_symbol, fmt_money, maybe_print_json, parse_date, parse_decimal, parse_month,
    pretty_table,
};
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &mut Connection, user: UserId, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, user, sub)?,
        Some(("edit", sub)) => edit(conn, user, sub)?,
        Some(("rm", sub)) => rm(conn, user, sub)?,
        Some(("list", sub)) => list(conn, user, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, user: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(arg(sub, "date")?)?;
    let account = find_account(conn, user, arg(sub, "account")?)?;
    let category = find_category(conn, user, arg(sub, "category")?)?;
    let amount = parse_decimal(arg(sub, "amount")?)?;
    let txn_type = match sub.get_one::<String>("type") {
        Some(t) => t.parse::<TransactionType>()?,
        None => category.category_type,
    };
    let description = sub
        .get_one::<String>("description")
        .cloned()
        .unwrap_or_default();

    let new = NewTransaction {
        account_id: account.id,
        category_id: category.id,
        amount,
        txn_type,
        description,
        date,
    };
    let created = create_transaction(conn, user, &new)?;
    let balance = find_account(conn, user, &account.name)?.current_balance;
    let symbol = currency_symbol(conn)?;
    println!(
        "Recorded #{}: {} {} on {} ({} / {}); '{}' balance now {}",
        created.id,
        created.txn_type,
        fmt_money(&created.amount, &symbol),
        created.date,
        account.name,
        category.name,
        account.name,
        fmt_money(&balance, &symbol)
    );
    Ok(())
}

fn edit(conn: &mut Connection, user: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let id = transaction_id(sub)?;
    let old = SqliteStore::new(conn)
        .get_transaction(id)?
        .filter(|t| t.user_id == user)
        .ok_or_else(|| anyhow!("Transaction #{} not found", id))?;

    let mut new = NewTransaction::from(&old);
    if let Some(d) = sub.get_one::<String>("date") {
        new.date = parse_date(d)?;
    }
    if let Some(a) = sub.get_one::<String>("account") {
        new.account_id = find_account(conn, user, a)?.id;
    }
    if let Some(c) = sub.get_one::<String>("category") {
        let category = find_category(conn, user, c)?;
        new.category_id = category.id;
        new.txn_type = category.category_type;
    }
    if let Some(t) = sub.get_one::<String>("type") {
        new.txn_type = t.parse::<TransactionType>()?;
    }
    if let Some(a) = sub.get_one::<String>("amount") {
        new.amount = parse_decimal(a)?;
    }
    if let Some(d) = sub.get_one::<String>("description") {
        new.description = d.clone();
    }
    if new == NewTransaction::from(&old) {
        println!("Transaction #{} unchanged", id);
        return Ok(());
    }

    let updated = update_transaction(conn, user, id, &new)?;
    let symbol = currency_symbol(conn)?;
    println!(
        "Updated #{}: {} {} on {}",
        updated.id,
        updated.txn_type,
        fmt_money(&updated.amount, &symbol),
        updated.date
    );
    Ok(())
}

fn rm(conn: &mut Connection, user: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let id = transaction_id(sub)?;
    let removed = delete_transaction(conn, user, id)?;
    println!(
        "Removed #{} ({} {} on {})",
        removed.id, removed.txn_type, removed.amount, removed.date
    );
    Ok(())
}

fn transaction_id(sub: &clap::ArgMatches) -> Result<TransactionId> {
    sub.get_one::<i64>("id")
        .copied()
        .ok_or_else(|| anyhow!("missing --id"))
}

fn list(conn: &Connection, user: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, user, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let symbol = currency_symbol(conn)?;
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.account.clone(),
                    r.category.clone(),
                    r.txn_type.to_string(),
                    fmt_money(&r.amount, &symbol),
                    r.description.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Account", "Category", "Type", "Amount", "Description"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct TransactionRow {
    pub id: TransactionId,
    pub date: String,
    pub account: String,
    pub category: String,
    #[serde(rename = "type")]
    pub txn_type: TransactionType,
    pub amount: Decimal,
    pub description: String,
}

/// Optional narrowing for [`fetch_rows`].
#[derive(Debug, Default, Clone)]
pub struct TxFilter {
    pub month: Option<(i32, u32)>,
    pub account: Option<String>,
    pub category: Option<String>,
    pub limit: Option<usize>,
}

pub fn query_rows(
    conn: &Connection,
    user: UserId,
    sub: &clap::ArgMatches,
) -> Result<Vec<TransactionRow>> {
    let filter = TxFilter {
        month: sub
            .get_one::<String>("month")
            .map(|s| parse_month(s))
            .transpose()?,
        account: sub.get_one::<String>("account").cloned(),
        category: sub.get_one::<String>("category").cloned(),
        limit: sub.get_one::<usize>("limit").copied(),
    };
    fetch_rows(conn, user, &filter)
}

/// The user's transactions, newest first.
pub fn fetch_rows(conn: &Connection, user: UserId, filter: &TxFilter) -> Result<Vec<TransactionRow>> {
    let mut sql = String::from(
        "SELECT t.id, t.date, a.name, c.name, t.type, t.amount, t.description
         FROM transactions t
         JOIN accounts a ON t.account_id=a.id
         JOIN categories c ON t.category_id=c.id
         WHERE t.user_id=?",
    );
    let mut params_vec: Vec<String> = vec![user.to_string()];

    if let Some((y, m)) = filter.month {
        sql.push_str(" AND substr(t.date,1,7)=?");
        params_vec.push(crate::utils::month_key(y, m));
    }
    if let Some(acct) = &filter.account {
        sql.push_str(" AND a.name=?");
        params_vec.push(acct.clone());
    }
    if let Some(cat) = &filter.category {
        sql.push_str(" AND c.name=?");
        params_vec.push(cat.clone());
    }
    sql.push_str(" ORDER BY t.date DESC, t.id DESC");
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;

    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let amount: String = r.get(5)?;
        data.push(TransactionRow {
            id: r.get(0)?,
            date: r.get(1)?,
            account: r.get(2)?,
            category: r.get(3)?,
            txn_type: r.get(4)?,
            amount: parse_decimal(&amount)?,
            description: r.get(6)?,
        });
    }
    Ok(data)
}
