// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::budget::{delete_budget, list_budgets, set_budget};
use crate::ledger::categories::find_category;
use crate::models::UserId;
use crate::utils::{
    arg, currency_symbol, fmt_money, maybe_print_json, month_key, parse_decimal, parse_month,
    pretty_table,
};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, user: UserId, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, user, sub)?,
        Some(("list", sub)) => list(conn, user, sub)?,
        Some(("rm", sub)) => rm(conn, user, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, user: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = parse_month(arg(sub, "month")?)?;
    let cat = find_category(conn, user, arg(sub, "category")?)?;
    let amount = parse_decimal(arg(sub, "amount")?)?;
    let budget = set_budget(conn, user, cat.id, year, month, amount)?;
    println!(
        "Budget set for {} / {} = {}",
        month_key(budget.year, budget.month),
        cat.name,
        fmt_money(&budget.amount_limit, &currency_symbol(conn)?)
    );
    Ok(())
}

fn list(conn: &Connection, user: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let period = sub
        .get_one::<String>("month")
        .map(|s| parse_month(s))
        .transpose()?;
    let data = list_budgets(conn, user, period)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let symbol = currency_symbol(conn)?;
        let rows = data
            .into_iter()
            .map(|b| {
                vec![
                    month_key(b.budget.year, b.budget.month),
                    b.category,
                    fmt_money(&b.budget.amount_limit, &symbol),
                    fmt_money(&b.status.spent, &symbol),
                    fmt_money(&b.status.remaining, &symbol),
                    b.status.status.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Month", "Category", "Limit", "Spent", "Remaining", "Status"],
                rows
            )
        );
    }
    Ok(())
}

fn rm(conn: &Connection, user: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = parse_month(arg(sub, "month")?)?;
    let cat = find_category(conn, user, arg(sub, "category")?)?;
    delete_budget(conn, user, cat.id, year, month)?;
    println!(
        "Removed budget for {} / {}",
        month_key(year, month),
        cat.name
    );
    Ok(())
}
