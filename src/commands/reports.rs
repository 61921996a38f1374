// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::reports::{
    account_balances, expense_breakdown, forecast, month_summary, monthly_expenses,
};
use crate::models::UserId;
use crate::utils::{
    current_month, currency_symbol, fmt_money, maybe_print_json, month_arg, parse_month,
    pretty_table, shift_month,
};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, user: UserId, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, user, sub)?,
        Some(("breakdown", sub)) => breakdown(conn, user, sub)?,
        Some(("monthly", sub)) => monthly(conn, user, sub)?,
        Some(("forecast", sub)) => spending_forecast(conn, user, sub)?,
        Some(("balances", sub)) => balances(conn, user, sub)?,
        _ => {}
    }
    Ok(())
}

fn summary(conn: &Connection, user: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = month_arg(sub)?;
    let s = month_summary(conn, user, year, month)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        let symbol = currency_symbol(conn)?;
        let rows = vec![vec![
            s.month.clone(),
            fmt_money(&s.income, &symbol),
            fmt_money(&s.expenses, &symbol),
            fmt_money(&s.net, &symbol),
        ]];
        println!(
            "{}",
            pretty_table(&["Month", "Income", "Expenses", "Net"], rows)
        );
    }
    Ok(())
}

fn breakdown(conn: &Connection, user: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = month_arg(sub)?;
    let data = expense_breakdown(conn, user, year, month)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let symbol = currency_symbol(conn)?;
        let total: rust_decimal::Decimal = data.iter().map(|c| c.total).sum();
        let rows = data
            .iter()
            .map(|c| {
                let share = if total.is_zero() {
                    String::new()
                } else {
                    format!("{:.1}%", c.total * rust_decimal::Decimal::ONE_HUNDRED / total)
                };
                vec![c.category.clone(), fmt_money(&c.total, &symbol), share]
            })
            .collect();
        println!("{}", pretty_table(&["Category", "Spent", "Share"], rows));
    }
    Ok(())
}

fn monthly(conn: &Connection, user: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let months = sub.get_one::<u32>("months").copied().unwrap_or(6);
    let until = month_arg(sub)?;
    let data = monthly_expenses(conn, user, until, months)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let symbol = currency_symbol(conn)?;
        let rows = data
            .into_iter()
            .map(|m| vec![m.month, fmt_money(&m.total, &symbol)])
            .collect();
        println!("{}", pretty_table(&["Month", "Expenses"], rows));
    }
    Ok(())
}

fn spending_forecast(conn: &Connection, user: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = match sub.get_one::<String>("month") {
        Some(s) => parse_month(s)?,
        None => {
            let (y, m) = current_month();
            shift_month(y, m, 1)
        }
    };
    let f = forecast(conn, user, year, month)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &f)? {
        let symbol = currency_symbol(conn)?;
        let mut rows: Vec<Vec<String>> = f
            .categories
            .iter()
            .map(|c| {
                let mut row = vec![c.category.clone()];
                row.extend(c.history.iter().map(|h| fmt_money(h, &symbol)));
                row.push(fmt_money(&c.estimate, &symbol));
                row
            })
            .collect();
        rows.push(vec![
            "Total".into(),
            String::new(),
            String::new(),
            String::new(),
            fmt_money(&f.total, &symbol),
        ]);
        println!("Forecast for {}", f.month);
        println!(
            "{}",
            pretty_table(&["Category", "M-3", "M-2", "M-1", "Estimate"], rows)
        );
    }
    Ok(())
}

fn balances(conn: &Connection, user: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let data = account_balances(conn, user)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let symbol = currency_symbol(conn)?;
        let rows = data
            .into_iter()
            .map(|b| {
                vec![
                    b.account,
                    b.account_type.to_string(),
                    fmt_money(&b.initial, &symbol),
                    fmt_money(&b.current, &symbol),
                    fmt_money(&b.change, &symbol),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Account", "Type", "Initial", "Current", "Change"], rows)
        );
    }
    Ok(())
}
