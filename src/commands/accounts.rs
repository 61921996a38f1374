// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::accounts::{add_account, delete_account, edit_account, find_account, list_accounts};
use crate::models::{AccountChanges, AccountType, NewAccount, UserId};
use crate::utils::{arg, currency_symbol, fmt_money, maybe_print_json, parse_decimal, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, user: UserId, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = arg(sub, "name")?;
            let account_type = arg(sub, "type")?.parse::<AccountType>()?;
            let initial_balance = match sub.get_one::<String>("initial") {
                Some(s) => parse_decimal(s)?,
                None => Default::default(),
            };
            let acct = add_account(
                conn,
                user,
                &NewAccount {
                    name: name.clone(),
                    account_type,
                    initial_balance,
                },
            )
            .with_context(|| format!("Add account '{}'", name))?;
            println!(
                "Added account '{}' ({}, opening {})",
                acct.name,
                acct.account_type,
                fmt_money(&acct.initial_balance, &currency_symbol(conn)?)
            );
        }
        Some(("list", sub)) => {
            let data = list_accounts(conn, user)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let symbol = currency_symbol(conn)?;
                let rows = data
                    .into_iter()
                    .map(|a| {
                        vec![
                            a.name,
                            a.account_type.to_string(),
                            fmt_money(&a.initial_balance, &symbol),
                            fmt_money(&a.current_balance, &symbol),
                            a.created_at,
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Name", "Type", "Initial", "Current", "Created"], rows)
                );
            }
        }
        Some(("edit", sub)) => {
            let acct = find_account(conn, user, arg(sub, "name")?)?;
            let changes = AccountChanges {
                name: sub.get_one::<String>("rename").cloned(),
                account_type: sub
                    .get_one::<String>("type")
                    .map(|t| t.parse::<AccountType>())
                    .transpose()?,
                initial_balance: sub
                    .get_one::<String>("initial")
                    .map(|s| parse_decimal(s))
                    .transpose()?,
            };
            let updated = edit_account(conn, user, acct.id, &changes)?;
            println!(
                "Updated account '{}' ({}); balance {}",
                updated.name,
                updated.account_type,
                fmt_money(&updated.current_balance, &currency_symbol(conn)?)
            );
        }
        Some(("rm", sub)) => {
            let acct = find_account(conn, user, arg(sub, "name")?)?;
            delete_account(conn, user, acct.id)?;
            println!("Removed account '{}'", acct.name);
        }
        _ => {}
    }
    Ok(())
}
