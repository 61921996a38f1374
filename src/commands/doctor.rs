// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::check::{check_balances, repair_balances};
use crate::models::UserId;
use crate::utils::{currency_symbol, fmt_money, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, user: UserId, m: &clap::ArgMatches) -> Result<()> {
    let symbol = currency_symbol(conn)?;
    let rows: Vec<Vec<String>> = check_balances(conn, user)?
        .into_iter()
        .filter(|c| !c.is_consistent())
        .map(|c| {
            vec![
                "balance_drift".into(),
                c.account.clone(),
                fmt_money(&c.stored, &symbol),
                fmt_money(&c.expected, &symbol),
                fmt_money(&c.drift(), &symbol),
            ]
        })
        .collect();

    if rows.is_empty() {
        println!("doctor: no issues found");
        return Ok(());
    }
    println!(
        "{}",
        pretty_table(&["Issue", "Account", "Stored", "Expected", "Drift"], rows)
    );
    if m.get_flag("fix") {
        let fixed = repair_balances(conn, user)?;
        println!("doctor: corrected {} account balance(s)", fixed);
    } else {
        println!("Run `fintrack doctor --fix` to rewrite them from the transaction history");
    }
    Ok(())
}
