// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::transactions::{TxFilter, fetch_rows};
use crate::models::UserId;
use crate::utils::arg;
use anyhow::{Context, Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, user: UserId, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, user, sub),
        _ => Ok(()),
    }
}

fn export_transactions(conn: &Connection, user: UserId, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = arg(sub, "format")?.to_lowercase();
    let out = arg(sub, "out")?;

    // Oldest first in files.
    let mut rows = fetch_rows(conn, user, &TxFilter::default())?;
    rows.reverse();

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Create {}", out))?;
            wtr.write_record([
                "id",
                "date",
                "account",
                "category",
                "type",
                "amount",
                "description",
            ])?;
            for r in &rows {
                wtr.write_record([
                    r.id.to_string(),
                    r.date.clone(),
                    r.account.clone(),
                    r.category.clone(),
                    r.txn_type.to_string(),
                    r.amount.to_string(),
                    r.description.clone(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)
                .with_context(|| format!("Write {}", out))?;
        }
        _ => bail!("Unknown format: {} (use csv|json)", fmt),
    }
    println!("Exported {} transaction(s) to {}", rows.len(), out);
    Ok(())
}
