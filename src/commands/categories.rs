// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::categories::{
    add_category, delete_category, edit_category, find_category, list_categories,
};
use crate::models::{NewCategory, TransactionType, UserId};
use crate::utils::{arg, maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, user: UserId, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = arg(sub, "name")?;
            let category_type = arg(sub, "type")?.parse::<TransactionType>()?;
            let cat = add_category(
                conn,
                user,
                &NewCategory {
                    name: name.clone(),
                    category_type,
                },
            )
            .with_context(|| format!("Add category '{}'", name))?;
            println!("Added category '{}' ({})", cat.name, cat.category_type);
        }
        Some(("list", sub)) => {
            let kind = sub
                .get_one::<String>("type")
                .map(|t| t.parse::<TransactionType>())
                .transpose()?;
            let data = list_categories(conn, user, kind)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .into_iter()
                    .map(|c| {
                        vec![
                            c.name,
                            c.category_type.to_string(),
                            if c.is_default { "yes" } else { "" }.to_string(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Name", "Type", "Default"], rows));
            }
        }
        Some(("edit", sub)) => {
            let cat = find_category(conn, user, arg(sub, "name")?)?;
            let kind = sub
                .get_one::<String>("type")
                .map(|t| t.parse::<TransactionType>())
                .transpose()?;
            let rename = sub.get_one::<String>("rename").map(String::as_str);
            let updated = edit_category(conn, user, cat.id, rename, kind)?;
            println!(
                "Updated category '{}' ({})",
                updated.name, updated.category_type
            );
        }
        Some(("rm", sub)) => {
            let cat = find_category(conn, user, arg(sub, "name")?)?;
            delete_category(conn, user, cat.id)?;
            println!("Removed category '{}'", cat.name);
        }
        _ => {}
    }
    Ok(())
}
