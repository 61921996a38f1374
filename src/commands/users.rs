// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::users::{add_user, delete_user, list_users};
use crate::utils::{arg, maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = arg(sub, "name")?;
            let user = add_user(conn, name, sub.get_flag("admin"))
                .with_context(|| format!("Add user '{}'", name))?;
            println!(
                "Added user '{}' with default accounts and categories",
                user.username
            );
        }
        Some(("list", sub)) => {
            let data = list_users(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .into_iter()
                    .map(|u| {
                        vec![
                            u.username,
                            if u.is_admin { "yes" } else { "" }.to_string(),
                            u.created_at,
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["User", "Admin", "Created"], rows));
            }
        }
        Some(("rm", sub)) => {
            let user = delete_user(conn, arg(sub, "name")?)?;
            println!("Removed user '{}' and all of their data", user.username);
        }
        _ => {}
    }
    Ok(())
}
