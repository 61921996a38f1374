// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use fintrack::config::Config;
use fintrack::{cli, commands, db, logging};

fn main() -> Result<()> {
    logging::init_tracing();

    let cli = cli::build_cli();
    let matches = cli.get_matches();
    let config = Config::from_matches(&matches)?;

    let mut conn = db::open_or_init(&config.db_path)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", config.db_path.display());
        }
        Some(("user", sub)) => commands::users::handle(&mut conn, sub)?,
        Some(("config", sub)) => commands::settings::handle(&conn, sub)?,
        Some((name, sub)) => {
            let user = config.resolve_user(&mut conn)?;
            match name {
                "account" => commands::accounts::handle(&mut conn, user, sub)?,
                "category" => commands::categories::handle(&conn, user, sub)?,
                "tx" => commands::transactions::handle(&mut conn, user, sub)?,
                "budget" => commands::budgets::handle(&conn, user, sub)?,
                "report" => commands::reports::handle(&conn, user, sub)?,
                "export" => commands::exporter::handle(&conn, user, sub)?,
                "doctor" => commands::doctor::handle(&mut conn, user, sub)?,
                _ => {}
            }
        }
        None => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
