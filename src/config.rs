// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::ledger::provisioning::ensure_defaults;
use crate::ledger::users::find_user;
use crate::models::UserId;
use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;
use std::path::PathBuf;

pub const DB_ENV: &str = "FINTRACK_DB";
pub const USER_ENV: &str = "FINTRACK_USER";

/// Where the ledger lives and who is acting on it.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub user: Option<String>,
}

impl Config {
    /// `--db`/`--user` (clap also reads `FINTRACK_DB`/`FINTRACK_USER`),
    /// falling back to the platform data dir for the database.
    pub fn from_matches(m: &clap::ArgMatches) -> Result<Config> {
        let db_path = match m.get_one::<String>("db") {
            Some(p) => PathBuf::from(p),
            None => db::default_db_path()?,
        };
        let user = m
            .get_one::<String>("user")
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        Ok(Config { db_path, user })
    }

    /// Looks up the acting user and makes sure their defaults exist.
    pub fn resolve_user(&self, conn: &mut Connection) -> Result<UserId> {
        let name = self.user.as_deref().ok_or_else(|| {
            anyhow!(
                "No user selected; pass --user NAME or set {} (create one with `fintrack user add --name NAME`)",
                USER_ENV
            )
        })?;
        let user = find_user(conn, name)
            .with_context(|| format!("Unknown user '{}'; create it with `fintrack user add`", name))?;
        ensure_defaults(conn, user.id)?;
        Ok(user.id)
    }
}
