// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{DEFAULT_CURRENCY_SYMBOL, arg, get_setting, set_setting};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => {
            let key = arg(sub, "key")?;
            match get_setting(conn, key)? {
                Some(v) => println!("{}", v),
                None if key == "currency_symbol" => println!("{}", DEFAULT_CURRENCY_SYMBOL),
                None => println!("(unset)"),
            }
        }
        Some(("set", sub)) => {
            let key = arg(sub, "key")?;
            let value = arg(sub, "value")?;
            set_setting(conn, key, value)?;
            println!("{} = {}", key, value);
        }
        _ => {}
    }
    Ok(())
}
