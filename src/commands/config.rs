// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::numeric::Locale;
use crate::utils::{get_locale, set_locale};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("locale", sub)) = m.subcommand() {
        locale(conn, sub)?;
    }
    Ok(())
}

fn locale(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    match sub.get_one::<String>("set") {
        Some(code) => {
            let locale = Locale::from_code(code)
                .with_context(|| format!("Unsupported locale '{}'", code.trim()))?;
            set_locale(conn, locale)?;
            println!("Locale set to {}", locale.code());
        }
        None => println!("{}", get_locale(conn)?.code()),
    }
    Ok(())
}
