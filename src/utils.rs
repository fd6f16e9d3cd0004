// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::numeric::{Locale, parse_currency, parse_date_text};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    parse_date_text(s)
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD or DD/MM/YYYY", s))
}

pub fn parse_money(s: &str, locale: Locale) -> Result<Decimal> {
    parse_currency(s, locale)
        .with_context(|| format!("Invalid amount '{}' for locale {}", s, locale.code()))
}

pub fn required_arg(sub: &clap::ArgMatches, name: &str) -> Result<String> {
    sub.get_one::<String>(name)
        .map(|s| s.trim().to_string())
        .with_context(|| format!("Missing required argument --{}", name))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(json_flag: bool, v: &T) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    Ok(false)
}

pub fn id_for_budget(conn: &Connection, name: &str) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT id FROM budgets WHERE name=?1")?;
    let id: i64 = stmt
        .query_row(params![name], |r| r.get(0))
        .with_context(|| format!("Budget '{}' not found", name))?;
    Ok(id)
}

pub fn trip_exists(conn: &Connection, trip_id: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM trips WHERE id=?1", params![trip_id], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}

// Locale setting
pub fn get_locale(conn: &Connection) -> Result<Locale> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key='locale'", [], |r| {
            r.get(0)
        })
        .optional()?;
    match v {
        Some(code) => Locale::from_code(&code)
            .with_context(|| format!("Invalid locale '{}' in settings", code)),
        None => Ok(Locale::default()),
    }
}

pub fn set_locale(conn: &Connection, locale: Locale) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES('locale', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![locale.code()],
    )?;
    Ok(())
}
