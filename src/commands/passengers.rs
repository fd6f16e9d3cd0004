// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::{AggregateFetcher, EngineError, RealAggregates};
use crate::models::Passenger;
use crate::numeric::format_currency;
use crate::utils::{get_locale, maybe_print_json, parse_money, pretty_table, required_arg, trip_exists};
use anyhow::{Context, Result, bail};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("cancel", sub)) => {
            let id: i64 = required_arg(sub, "id")?
                .parse()
                .context("Passenger id must be a number")?;
            let n = conn.execute(
                "UPDATE passengers SET status='cancelled' WHERE id=?1",
                params![id],
            )?;
            if n == 0 {
                bail!("Passenger {} not found", id);
            }
            println!("Cancelled passenger {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let trip_id = required_arg(sub, "trip")?;
    let name = required_arg(sub, "name")?;
    if !trip_exists(conn, &trip_id)? {
        bail!("Trip '{}' not found", trip_id);
    }
    let locale = get_locale(conn)?;
    let discount = |arg: &str| -> Result<Decimal> {
        match sub.get_one::<String>(arg) {
            Some(s) => parse_money(s, locale),
            None => Ok(Decimal::ZERO),
        }
    };
    let promo = discount("promo")?;
    let referral = discount("referral")?;
    conn.execute(
        "INSERT INTO passengers(trip_id, name, promo_discount, referral_discount) VALUES (?1, ?2, ?3, ?4)",
        params![trip_id, name, promo.to_string(), referral.to_string()],
    )?;
    println!("Added passenger '{}' to trip '{}'", name, trip_id);
    Ok(())
}

pub fn list_passengers(conn: &Connection, trip_id: &str) -> Result<Vec<Passenger>> {
    let mut stmt = conn.prepare(
        "SELECT id, trip_id, name, promo_discount, referral_discount, status
         FROM passengers WHERE trip_id=?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![trip_id], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, String>(5)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, trip_id, name, promo_s, referral_s, status) = row?;
        out.push(Passenger {
            id,
            trip_id,
            name,
            promo_discount: parse_stored_amount(&promo_s)?,
            referral_discount: parse_stored_amount(&referral_s)?,
            status,
        });
    }
    Ok(out)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let trip_id = required_arg(sub, "trip")?;
    let passengers = list_passengers(conn, &trip_id)?;
    if !maybe_print_json(sub.get_flag("json"), &passengers)? {
        let locale = get_locale(conn)?;
        let rows = passengers
            .into_iter()
            .map(|p| {
                vec![
                    p.id.to_string(),
                    p.name,
                    format_currency(p.promo_discount, locale),
                    format_currency(p.referral_discount, locale),
                    p.status,
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Id", "Name", "Promo", "Referral", "Status"], rows)
        );
    }
    Ok(())
}

fn parse_stored_amount(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid amount '{}' in passengers", s))
}

/// Count and discount sums of the active passengers of a trip. A trip with no
/// passengers (or no such trip) yields zeros.
pub fn real_aggregates(conn: &Connection, trip_id: &str) -> Result<RealAggregates> {
    let mut stmt = conn.prepare(
        "SELECT promo_discount, referral_discount FROM passengers
         WHERE trip_id=?1 AND status='active'",
    )?;
    let mut rows = stmt.query(params![trip_id])?;
    let mut totals = RealAggregates::default();
    while let Some(r) = rows.next()? {
        let promo_s: String = r.get(0)?;
        let referral_s: String = r.get(1)?;
        totals.count += 1;
        totals.promo_discount_sum = totals
            .promo_discount_sum
            .saturating_add(parse_stored_amount(&promo_s)?);
        totals.referral_discount_sum = totals
            .referral_discount_sum
            .saturating_add(parse_stored_amount(&referral_s)?);
    }
    Ok(totals)
}

/// Passenger table as the source of a budget's real results.
pub struct PassengerLedger<'a> {
    conn: &'a Connection,
}

impl<'a> PassengerLedger<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl AggregateFetcher for PassengerLedger<'_> {
    fn fetch_real_aggregates(&self, trip_id: &str) -> Result<RealAggregates, EngineError> {
        real_aggregates(self.conn, trip_id).map_err(|err| EngineError::AggregateFetch {
            trip_id: trip_id.to_string(),
            reason: format!("{:#}", err),
        })
    }
}
