// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Trip;
use crate::utils::{maybe_print_json, parse_date, pretty_table, required_arg};
use anyhow::{Result, bail};
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let id = required_arg(sub, "id")?;
            let n = conn.execute("DELETE FROM trips WHERE id=?1", params![id])?;
            if n == 0 {
                bail!("Trip '{}' not found", id);
            }
            println!("Removed trip '{}'", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = required_arg(sub, "id")?;
    let name = required_arg(sub, "name")?;
    if id.is_empty() {
        bail!("Trip id cannot be empty");
    }
    let departure = sub
        .get_one::<String>("departure")
        .map(|s| parse_date(s))
        .transpose()?;
    let return_date = sub
        .get_one::<String>("return")
        .map(|s| parse_date(s))
        .transpose()?;
    conn.execute(
        "INSERT INTO trips(id, name, departure, return_date) VALUES (?1, ?2, ?3, ?4)",
        params![
            id,
            name,
            departure.map(|d| d.to_string()),
            return_date.map(|d| d.to_string())
        ],
    )?;
    println!("Added trip '{}' ({})", id, name);
    Ok(())
}

pub fn list_trips(conn: &Connection) -> Result<Vec<Trip>> {
    let mut stmt =
        conn.prepare("SELECT id, name, departure, return_date FROM trips ORDER BY departure, id")?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, Option<String>>(2)?,
            r.get::<_, Option<String>>(3)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, name, departure, return_date) = row?;
        out.push(Trip {
            id,
            name,
            departure: departure.map(|d| parse_date(&d)).transpose()?,
            return_date: return_date.map(|d| parse_date(&d)).transpose()?,
        });
    }
    Ok(out)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let trips = list_trips(conn)?;
    if !maybe_print_json(sub.get_flag("json"), &trips)? {
        let rows = trips
            .into_iter()
            .map(|t| {
                vec![
                    t.id,
                    t.name,
                    t.departure.map(|d| d.to_string()).unwrap_or_default(),
                    t.return_date.map(|d| d.to_string()).unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Id", "Name", "Departure", "Return"], rows)
        );
    }
    Ok(())
}
