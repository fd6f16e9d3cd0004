// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::passengers::PassengerLedger;
use crate::engine::{Category, Field, FieldRole, FieldValue, TripBudget};
use crate::models::BudgetRecord;
use crate::utils::{
    get_locale, id_for_budget, maybe_print_json, pretty_table, required_arg, trip_exists,
};
use anyhow::{Context, Result, bail};
use rusqlite::{Connection, params};
use tracing::warn;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("new", sub)) => new(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("fields", sub)) => fields(sub)?,
        Some(("set", sub)) => set(conn, sub)?,
        Some(("link", sub)) => link(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("recompute", sub)) => recompute(conn, sub)?,
        Some(("rm", sub)) => {
            let name = required_arg(sub, "name")?;
            let id = id_for_budget(conn, &name)?;
            conn.execute("DELETE FROM budgets WHERE id=?1", params![id])?;
            println!("Removed budget '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

pub fn create_budget(conn: &Connection, name: &str, trip_id: Option<&str>) -> Result<i64> {
    if name.is_empty() {
        bail!("Budget name cannot be empty");
    }
    conn.execute("INSERT INTO budgets(name) VALUES (?1)", params![name])
        .with_context(|| format!("Could not create budget '{}'", name))?;
    let id = conn.last_insert_rowid();
    let mut budget = TripBudget::with_locale(get_locale(conn)?);
    if let Some(trip) = trip_id {
        budget.set_trip_identifier(Some(trip));
    }
    save_budget(conn, id, &budget)?;
    Ok(id)
}

/// Load the raw values of a budget and rebuild the record from them.
pub fn load_budget(conn: &Connection, name: &str) -> Result<(i64, TripBudget)> {
    let id = id_for_budget(conn, name)?;
    let locale = get_locale(conn)?;
    let mut stmt = conn.prepare("SELECT field, value FROM budget_fields WHERE budget_id=?1")?;
    let rows = stmt.query_map(params![id], |r| {
        Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
    })?;
    let mut entries = Vec::new();
    for row in rows {
        let (key, value) = row?;
        match Field::from_key(&key) {
            Some(field) => entries.push((field, FieldValue::from_storage(field.kind(), &value))),
            None => warn!(budget = name, field = %key, "skipping unknown stored field"),
        }
    }
    Ok((id, TripBudget::restore(locale, entries)))
}

/// Replace the stored raw values of a budget.
pub fn save_budget(conn: &Connection, id: i64, budget: &TripBudget) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM budget_fields WHERE budget_id=?1", params![id])?;
    {
        let mut stmt =
            tx.prepare("INSERT INTO budget_fields(budget_id, field, value) VALUES (?1, ?2, ?3)")?;
        for (field, value) in budget.raw_values() {
            if let Some(text) = value.storage_text() {
                stmt.execute(params![id, field.key(), text])?;
            }
        }
    }
    tx.execute(
        "UPDATE budgets SET updated_at=datetime('now') WHERE id=?1",
        params![id],
    )?;
    tx.commit()?;
    Ok(())
}

/// Load a budget and bring its real results up to date from the passenger table.
/// A failed lookup is logged by the engine and leaves zero aggregates.
pub fn open_budget(conn: &Connection, name: &str) -> Result<(i64, TripBudget)> {
    let (id, mut budget) = load_budget(conn, name)?;
    budget.fetch_real(&PassengerLedger::new(conn));
    Ok((id, budget))
}

pub fn parse_assignment(text: &str) -> Result<(String, String)> {
    let (key, value) = text
        .split_once('=')
        .with_context(|| format!("Expected KEY=VALUE, got '{}'", text))?;
    Ok((key.trim().to_string(), value.trim().to_string()))
}

fn new(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = required_arg(sub, "name")?;
    let trip = sub.get_one::<String>("trip").map(|s| s.trim().to_string());
    if let Some(ref t) = trip {
        if !trip_exists(conn, t)? {
            bail!("Trip '{}' not found", t);
        }
    }
    create_budget(conn, &name, trip.as_deref())?;
    println!("Created budget '{}'", name);
    Ok(())
}

pub fn list_budgets(conn: &Connection) -> Result<Vec<BudgetRecord>> {
    let mut stmt = conn.prepare(
        "SELECT b.id, b.name, f.value FROM budgets b
         LEFT JOIN budget_fields f ON f.budget_id=b.id AND f.field='trip_id'
         ORDER BY b.name",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(BudgetRecord {
            id: r.get(0)?,
            name: r.get(1)?,
            trip_id: r.get(2)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let budgets = list_budgets(conn)?;
    if !maybe_print_json(sub.get_flag("json"), &budgets)? {
        let rows = budgets
            .into_iter()
            .map(|b| vec![b.id.to_string(), b.name, b.trip_id.unwrap_or_default()])
            .collect();
        println!("{}", pretty_table(&["Id", "Name", "Trip"], rows));
    }
    Ok(())
}

fn category_filter(sub: &clap::ArgMatches) -> Result<Option<Category>> {
    sub.get_one::<String>("category")
        .map(|c| Category::from_key(c).with_context(|| format!("Unknown category '{}'", c.trim())))
        .transpose()
}

fn fields(sub: &clap::ArgMatches) -> Result<()> {
    let only = category_filter(sub)?;
    let rows = Field::ALL
        .iter()
        .filter(|f| only.is_none_or(|c| f.category() == c))
        .map(|f| {
            vec![
                f.key().to_string(),
                f.category().label().to_string(),
                format!("{:?}", f.kind()).to_lowercase(),
                format!("{:?}", f.role()).to_lowercase(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Key", "Category", "Kind", "Role"], rows)
    );
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = required_arg(sub, "name")?;
    let assignments = sub
        .get_many::<String>("field")
        .into_iter()
        .flatten()
        .map(|s| parse_assignment(s))
        .collect::<Result<Vec<_>>>()?;

    let (id, mut budget) = open_budget(conn, &name)?;
    let mut changed = budget.set_fields(assignments)?;
    let outcome = budget.fetch_real(&PassengerLedger::new(conn));
    for f in outcome.changed() {
        if !changed.contains(f) {
            changed.push(*f);
        }
    }
    save_budget(conn, id, &budget)?;

    let rows = changed
        .iter()
        .filter(|f| f.role() != FieldRole::Aggregate)
        .map(|f| vec![f.key().to_string(), budget.display(*f)])
        .collect();
    println!("{}", pretty_table(&["Field", "Value"], rows));
    Ok(())
}

fn link(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = required_arg(sub, "name")?;
    let trip = sub.get_one::<String>("trip").map(|s| s.trim().to_string());
    if trip.is_none() && !sub.get_flag("clear") {
        bail!("Pass --trip ID or --clear");
    }
    if let Some(ref t) = trip {
        if !trip_exists(conn, t)? {
            bail!("Trip '{}' not found", t);
        }
    }

    let (id, mut budget) = load_budget(conn, &name)?;
    budget.set_trip_identifier(trip.as_deref());
    budget.fetch_real(&PassengerLedger::new(conn));
    save_budget(conn, id, &budget)?;
    match trip {
        Some(t) => println!(
            "Linked '{}' to trip '{}' ({} paying passengers)",
            name,
            t,
            budget.display(Field::RealPayingCount)
        ),
        None => println!("Unlinked '{}'", name),
    }
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = required_arg(sub, "name")?;
    let only = category_filter(sub)?;
    let (_, budget) = open_budget(conn, &name)?;

    if sub.get_flag("json") {
        maybe_print_json(true, &budget.snapshot())?;
        return Ok(());
    }

    let mut rows = Vec::new();
    for category in Category::ALL {
        if only.is_some_and(|c| c != category) {
            continue;
        }
        for field in Field::in_category(category) {
            if field.role() == FieldRole::Raw && budget.get(field).is_empty() {
                continue;
            }
            let marker = match field.role() {
                FieldRole::Raw => "",
                FieldRole::Derived => "=",
                FieldRole::Aggregate => "*",
            };
            rows.push(vec![
                category.label().to_string(),
                field.key().to_string(),
                marker.to_string(),
                budget.display(field),
            ]);
        }
    }
    println!(
        "{}",
        pretty_table(&["Category", "Field", "", "Value"], rows)
    );
    Ok(())
}

fn recompute(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = required_arg(sub, "name")?;
    let (id, mut budget) = open_budget(conn, &name)?;
    let changed = budget.recompute_all();
    save_budget(conn, id, &budget)?;
    println!("Recomputed '{}': {} field(s) changed", name, changed.len());
    Ok(())
}
