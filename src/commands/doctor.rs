// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::{Field, FieldRole, FieldValue};
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

/// Issues found in stored budgets, as (issue, detail) pairs.
pub fn diagnose(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut issues = Vec::new();

    // 1) Budgets linked to a trip that does not exist
    let mut stmt = conn.prepare(
        "SELECT b.name, f.value FROM budget_fields f
         JOIN budgets b ON b.id=f.budget_id
         WHERE f.field='trip_id' AND f.value NOT IN (SELECT id FROM trips)
         ORDER BY b.name",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let budget: String = r.get(0)?;
        let trip: String = r.get(1)?;
        issues.push(("unknown_trip".into(), format!("{}: {}", budget, trip)));
    }

    // 2) Stored keys the engine does not know, stored computed fields, and
    //    values that read as zero because they do not parse
    let mut stmt2 = conn.prepare(
        "SELECT b.name, f.field, f.value FROM budget_fields f
         JOIN budgets b ON b.id=f.budget_id
         ORDER BY b.name, f.field",
    )?;
    let mut cur2 = stmt2.query([])?;
    while let Some(r) = cur2.next()? {
        let budget: String = r.get(0)?;
        let key: String = r.get(1)?;
        let value: String = r.get(2)?;
        match Field::from_key(&key) {
            None => issues.push(("unknown_field".into(), format!("{}: {}", budget, key))),
            Some(field) if field.role() != FieldRole::Raw => {
                issues.push(("stored_computed_field".into(), format!("{}: {}", budget, key)))
            }
            Some(field) => {
                if let FieldValue::Invalid(text) = FieldValue::from_storage(field.kind(), &value)
                {
                    issues.push((
                        "unparseable_value".into(),
                        format!("{}: {} = '{}'", budget, key, text),
                    ));
                }
            }
        }
    }

    Ok(issues)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let issues = diagnose(conn)?;
    if issues.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        let rows = issues.into_iter().map(|(i, d)| vec![i, d]).collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
