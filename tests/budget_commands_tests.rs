// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use tempfile::NamedTempFile;
use tripbudget::commands::{budgets, config, doctor, passengers, trips};
use tripbudget::engine::{AggregateFetcher, Field, FieldValue, RealState};
use tripbudget::{cli, db};

fn dec(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute(
        "INSERT INTO trips(id, name, departure, return_date) VALUES('SERRA25','Serra Gaúcha','2025-07-10','2025-07-13')",
        [],
    )
    .unwrap();
    conn
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let matches =
        cli::build_cli().get_matches_from(std::iter::once("tripbudget").chain(args.iter().copied()));
    match matches.subcommand() {
        Some(("budget", m)) => budgets::handle(conn, m),
        Some(("passenger", m)) => passengers::handle(conn, m),
        Some(("trip", m)) => trips::handle(conn, m),
        Some(("config", m)) => config::handle(conn, m),
        _ => panic!("command not parsed: {:?}", args),
    }
}

fn stored_fields(conn: &Connection, name: &str) -> Vec<(String, String)> {
    let mut stmt = conn
        .prepare(
            "SELECT f.field, f.value FROM budget_fields f JOIN budgets b ON b.id=f.budget_id
             WHERE b.name=?1 ORDER BY f.field",
        )
        .unwrap();
    stmt.query_map(params![name], |r| Ok((r.get(0)?, r.get(1)?)))
        .unwrap()
        .map(|r| r.unwrap())
        .collect()
}

#[test]
fn budget_set_recomputes_and_stores_only_raw_values() {
    let conn = setup();
    run(&conn, &["budget", "new", "--name", " Serra "]).unwrap();
    run(
        &conn,
        &[
            "budget",
            "set",
            "--name",
            "Serra",
            "--field",
            "seats=40",
            "--field",
            " misc_value = 20.000,00 ",
            "--field",
            "desired_margin_percent=30",
        ],
    )
    .unwrap();

    let (_, budget) = budgets::load_budget(&conn, "Serra").unwrap();
    assert_eq!(budget.number(Field::BreakEven), dec("500"));
    assert_eq!(budget.number(Field::SuggestedPrice), dec("650"));

    let stored = stored_fields(&conn, "Serra");
    assert_eq!(
        stored,
        vec![
            ("desired_margin_percent".to_string(), "30".to_string()),
            ("misc_value".to_string(), "20000".to_string()),
            ("seats".to_string(), "40".to_string()),
        ]
    );
}

#[test]
fn budget_set_rejects_computed_fields() {
    let conn = setup();
    run(&conn, &["budget", "new", "--name", "Serra"]).unwrap();
    let err = run(
        &conn,
        &["budget", "set", "--name", "Serra", "--field", "break_even=1"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("computed"));

    let err = run(
        &conn,
        &["budget", "set", "--name", "Serra", "--field", "seats"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("KEY=VALUE"));
}

#[test]
fn passengers_feed_real_results() {
    let conn = setup();
    run(&conn, &["budget", "new", "--name", "Serra", "--trip", "SERRA25"]).unwrap();
    run(
        &conn,
        &[
            "budget", "set", "--name", "Serra", "--field", "seats=40", "--field",
            "misc_value=20000", "--field", "defined_price=650",
        ],
    )
    .unwrap();
    for (name, promo, referral) in [("Ana", "50,00", "0"), ("Bruno", "0", "25,50"), ("Caio", "10", "0")] {
        run(
            &conn,
            &[
                "passenger", "add", "--trip", "SERRA25", "--name", name, "--promo", promo,
                "--referral", referral,
            ],
        )
        .unwrap();
    }
    run(&conn, &["passenger", "cancel", "--id", " 3 "]).unwrap();

    let (_, budget) = budgets::open_budget(&conn, "Serra").unwrap();
    assert_eq!(
        budget.real_state(),
        &RealState::Ready {
            trip_id: "SERRA25".into()
        }
    );
    assert_eq!(budget.number(Field::RealPayingCount), dec("2"));
    assert_eq!(budget.number(Field::RealPromoDiscountSum), dec("50"));
    assert_eq!(budget.number(Field::RealReferralDiscountSum), dec("25.50"));
    assert_eq!(budget.number(Field::RealRevenue), dec("1300"));
    assert_eq!(budget.number(Field::RealNetProfit), dec("-18775.50"));
    // ceil(20075.50 / 650)
    assert_eq!(budget.number(Field::MinimumPayingCount), dec("31"));
}

#[test]
fn trip_without_passengers_yields_zero_aggregates() {
    let conn = setup();
    let totals = passengers::real_aggregates(&conn, "SERRA25").unwrap();
    assert_eq!(totals.count, 0);
    assert!(totals.promo_discount_sum.is_zero());
    assert!(totals.referral_discount_sum.is_zero());
    assert_eq!(passengers::real_aggregates(&conn, "NOPE").unwrap().count, 0);
}

#[test]
fn link_and_unlink() {
    let conn = setup();
    run(&conn, &["budget", "new", "--name", "Serra"]).unwrap();

    let err = run(&conn, &["budget", "link", "--name", "Serra", "--trip", "NOPE"]).unwrap_err();
    assert!(err.to_string().contains("not found"));

    run(&conn, &["budget", "link", "--name", "Serra", "--trip", "SERRA25"]).unwrap();
    let (_, budget) = budgets::load_budget(&conn, "Serra").unwrap();
    assert_eq!(budget.trip_id(), Some("SERRA25"));

    run(&conn, &["budget", "link", "--name", "Serra", "--clear"]).unwrap();
    let (_, budget) = budgets::load_budget(&conn, "Serra").unwrap();
    assert_eq!(budget.real_state(), &RealState::NoTrip);
    assert!(stored_fields(&conn, "Serra").is_empty());
}

#[test]
fn budgets_survive_reopening_the_database() {
    let file = NamedTempFile::new().unwrap();
    {
        let conn = Connection::open(file.path()).unwrap();
        db::init_schema(&conn).unwrap();
        let id = budgets::create_budget(&conn, "Praia", None).unwrap();
        let (_, mut budget) = budgets::load_budget(&conn, "Praia").unwrap();
        budget
            .set_fields([
                ("departure_date", "10/07/2025"),
                ("return_date", "2025-07-13"),
                ("seats", "34"),
                ("driver_count", "2"),
                ("lodging_nightly_unit", "150,00"),
                ("parking", "a lot"),
            ])
            .unwrap();
        budgets::save_budget(&conn, id, &budget).unwrap();
    }

    let conn = Connection::open(file.path()).unwrap();
    let (_, budget) = budgets::load_budget(&conn, "Praia").unwrap();
    assert_eq!(budget.number(Field::LodgingNights), dec("2"));
    assert_eq!(budget.number(Field::LodgingStayTotal), dec("10800"));
    assert_eq!(budget.get(Field::Parking), &FieldValue::Invalid("a lot".into()));
}

#[test]
fn locale_setting_changes_how_amounts_are_read() {
    let conn = setup();
    run(&conn, &["config", "locale", "--set", "en-US"]).unwrap();
    run(&conn, &["budget", "new", "--name", "Serra"]).unwrap();
    run(
        &conn,
        &["budget", "set", "--name", "Serra", "--field", "city_tax=1,234.50"],
    )
    .unwrap();
    let (_, budget) = budgets::load_budget(&conn, "Serra").unwrap();
    assert_eq!(budget.number(Field::TaxesTotal), dec("1234.50"));

    let err = run(&conn, &["config", "locale", "--set", "xx"]).unwrap_err();
    assert!(err.to_string().contains("Unsupported locale"));
}

#[test]
fn doctor_reports_broken_budget_rows() {
    let conn = setup();
    run(&conn, &["budget", "new", "--name", "Serra"]).unwrap();
    let id: i64 = conn
        .query_row("SELECT id FROM budgets WHERE name='Serra'", [], |r| r.get(0))
        .unwrap();
    for (field, value) in [
        ("trip_id", "GONE"),
        ("color", "blue"),
        ("seats", "forty"),
        ("break_even", "10"),
    ] {
        conn.execute(
            "INSERT INTO budget_fields(budget_id, field, value) VALUES (?1, ?2, ?3)",
            params![id, field, value],
        )
        .unwrap();
    }

    let issues: Vec<String> = doctor::diagnose(&conn)
        .unwrap()
        .into_iter()
        .map(|(issue, _)| issue)
        .collect();
    assert!(issues.contains(&"unknown_trip".to_string()));
    assert!(issues.contains(&"unknown_field".to_string()));
    assert!(issues.contains(&"unparseable_value".to_string()));
    assert!(issues.contains(&"stored_computed_field".to_string()));

    // loading still works; the bad rows read as zero or are skipped
    let (_, budget) = budgets::load_budget(&conn, "Serra").unwrap();
    assert_eq!(budget.number(Field::PayingSeats), Decimal::ZERO);
}

#[test]
fn passenger_for_unknown_trip_is_rejected() {
    let conn = setup();
    let err = run(
        &conn,
        &["passenger", "add", "--trip", "NOPE", "--name", "Ana"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn trips_round_trip_through_the_table() {
    let conn = setup();
    run(
        &conn,
        &["trip", "add", "--id", "RIO", "--name", "Rio", "--departure", "01/08/2025"],
    )
    .unwrap();
    let listed = trips::list_trips(&conn).unwrap();
    let rio = listed.iter().find(|t| t.id == "RIO").unwrap();
    assert_eq!(rio.departure.unwrap().to_string(), "2025-08-01");
    assert!(rio.return_date.is_none());
}

#[test]
fn unreadable_passenger_rows_fall_back_to_zero_aggregates() {
    let conn = setup();
    run(&conn, &["budget", "new", "--name", "Serra", "--trip", "SERRA25"]).unwrap();
    run(
        &conn,
        &["budget", "set", "--name", "Serra", "--field", "misc_value=1000"],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO passengers(trip_id, name, promo_discount) VALUES('SERRA25','Ana','abc')",
        [],
    )
    .unwrap();

    let ledger = passengers::PassengerLedger::new(&conn);
    assert!(ledger.fetch_real_aggregates("SERRA25").is_err());

    let (_, budget) = budgets::open_budget(&conn, "Serra").unwrap();
    assert_eq!(
        budget.real_state(),
        &RealState::Ready {
            trip_id: "SERRA25".into()
        }
    );
    assert_eq!(budget.number(Field::RealPayingCount), Decimal::ZERO);
    assert_eq!(budget.number(Field::RealExpense), dec("1000"));
}
