// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashSet;
use tripbudget::engine::formulas::{FORMULAS, Formula, Rule};
use tripbudget::engine::{DependencyGraph, EngineError, Field, FieldKind, FieldRole};

fn position(order: &[Field], field: Field) -> usize {
    order.iter().position(|f| *f == field).unwrap()
}

#[test]
fn built_in_formula_table_is_valid() {
    assert!(DependencyGraph::build(FORMULAS).is_ok());
}

#[test]
fn order_covers_each_derived_field_once() {
    let graph = DependencyGraph::standard();
    let order = graph.order();
    let unique: HashSet<Field> = order.iter().copied().collect();
    assert_eq!(unique.len(), order.len());

    let derived: HashSet<Field> = Field::ALL
        .iter()
        .copied()
        .filter(|f| f.role() == FieldRole::Derived)
        .collect();
    assert_eq!(unique, derived);
}

#[test]
fn every_field_comes_after_its_inputs() {
    let graph = DependencyGraph::standard();
    let order = graph.order();
    for field in order {
        for input in graph.inputs(*field) {
            if input.role() == FieldRole::Derived {
                assert!(
                    position(order, *input) < position(order, *field),
                    "{} must be computed before {}",
                    input,
                    field
                );
            }
        }
    }
}

#[test]
fn affected_is_transitive_and_ordered() {
    let graph = DependencyGraph::standard();
    let affected = graph.affected(&[Field::Seats]);

    for f in [
        Field::PayingSeats,
        Field::PayingCountResult,
        Field::BreakEven,
        Field::SuggestedPrice,
        Field::LodgingGuests,
        Field::LodgingStayTotal,
        Field::TotalExpense,
        Field::NetProfit,
        Field::RealNetProfit,
    ] {
        assert!(affected.contains(&f), "{} should be affected by seats", f);
    }
    assert!(!affected.contains(&Field::TaxesTotal));
    assert!(!affected.contains(&Field::NonPayingSeats));

    let before = |a, b| position(&affected, a) < position(&affected, b);
    assert!(before(Field::PayingSeats, Field::PayingCountResult));
    assert!(before(Field::LodgingStayTotal, Field::TotalExpense));
    assert!(before(Field::TotalExpense, Field::BreakEven));
}

#[test]
fn descriptive_fields_feed_nothing() {
    let graph = DependencyGraph::standard();
    for f in Field::ALL.iter().filter(|f| f.kind() == FieldKind::Text) {
        assert!(graph.dependents(*f).is_empty(), "{} should feed no formula", f);
        assert!(graph.affected(&[*f]).is_empty());
    }
}

#[test]
fn real_fields_depend_on_the_ready_flag() {
    let graph = DependencyGraph::standard();
    for f in [
        Field::RealExpense,
        Field::MinimumPayingCount,
        Field::RealRevenue,
        Field::RealGrossProfit,
        Field::RealNetProfit,
    ] {
        assert!(graph.inputs(f).contains(&Field::RealDataReady));
    }
}

static CYCLIC: &[Formula] = &[
    Formula {
        output: Field::TaxesTotal,
        inputs: &[Field::CityTax, Field::BreakEven],
        rule: Rule::Total,
    },
    Formula {
        output: Field::BreakEven,
        inputs: &[Field::TaxesTotal],
        rule: Rule::Mirror,
    },
];

static PARTIAL: &[Formula] = &[Formula {
    output: Field::TaxesTotal,
    inputs: &[Field::CityTax],
    rule: Rule::Total,
}];

static WRITES_RAW: &[Formula] = &[Formula {
    output: Field::CityTax,
    inputs: &[Field::Parking],
    rule: Rule::Mirror,
}];

#[test]
fn cycles_are_rejected() {
    match DependencyGraph::build(CYCLIC) {
        Err(EngineError::FormulaTable(msg)) => {
            assert!(msg.contains("cycle"));
            assert!(msg.contains("taxes_total"));
        }
        other => panic!("expected a cycle error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn derived_fields_without_formula_are_rejected() {
    let err = DependencyGraph::build(PARTIAL).map(|_| ()).unwrap_err();
    assert!(err.to_string().contains("no formula"));
}

#[test]
fn formulas_may_only_produce_derived_fields() {
    let err = DependencyGraph::build(WRITES_RAW).map(|_| ()).unwrap_err();
    assert!(err.to_string().contains("city_tax"));
}
