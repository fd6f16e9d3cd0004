// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Trip budget computation engine.
//!
//! A [`TripBudget`] owns every field of one budget record. Each write to a raw
//! field runs one complete recompute pass over the derived fields that read it
//! (directly or transitively) before returning, so callers never observe a
//! half-updated record. The only asynchronous input, the passenger aggregates
//! of the linked trip, enters through [`TripBudget::apply_fetch`] and is
//! dropped if the trip identifier has changed since the fetch started.

pub mod error;
pub mod field;
pub mod formulas;
pub mod graph;
pub mod real;
pub mod store;

pub use error::EngineError;
pub use field::{Category, Field, FieldKind, FieldRole};
pub use graph::DependencyGraph;
pub use real::{AggregateFetcher, FetchOutcome, FetchTicket, RealAggregates, RealState};
pub use store::{FieldStore, FieldValue};

use crate::numeric::{Locale, parse_currency, parse_date_text, parse_integer};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct BudgetSnapshot {
    pub locale: Locale,
    pub real_state: RealState,
    pub fields: BTreeMap<&'static str, FieldValue>,
}

#[derive(Debug, Clone)]
pub struct TripBudget {
    store: FieldStore,
    locale: Locale,
    real: RealState,
    next_generation: u64,
}

impl Default for TripBudget {
    fn default() -> Self {
        Self::new()
    }
}

impl TripBudget {
    pub fn new() -> Self {
        Self::with_locale(Locale::default())
    }

    pub fn with_locale(locale: Locale) -> Self {
        let mut budget = TripBudget {
            store: FieldStore::new(),
            locale,
            real: RealState::NoTrip,
            next_generation: 0,
        };
        budget.write_aggregates(&RealAggregates::default(), false);
        budget.recompute_all();
        budget
    }

    /// Rebuild a record from stored raw values. Derived fields are never
    /// trusted from storage; they are recomputed here.
    pub fn restore<I>(locale: Locale, entries: I) -> Self
    where
        I: IntoIterator<Item = (Field, FieldValue)>,
    {
        let mut budget = TripBudget::with_locale(locale);
        let mut trip_id = None;
        for (field, value) in entries {
            match field.role() {
                FieldRole::Raw if field == Field::TripId => {
                    trip_id = value.storage_text();
                }
                FieldRole::Raw => {
                    budget.store.set(field, value);
                }
                _ => debug!(field = field.key(), "ignoring stored non-raw field"),
            }
        }
        budget.write_trip_id(trip_id.as_deref());
        budget.recompute_all();
        budget
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn get(&self, field: Field) -> &FieldValue {
        self.store.get(field)
    }

    pub fn number(&self, field: Field) -> Decimal {
        self.store.number(field)
    }

    /// Value formatted for display in the record's locale.
    pub fn display(&self, field: Field) -> String {
        self.store.get(field).display(field.kind(), self.locale)
    }

    pub fn real_state(&self) -> &RealState {
        &self.real
    }

    pub fn trip_id(&self) -> Option<&str> {
        self.real.trip_id()
    }

    /// Parse `raw_text` into the raw field named `key` and recompute.
    ///
    /// Returns every field whose value changed, the written field included.
    pub fn set_field(&mut self, key: &str, raw_text: &str) -> Result<Vec<Field>, EngineError> {
        self.set_fields([(key, raw_text)])
    }

    /// Several raw writes followed by a single recompute pass. Nothing is
    /// written if any key is unknown or not writable.
    pub fn set_fields<I, K, V>(&mut self, entries: I) -> Result<Vec<Field>, EngineError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut resolved = Vec::new();
        for (key, text) in entries {
            let field = writable_field(key.as_ref())?;
            resolved.push((field, text.as_ref().to_string()));
        }

        let mut changed = Vec::new();
        for (field, text) in resolved {
            if field == Field::TripId {
                for f in self.write_trip_id(Some(&text)) {
                    push_unique(&mut changed, f);
                }
                continue;
            }
            let value = self.parse_raw(field, &text);
            if self.store.set(field, value) {
                push_unique(&mut changed, field);
            }
        }
        Ok(self.recompute_from(changed))
    }

    /// Typed write, for callers that already hold a parsed value.
    pub fn set_value(&mut self, field: Field, value: FieldValue) -> Result<Vec<Field>, EngineError> {
        if field.role() != FieldRole::Raw {
            return Err(EngineError::ReadOnlyField(field.key()));
        }
        if field == Field::TripId {
            let text = value.storage_text();
            let changed = self.write_trip_id(text.as_deref());
            return Ok(self.recompute_from(changed));
        }
        let changed = if self.store.set(field, value) {
            vec![field]
        } else {
            Vec::new()
        };
        Ok(self.recompute_from(changed))
    }

    /// Link the record to a trip (or unlink it with `None`).
    ///
    /// A new identifier zeroes the real aggregates and returns the ticket for
    /// the fetch the caller should now run. Re-linking the current trip is a
    /// no-op.
    pub fn set_trip_identifier(&mut self, trip_id: Option<&str>) -> Option<FetchTicket> {
        let changed = self.write_trip_id(trip_id);
        self.recompute_from(changed);
        self.pending_fetch()
    }

    /// Start a new fetch for the current trip, keeping the aggregates already
    /// applied until it resolves.
    pub fn refresh_real(&mut self) -> Option<FetchTicket> {
        let trip_id = self.real.trip_id()?.to_string();
        self.next_generation += 1;
        self.real = RealState::Fetching {
            trip_id,
            generation: self.next_generation,
        };
        self.pending_fetch()
    }

    pub fn pending_fetch(&self) -> Option<FetchTicket> {
        match &self.real {
            RealState::Fetching {
                trip_id,
                generation,
            } => Some(FetchTicket {
                trip_id: trip_id.clone(),
                generation: *generation,
            }),
            _ => None,
        }
    }

    /// Apply the result of the fetch identified by `ticket`.
    pub fn apply_fetch(
        &mut self,
        ticket: &FetchTicket,
        result: Result<RealAggregates, EngineError>,
    ) -> FetchOutcome {
        let current = matches!(
            &self.real,
            RealState::Fetching { trip_id, generation }
                if *generation == ticket.generation && *trip_id == ticket.trip_id
        );
        if !current {
            debug!(
                trip_id = %ticket.trip_id,
                generation = ticket.generation,
                "discarding aggregates of a superseded fetch"
            );
            return FetchOutcome::Stale;
        }

        self.real = RealState::Ready {
            trip_id: ticket.trip_id.clone(),
        };
        match result {
            Ok(aggregates) => {
                debug!(
                    trip_id = %ticket.trip_id,
                    count = aggregates.count,
                    "applying real aggregates"
                );
                let changed = self.write_aggregates(&aggregates, true);
                FetchOutcome::Applied {
                    changed: self.recompute_from(changed),
                }
            }
            Err(error) => {
                warn!(trip_id = %ticket.trip_id, %error, "real aggregates unavailable, using zeros");
                let changed = self.write_aggregates(&RealAggregates::default(), true);
                FetchOutcome::FellBackToZero {
                    changed: self.recompute_from(changed),
                    error,
                }
            }
        }
    }

    /// Run the pending fetch, if any, against `fetcher` and apply it.
    pub fn fetch_real(&mut self, fetcher: &dyn AggregateFetcher) -> FetchOutcome {
        let Some(ticket) = self.pending_fetch() else {
            return FetchOutcome::Idle;
        };
        let result = fetcher.fetch_real_aggregates(ticket.trip_id());
        self.apply_fetch(&ticket, result)
    }

    /// Recompute every derived field. Returns the ones that changed, which is
    /// empty for a record that is already consistent.
    pub fn recompute_all(&mut self) -> Vec<Field> {
        let graph = DependencyGraph::standard();
        let mut changed = Vec::new();
        for field in graph.order() {
            if let Some(formula) = graph.formula(*field) {
                let value = formula.evaluate(&self.store);
                if self.store.set(*field, FieldValue::Number(value)) {
                    changed.push(*field);
                }
            }
        }
        changed
    }

    pub fn snapshot(&self) -> BudgetSnapshot {
        BudgetSnapshot {
            locale: self.locale,
            real_state: self.real.clone(),
            fields: self.store.iter().map(|(f, v)| (f.key(), v.clone())).collect(),
        }
    }

    /// Non-empty raw values, the part of a record worth persisting.
    pub fn raw_values(&self) -> impl Iterator<Item = (Field, &FieldValue)> {
        self.store
            .iter()
            .filter(|(f, v)| f.role() == FieldRole::Raw && !v.is_empty())
    }

    fn recompute_from(&mut self, mut changed: Vec<Field>) -> Vec<Field> {
        if changed.is_empty() {
            return changed;
        }
        let graph = DependencyGraph::standard();
        let affected = graph.affected(&changed);
        debug!(
            inputs = changed.len(),
            derived = affected.len(),
            "recompute pass"
        );
        for field in affected {
            if let Some(formula) = graph.formula(field) {
                let value = formula.evaluate(&self.store);
                if self.store.set(field, FieldValue::Number(value)) {
                    push_unique(&mut changed, field);
                }
            }
        }
        changed
    }

    fn write_trip_id(&mut self, trip_id: Option<&str>) -> Vec<Field> {
        let next = trip_id.map(str::trim).filter(|s| !s.is_empty());
        let mut changed = Vec::new();
        let stored = next
            .map(|s| FieldValue::Text(s.to_string()))
            .unwrap_or(FieldValue::Empty);
        if self.store.set(Field::TripId, stored) {
            changed.push(Field::TripId);
        }
        if next == self.real.trip_id() {
            return changed;
        }

        match next {
            None => {
                info!("budget unlinked from trip");
                self.real = RealState::NoTrip;
            }
            Some(id) => {
                self.next_generation += 1;
                info!(trip_id = id, generation = self.next_generation, "budget linked to trip");
                self.real = RealState::Fetching {
                    trip_id: id.to_string(),
                    generation: self.next_generation,
                };
            }
        }
        for f in self.write_aggregates(&RealAggregates::default(), false) {
            push_unique(&mut changed, f);
        }
        changed
    }

    fn write_aggregates(&mut self, aggregates: &RealAggregates, ready: bool) -> Vec<Field> {
        let values = [
            (
                Field::RealDataReady,
                if ready { Decimal::ONE } else { Decimal::ZERO },
            ),
            (Field::RealPayingCount, Decimal::from(aggregates.count.max(0))),
            (Field::RealPromoDiscountSum, aggregates.promo_discount_sum),
            (Field::RealReferralDiscountSum, aggregates.referral_discount_sum),
        ];
        values
            .into_iter()
            .filter_map(|(field, value)| {
                self.store
                    .set(field, FieldValue::Number(value))
                    .then_some(field)
            })
            .collect()
    }

    fn parse_raw(&self, field: Field, text: &str) -> FieldValue {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return FieldValue::Empty;
        }
        let parsed = match field.kind() {
            FieldKind::Text => return FieldValue::Text(trimmed.to_string()),
            FieldKind::Money | FieldKind::Percent => {
                parse_currency(trimmed, self.locale).map(FieldValue::Number)
            }
            FieldKind::Count => {
                parse_integer(trimmed).map(|n| FieldValue::Number(Decimal::from(n)))
            }
            FieldKind::Date => parse_date_text(trimmed).map(FieldValue::Date),
        };
        parsed.unwrap_or_else(|| {
            debug!(field = field.key(), text = trimmed, "unparseable input reads as zero");
            FieldValue::Invalid(trimmed.to_string())
        })
    }
}

fn writable_field(key: &str) -> Result<Field, EngineError> {
    let field = Field::from_key(key).ok_or_else(|| EngineError::UnknownField(key.trim().to_string()))?;
    if field.role() != FieldRole::Raw {
        return Err(EngineError::ReadOnlyField(field.key()));
    }
    Ok(field)
}

fn push_unique(fields: &mut Vec<Field>, field: Field) {
    if !fields.contains(&field) {
        fields.push(field);
    }
}
