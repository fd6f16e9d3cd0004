// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::error::EngineError;
use super::field::Field;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Passenger figures of one trip, as recorded so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealAggregates {
    pub count: i64,
    pub promo_discount_sum: Decimal,
    pub referral_discount_sum: Decimal,
}

/// Source of [`RealAggregates`] for a trip identifier.
///
/// Implementations return zeros for a trip without passenger records; an
/// `Err` means the lookup itself failed.
pub trait AggregateFetcher {
    fn fetch_real_aggregates(&self, trip_id: &str) -> Result<RealAggregates, EngineError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RealState {
    NoTrip,
    Fetching { trip_id: String, generation: u64 },
    Ready { trip_id: String },
}

impl RealState {
    pub fn trip_id(&self) -> Option<&str> {
        match self {
            RealState::NoTrip => None,
            RealState::Fetching { trip_id, .. } | RealState::Ready { trip_id } => Some(trip_id),
        }
    }
}

/// Handle for one aggregate fetch. Only the ticket matching the budget's
/// current fetch is accepted when the result comes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub(crate) trip_id: String,
    pub(crate) generation: u64,
}

impl FetchTicket {
    pub fn trip_id(&self) -> &str {
        &self.trip_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied { changed: Vec<Field> },
    /// The fetch failed; the real block was recomputed from zero aggregates.
    FellBackToZero { changed: Vec<Field>, error: EngineError },
    /// The trip identifier moved on before the result arrived.
    Stale,
    /// There was no fetch to run.
    Idle,
}

impl FetchOutcome {
    pub fn changed(&self) -> &[Field] {
        match self {
            FetchOutcome::Applied { changed } | FetchOutcome::FellBackToZero { changed, .. } => {
                changed
            }
            FetchOutcome::Stale | FetchOutcome::Idle => &[],
        }
    }

    pub fn warning(&self) -> Option<&EngineError> {
        match self {
            FetchOutcome::FellBackToZero { error, .. } => Some(error),
            _ => None,
        }
    }
}
