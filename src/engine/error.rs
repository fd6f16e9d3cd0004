// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Unknown field '{0}'")]
    UnknownField(String),
    #[error("Field '{0}' is computed and cannot be set directly")]
    ReadOnlyField(&'static str),
    #[error("Aggregate fetch for trip '{trip_id}' failed: {reason}")]
    AggregateFetch { trip_id: String, reason: String },
    #[error("Formula table is inconsistent: {0}")]
    FormulaTable(String),
}
