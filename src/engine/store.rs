// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::field::{Field, FieldKind};
use crate::numeric::{Locale, format_currency, format_date};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Empty,
    Text(String),
    Number(Decimal),
    Date(NaiveDate),
    /// Text typed into a numeric or date field that did not parse. Reads as zero.
    Invalid(String),
}

impl FieldValue {
    pub fn number(&self) -> Decimal {
        match self {
            FieldValue::Number(n) => *n,
            _ => Decimal::ZERO,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }

    /// Locale-neutral text written to storage.
    pub fn storage_text(&self) -> Option<String> {
        match self {
            FieldValue::Empty => None,
            FieldValue::Text(s) | FieldValue::Invalid(s) => Some(s.clone()),
            FieldValue::Number(n) => Some(n.normalize().to_string()),
            FieldValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }

    pub fn from_storage(kind: FieldKind, text: &str) -> FieldValue {
        if text.is_empty() {
            return FieldValue::Empty;
        }
        match kind {
            FieldKind::Text => FieldValue::Text(text.to_string()),
            FieldKind::Money | FieldKind::Percent | FieldKind::Count => Decimal::from_str(text)
                .map(FieldValue::Number)
                .unwrap_or_else(|_| FieldValue::Invalid(text.to_string())),
            FieldKind::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map(FieldValue::Date)
                .unwrap_or_else(|_| FieldValue::Invalid(text.to_string())),
        }
    }

    pub fn display(&self, kind: FieldKind, locale: Locale) -> String {
        match self {
            FieldValue::Empty => String::new(),
            FieldValue::Text(s) | FieldValue::Invalid(s) => s.clone(),
            FieldValue::Date(d) => format_date(*d, locale),
            FieldValue::Number(n) => match kind {
                FieldKind::Count => n.trunc().to_string(),
                _ => format_currency(*n, locale),
            },
        }
    }
}

static EMPTY: FieldValue = FieldValue::Empty;

/// Current value of every field of one trip budget record.
///
/// The store does no validation and knows nothing about dependencies; it only
/// tells the caller whether a write changed anything.
#[derive(Debug, Clone, Default)]
pub struct FieldStore {
    values: HashMap<Field, FieldValue>,
}

impl FieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> &FieldValue {
        self.values.get(&field).unwrap_or(&EMPTY)
    }

    pub fn number(&self, field: Field) -> Decimal {
        self.get(field).number()
    }

    pub fn date(&self, field: Field) -> Option<NaiveDate> {
        self.get(field).date()
    }

    /// Returns `true` when the stored value differs from the previous one.
    pub fn set(&mut self, field: Field, value: FieldValue) -> bool {
        if self.get(field) == &value {
            return false;
        }
        if value.is_empty() {
            self.values.remove(&field);
        } else {
            self.values.insert(field, value);
        }
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldValue)> {
        Field::ALL.iter().map(move |f| (*f, self.get(*f)))
    }
}
