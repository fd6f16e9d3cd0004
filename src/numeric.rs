// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Text <-> number conversion at the edge of the budget engine.
//!
//! Everything here is lenient: callers get `None` back for text that does not
//! parse and decide for themselves what that means (the engine reads it as zero).

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const CURRENCY_SYMBOLS: [&str; 3] = ["R$", "US$", "$"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    /// `1.234,56`
    #[default]
    PtBr,
    /// `1,234.56`
    EnUs,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::PtBr => "pt-BR",
            Locale::EnUs => "en-US",
        }
    }

    pub fn from_code(code: &str) -> Option<Locale> {
        match code.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "pt-br" | "pt" => Some(Locale::PtBr),
            "en-us" | "en" => Some(Locale::EnUs),
            _ => None,
        }
    }

    pub fn decimal_separator(self) -> char {
        match self {
            Locale::PtBr => ',',
            Locale::EnUs => '.',
        }
    }

    pub fn group_separator(self) -> char {
        match self {
            Locale::PtBr => '.',
            Locale::EnUs => ',',
        }
    }
}

/// Parse localized currency text such as `R$ 1.234,56` or `-12,5`.
pub fn parse_currency(text: &str, locale: Locale) -> Option<Decimal> {
    let mut s = text.trim();
    let mut negative = false;
    if let Some(rest) = s.strip_prefix('-') {
        negative = true;
        s = rest.trim_start();
    }
    for symbol in CURRENCY_SYMBOLS {
        if let Some(rest) = s.strip_prefix(symbol) {
            s = rest.trim_start();
            break;
        }
    }
    if !negative {
        if let Some(rest) = s.strip_prefix('-') {
            negative = true;
            s = rest.trim_start();
        }
    }

    let dec = locale.decimal_separator();
    let grp = locale.group_separator();
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit() || c == dec || c == grp) {
        return None;
    }
    if s.matches(dec).count() > 1 || !s.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let (int_part, frac_part) = s.split_once(dec).unwrap_or((s, ""));
    if frac_part.contains(grp) || !well_grouped(int_part, grp) {
        return None;
    }

    let normalized: String = s
        .chars()
        .filter(|c| *c != grp)
        .map(|c| if c == dec { '.' } else { c })
        .collect();
    let value = Decimal::from_str(&normalized).ok()?;
    Some(if negative { -value } else { value })
}

/// `1.234.567` is grouped, `1.5` and `12.34` are not.
fn well_grouped(int_part: &str, grp: char) -> bool {
    if !int_part.contains(grp) {
        return true;
    }
    let mut groups = int_part.split(grp);
    let lead_ok = groups.next().is_some_and(|g| (1..=3).contains(&g.len()));
    lead_ok && groups.all(|g| g.len() == 3)
}

pub fn parse_integer(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok()
}

/// Accepts ISO dates and the `DD/MM/YYYY` form used on printed itineraries.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let s = text.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .ok()
}

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Two decimals, grouped by thousands according to `locale`.
pub fn format_currency(value: Decimal, locale: Locale) -> String {
    let rounded = round_money(value);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(locale.group_separator());
        }
        grouped.push(ch);
    }

    format!(
        "{}{}{}{}",
        if negative { "-" } else { "" },
        grouped,
        locale.decimal_separator(),
        frac_part
    )
}

pub fn format_date(date: NaiveDate, locale: Locale) -> String {
    match locale {
        Locale::PtBr => date.format("%d/%m/%Y").to_string(),
        Locale::EnUs => date.format("%Y-%m-%d").to_string(),
    }
}
