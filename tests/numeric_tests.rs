// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tripbudget::numeric::{
    Locale, format_currency, format_date, parse_currency, parse_date_text, parse_integer,
};

fn dec(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

#[test]
fn pt_br_currency_text() {
    let pt = Locale::PtBr;
    assert_eq!(parse_currency("R$ 1.234,56", pt), Some(dec("1234.56")));
    assert_eq!(parse_currency("1234,5", pt), Some(dec("1234.5")));
    assert_eq!(parse_currency("  150 ", pt), Some(dec("150")));
    assert_eq!(parse_currency("-R$ 10,00", pt), Some(dec("-10.00")));
    assert_eq!(parse_currency("R$ -10,00", pt), Some(dec("-10.00")));
    // dot is the grouping separator here
    assert_eq!(parse_currency("1.500", pt), Some(dec("1500")));
}

#[test]
fn unparseable_currency_is_none() {
    let pt = Locale::PtBr;
    for text in [
        "", "   ", "R$", "abc", "1,2,3", "12a", ",", "--5", "1.5", "12.34", "1.2345", "1.23,4",
        ".500", "1.000,0.5",
    ] {
        assert_eq!(parse_currency(text, pt), None, "{:?} should not parse", text);
    }
}

#[test]
fn en_us_currency_text() {
    let en = Locale::EnUs;
    assert_eq!(parse_currency("$1,234.56", en), Some(dec("1234.56")));
    assert_eq!(parse_currency("US$ 99.9", en), Some(dec("99.9")));
    assert_eq!(parse_currency("1.2.3", en), None);
    // a pt-BR decimal comma is not a thousands separator
    assert_eq!(parse_currency("1,5", en), None);
    assert_eq!(parse_currency("12,34", en), None);
    assert_eq!(parse_currency("12,345,678.9", en), Some(dec("12345678.9")));
}

#[test]
fn currency_formatting_groups_and_rounds() {
    assert_eq!(format_currency(dec("1234567.891"), Locale::PtBr), "1.234.567,89");
    assert_eq!(format_currency(dec("1234567.891"), Locale::EnUs), "1,234,567.89");
    assert_eq!(format_currency(dec("650"), Locale::PtBr), "650,00");
    assert_eq!(format_currency(dec("0.005"), Locale::PtBr), "0,01");
    assert_eq!(format_currency(dec("-2600"), Locale::PtBr), "-2.600,00");
    assert_eq!(format_currency(dec("-0.001"), Locale::PtBr), "0,00");
    assert_eq!(format_currency(Decimal::ZERO, Locale::EnUs), "0.00");
}

#[test]
fn formatted_text_parses_back() {
    for locale in [Locale::PtBr, Locale::EnUs] {
        let text = format_currency(dec("98765.43"), locale);
        assert_eq!(parse_currency(&text, locale), Some(dec("98765.43")));
    }
}

#[test]
fn integers() {
    assert_eq!(parse_integer(" 42 "), Some(42));
    assert_eq!(parse_integer("-3"), Some(-3));
    assert_eq!(parse_integer("4.5"), None);
    assert_eq!(parse_integer(""), None);
}

#[test]
fn dates_in_both_forms() {
    let d = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();
    assert_eq!(parse_date_text("2025-07-10"), Some(d));
    assert_eq!(parse_date_text("10/07/2025"), Some(d));
    assert_eq!(parse_date_text("2025-13-01"), None);
    assert_eq!(format_date(d, Locale::PtBr), "10/07/2025");
    assert_eq!(format_date(d, Locale::EnUs), "2025-07-10");
}

#[test]
fn locale_codes() {
    assert_eq!(Locale::from_code("pt_BR"), Some(Locale::PtBr));
    assert_eq!(Locale::from_code(" EN-us "), Some(Locale::EnUs));
    assert_eq!(Locale::from_code("fr-FR"), None);
    assert_eq!(Locale::default().code(), "pt-BR");
}
