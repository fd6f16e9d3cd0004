// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The category formulas, one row per derived field.
//!
//! A row names the fields it reads and how it combines them. The dependency
//! graph is built from these rows, so a formula can only ever see the inputs
//! it declares.

use super::field::Field::{self, *};
use super::field::FieldKind;
use super::store::FieldStore;
use crate::numeric::round_money;
use chrono::NaiveDate;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// Sum of the inputs, each floored at zero.
    Total,
    /// Product of the inputs, floored at zero.
    Line,
    /// Copy of the single input.
    Mirror,
    Custom(fn(&Inputs<'_>) -> Decimal),
}

#[derive(Debug)]
pub struct Formula {
    pub output: Field,
    pub inputs: &'static [Field],
    pub rule: Rule,
}

/// Read access to the declared inputs of one formula.
pub struct Inputs<'a> {
    store: &'a FieldStore,
    formula: &'a Formula,
}

impl Inputs<'_> {
    pub fn num(&self, field: Field) -> Decimal {
        debug_assert!(
            self.formula.inputs.contains(&field),
            "{} reads undeclared input {}",
            self.formula.output,
            field
        );
        self.store.number(field)
    }

    pub fn date(&self, field: Field) -> Option<NaiveDate> {
        debug_assert!(
            self.formula.inputs.contains(&field),
            "{} reads undeclared input {}",
            self.formula.output,
            field
        );
        self.store.date(field)
    }
}

impl Formula {
    pub fn evaluate(&self, store: &FieldStore) -> Decimal {
        let inputs = Inputs {
            store,
            formula: self,
        };
        let raw = match self.rule {
            Rule::Total => self
                .inputs
                .iter()
                .map(|f| store.number(*f).max(Decimal::ZERO))
                .fold(Decimal::ZERO, Decimal::saturating_add),
            Rule::Line => self
                .inputs
                .iter()
                .fold(Decimal::ONE, |acc, f| acc.saturating_mul(store.number(*f)))
                .max(Decimal::ZERO),
            Rule::Mirror => self
                .inputs
                .first()
                .map(|f| store.number(*f))
                .unwrap_or(Decimal::ZERO),
            Rule::Custom(compute) => compute(&inputs),
        };
        if self.output.kind() == FieldKind::Count {
            raw.trunc()
        } else {
            round_money(raw)
        }
    }
}

fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

// Formula arithmetic saturates at Decimal::MAX and Decimal::MIN; it never panics.

/// 0 when `denominator` is zero.
fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or_else(|| {
        if numerator.is_sign_negative() == denominator.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        }
    })
}

fn percent_of(value: Decimal, percent: Decimal) -> Decimal {
    value.saturating_mul(percent) / Decimal::ONE_HUNDRED
}

fn real_ready(i: &Inputs<'_>) -> bool {
    !i.num(RealDataReady).is_zero()
}

fn paying_seats(i: &Inputs<'_>) -> Decimal {
    non_negative(i.num(Seats).saturating_sub(i.num(NonPayingSeats)))
}

fn driver_meals_total(i: &Inputs<'_>) -> Decimal {
    let meals = non_negative(i.num(DriverLunches)).saturating_add(non_negative(i.num(DriverDinners)));
    non_negative(
        i.num(DriverCount)
            .saturating_mul(meals)
            .saturating_mul(i.num(DriverMealUnit)),
    )
}

fn lodging_nights(i: &Inputs<'_>) -> Decimal {
    match (i.date(DepartureDate), i.date(ReturnDate)) {
        (Some(depart), Some(back)) if back > depart => {
            let days = (back - depart).num_days();
            Decimal::from((days - 1).max(0))
        }
        _ => Decimal::ZERO,
    }
}

fn break_even(i: &Inputs<'_>) -> Decimal {
    ratio(i.num(TotalExpense), i.num(PayingCountResult))
}

fn suggested_price(i: &Inputs<'_>) -> Decimal {
    let break_even = i.num(BreakEven);
    break_even.saturating_add(percent_of(break_even, i.num(DesiredMarginPercent)))
}

fn revenue_total(i: &Inputs<'_>) -> Decimal {
    i.num(DefinedPrice).saturating_mul(i.num(PayingCountResult))
}

fn gross_profit(i: &Inputs<'_>) -> Decimal {
    i.num(RevenueTotal).saturating_sub(i.num(TotalExpense))
}

fn commission_per_ticket(i: &Inputs<'_>) -> Decimal {
    round_money(percent_of(i.num(DefinedPrice), i.num(CommissionPercent)))
}

fn max_commission(i: &Inputs<'_>) -> Decimal {
    i.num(CommissionPerTicket).saturating_mul(i.num(PayingCountResult))
}

fn net_profit(i: &Inputs<'_>) -> Decimal {
    i.num(GrossProfit).saturating_sub(i.num(MaxCommission))
}

fn real_expense(i: &Inputs<'_>) -> Decimal {
    if !real_ready(i) {
        return Decimal::ZERO;
    }
    i.num(TotalExpense)
}

fn minimum_paying_count(i: &Inputs<'_>) -> Decimal {
    let price = i.num(DefinedPrice);
    if !real_ready(i) || price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let to_cover = i
        .num(TotalExpense)
        .saturating_add(i.num(RealPromoDiscountSum))
        .saturating_add(i.num(RealReferralDiscountSum));
    non_negative(ratio(to_cover, price).ceil())
}

fn real_revenue(i: &Inputs<'_>) -> Decimal {
    if !real_ready(i) {
        return Decimal::ZERO;
    }
    i.num(RealPayingCount).saturating_mul(i.num(DefinedPrice))
}

fn real_gross_profit(i: &Inputs<'_>) -> Decimal {
    if !real_ready(i) {
        return Decimal::ZERO;
    }
    i.num(RealRevenue).saturating_sub(i.num(RealExpense))
}

fn real_net_profit(i: &Inputs<'_>) -> Decimal {
    if !real_ready(i) {
        return Decimal::ZERO;
    }
    i.num(RealGrossProfit)
        .saturating_sub(i.num(RealPromoDiscountSum))
        .saturating_sub(i.num(RealReferralDiscountSum))
}

const fn formula(output: Field, inputs: &'static [Field], rule: Rule) -> Formula {
    Formula {
        output,
        inputs,
        rule,
    }
}

pub static FORMULAS: &[Formula] = &[
    // Taxes
    formula(TaxesTotal, &[CityTax, OtherTaxes, Parking, LocalGuideTax], Rule::Total),
    // Transport seat accounting
    formula(NonPayingSeats, &[GuideSeats, PromotionalSeats, UnsoldSeats], Rule::Total),
    formula(PayingSeats, &[Seats, NonPayingSeats], Rule::Custom(paying_seats)),
    // Drivers
    formula(
        DriverMealsTotal,
        &[DriverCount, DriverLunches, DriverDinners, DriverMealUnit],
        Rule::Custom(driver_meals_total),
    ),
    formula(DriverTravelTotal, &[DriverTravelCount, DriverTravelUnit], Rule::Line),
    formula(DriversTotal, &[DriverMealsTotal, DriverTravelTotal], Rule::Total),
    // Transfers
    formula(Transfer1Total, &[Transfer1Qty, Transfer1Unit], Rule::Line),
    formula(Transfer2Total, &[Transfer2Qty, Transfer2Unit], Rule::Line),
    formula(Transfer3Total, &[Transfer3Qty, Transfer3Unit], Rule::Line),
    formula(TransfersTotal, &[Transfer1Total, Transfer2Total, Transfer3Total], Rule::Total),
    // Lodging
    // A negative seat or driver count adds nothing to the guest count.
    formula(LodgingGuests, &[Seats, DriverCount], Rule::Total),
    formula(LodgingNights, &[DepartureDate, ReturnDate], Rule::Custom(lodging_nights)),
    formula(
        LodgingStayTotal,
        &[LodgingNights, LodgingGuests, LodgingNightlyUnit],
        Rule::Line,
    ),
    formula(LodgingTotal, &[LodgingStayTotal, LodgingOtherValue], Rule::Total),
    // Tours
    formula(Tour1Total, &[Tour1Qty, Tour1Unit], Rule::Line),
    formula(Tour2Total, &[Tour2Qty, Tour2Unit], Rule::Line),
    formula(Tour3Total, &[Tour3Qty, Tour3Unit], Rule::Line),
    formula(ToursTotal, &[Tour1Total, Tour2Total, Tour3Total], Rule::Total),
    // Gifts and extras
    formula(GiftsTotal, &[GiftQty, GiftUnit], Rule::Line),
    formula(
        GiftsExtrasTotal,
        &[GiftsTotal, Extra1Value, Extra2Value, Extra3Value],
        Rule::Total,
    ),
    // Raffles
    formula(Raffle1Total, &[Raffle1Qty, Raffle1Unit], Rule::Line),
    formula(Raffle2Total, &[Raffle2Qty, Raffle2Unit], Rule::Line),
    formula(Raffle3Total, &[Raffle3Qty, Raffle3Unit], Rule::Line),
    formula(RafflesTotal, &[Raffle1Total, Raffle2Total, Raffle3Total], Rule::Total),
    // Miscellaneous and other revenue are taken as typed
    formula(MiscTotal, &[MiscValue], Rule::Total),
    formula(OtherRevenueTotal, &[OtherRevenueValue], Rule::Total),
    // Estimate
    formula(PayingCountResult, &[PayingSeats], Rule::Mirror),
    formula(
        TotalExpense,
        &[
            TaxesTotal,
            DriversTotal,
            TransfersTotal,
            LodgingTotal,
            ToursTotal,
            GiftsExtrasTotal,
            RafflesTotal,
            MiscTotal,
            Freight,
        ],
        Rule::Total,
    ),
    formula(BreakEven, &[TotalExpense, PayingCountResult], Rule::Custom(break_even)),
    formula(
        SuggestedPrice,
        &[BreakEven, DesiredMarginPercent],
        Rule::Custom(suggested_price),
    ),
    formula(
        RevenueTotal,
        &[DefinedPrice, PayingCountResult],
        Rule::Custom(revenue_total),
    ),
    formula(GrossProfit, &[RevenueTotal, TotalExpense], Rule::Custom(gross_profit)),
    formula(
        CommissionPerTicket,
        &[DefinedPrice, CommissionPercent],
        Rule::Custom(commission_per_ticket),
    ),
    formula(
        MaxCommission,
        &[CommissionPerTicket, PayingCountResult],
        Rule::Custom(max_commission),
    ),
    formula(NetProfit, &[GrossProfit, MaxCommission], Rule::Custom(net_profit)),
    // Real results, gated on the aggregates of the linked trip being applied
    formula(RealExpense, &[RealDataReady, TotalExpense], Rule::Custom(real_expense)),
    formula(
        MinimumPayingCount,
        &[
            RealDataReady,
            TotalExpense,
            RealPromoDiscountSum,
            RealReferralDiscountSum,
            DefinedPrice,
        ],
        Rule::Custom(minimum_paying_count),
    ),
    formula(
        RealRevenue,
        &[RealDataReady, RealPayingCount, DefinedPrice],
        Rule::Custom(real_revenue),
    ),
    formula(
        RealGrossProfit,
        &[RealDataReady, RealRevenue, RealExpense],
        Rule::Custom(real_gross_profit),
    ),
    formula(
        RealNetProfit,
        &[
            RealDataReady,
            RealGrossProfit,
            RealPromoDiscountSum,
            RealReferralDiscountSum,
        ],
        Rule::Custom(real_net_profit),
    ),
];
