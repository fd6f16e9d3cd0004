// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Money,
    Percent,
    Count,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    /// Typed in by the user.
    Raw,
    /// Recomputed by the engine, never written by callers.
    Derived,
    /// Filled from the passenger records of the linked trip.
    Aggregate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    General,
    Taxes,
    Transport,
    Drivers,
    Transfers,
    Lodging,
    Tours,
    GiftsExtras,
    Raffles,
    Miscellaneous,
    OtherRevenue,
    Estimate,
    Real,
}

impl Category {
    pub const ALL: [Category; 13] = [
        Category::General,
        Category::Taxes,
        Category::Transport,
        Category::Drivers,
        Category::Transfers,
        Category::Lodging,
        Category::Tours,
        Category::GiftsExtras,
        Category::Raffles,
        Category::Miscellaneous,
        Category::OtherRevenue,
        Category::Estimate,
        Category::Real,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::General => "General",
            Category::Taxes => "Taxes",
            Category::Transport => "Transport",
            Category::Drivers => "Drivers",
            Category::Transfers => "Transfers",
            Category::Lodging => "Lodging",
            Category::Tours => "Tours",
            Category::GiftsExtras => "Gifts & Extras",
            Category::Raffles => "Raffles",
            Category::Miscellaneous => "Miscellaneous",
            Category::OtherRevenue => "Other Revenue",
            Category::Estimate => "Results (estimate)",
            Category::Real => "Results (real)",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Taxes => "taxes",
            Category::Transport => "transport",
            Category::Drivers => "drivers",
            Category::Transfers => "transfers",
            Category::Lodging => "lodging",
            Category::Tours => "tours",
            Category::GiftsExtras => "gifts_extras",
            Category::Raffles => "raffles",
            Category::Miscellaneous => "miscellaneous",
            Category::OtherRevenue => "other_revenue",
            Category::Estimate => "estimate",
            Category::Real => "real",
        }
    }

    pub fn from_key(key: &str) -> Option<Category> {
        let wanted = key.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Category::ALL.into_iter().find(|c| c.key() == wanted)
    }
}

macro_rules! field_catalogue {
    ($( $variant:ident => $key:literal, $kind:ident, $role:ident, $category:ident; )*) => {
        /// Every value a trip budget record holds.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Field {
            $( $variant, )*
        }

        impl Field {
            pub const ALL: &'static [Field] = &[ $( Field::$variant, )* ];

            pub fn key(self) -> &'static str {
                match self {
                    $( Field::$variant => $key, )*
                }
            }

            pub fn kind(self) -> FieldKind {
                match self {
                    $( Field::$variant => FieldKind::$kind, )*
                }
            }

            pub fn role(self) -> FieldRole {
                match self {
                    $( Field::$variant => FieldRole::$role, )*
                }
            }

            pub fn category(self) -> Category {
                match self {
                    $( Field::$variant => Category::$category, )*
                }
            }
        }
    };
}

field_catalogue! {
    TripId => "trip_id", Text, Raw, General;
    TripName => "trip_name", Text, Raw, General;
    DepartureDate => "departure_date", Date, Raw, General;
    ReturnDate => "return_date", Date, Raw, General;
    Notes => "notes", Text, Raw, General;

    CityTax => "city_tax", Money, Raw, Taxes;
    OtherTaxes => "other_taxes", Money, Raw, Taxes;
    Parking => "parking", Money, Raw, Taxes;
    LocalGuideTax => "local_guide_tax", Money, Raw, Taxes;
    TaxesTotal => "taxes_total", Money, Derived, Taxes;

    TransportCompany => "transport_company", Text, Raw, Transport;
    VehicleType => "vehicle_type", Text, Raw, Transport;
    Seats => "seats", Count, Raw, Transport;
    GuideSeats => "guide_seats", Count, Raw, Transport;
    PromotionalSeats => "promotional_seats", Count, Raw, Transport;
    UnsoldSeats => "unsold_seats", Count, Raw, Transport;
    Freight => "freight", Money, Raw, Transport;
    NonPayingSeats => "non_paying_seats", Count, Derived, Transport;
    PayingSeats => "paying_seats", Count, Derived, Transport;

    DriverCount => "driver_count", Count, Raw, Drivers;
    DriverLunches => "driver_lunches", Count, Raw, Drivers;
    DriverDinners => "driver_dinners", Count, Raw, Drivers;
    DriverMealUnit => "driver_meal_unit", Money, Raw, Drivers;
    DriverTravelCount => "driver_travel_count", Count, Raw, Drivers;
    DriverTravelUnit => "driver_travel_unit", Money, Raw, Drivers;
    DriverMealsTotal => "driver_meals_total", Money, Derived, Drivers;
    DriverTravelTotal => "driver_travel_total", Money, Derived, Drivers;
    DriversTotal => "drivers_total", Money, Derived, Drivers;

    Transfer1Description => "transfer1_description", Text, Raw, Transfers;
    Transfer1Qty => "transfer1_qty", Count, Raw, Transfers;
    Transfer1Unit => "transfer1_unit", Money, Raw, Transfers;
    Transfer1Total => "transfer1_total", Money, Derived, Transfers;
    Transfer2Description => "transfer2_description", Text, Raw, Transfers;
    Transfer2Qty => "transfer2_qty", Count, Raw, Transfers;
    Transfer2Unit => "transfer2_unit", Money, Raw, Transfers;
    Transfer2Total => "transfer2_total", Money, Derived, Transfers;
    Transfer3Description => "transfer3_description", Text, Raw, Transfers;
    Transfer3Qty => "transfer3_qty", Count, Raw, Transfers;
    Transfer3Unit => "transfer3_unit", Money, Raw, Transfers;
    Transfer3Total => "transfer3_total", Money, Derived, Transfers;
    TransfersTotal => "transfers_total", Money, Derived, Transfers;

    HotelName => "hotel_name", Text, Raw, Lodging;
    LodgingNightlyUnit => "lodging_nightly_unit", Money, Raw, Lodging;
    LodgingOtherDescription => "lodging_other_description", Text, Raw, Lodging;
    LodgingOtherValue => "lodging_other_value", Money, Raw, Lodging;
    LodgingGuests => "lodging_guests", Count, Derived, Lodging;
    LodgingNights => "lodging_nights", Count, Derived, Lodging;
    LodgingStayTotal => "lodging_stay_total", Money, Derived, Lodging;
    LodgingTotal => "lodging_total", Money, Derived, Lodging;

    Tour1Description => "tour1_description", Text, Raw, Tours;
    Tour1Qty => "tour1_qty", Count, Raw, Tours;
    Tour1Unit => "tour1_unit", Money, Raw, Tours;
    Tour1Total => "tour1_total", Money, Derived, Tours;
    Tour2Description => "tour2_description", Text, Raw, Tours;
    Tour2Qty => "tour2_qty", Count, Raw, Tours;
    Tour2Unit => "tour2_unit", Money, Raw, Tours;
    Tour2Total => "tour2_total", Money, Derived, Tours;
    Tour3Description => "tour3_description", Text, Raw, Tours;
    Tour3Qty => "tour3_qty", Count, Raw, Tours;
    Tour3Unit => "tour3_unit", Money, Raw, Tours;
    Tour3Total => "tour3_total", Money, Derived, Tours;
    ToursTotal => "tours_total", Money, Derived, Tours;

    GiftDescription => "gift_description", Text, Raw, GiftsExtras;
    GiftQty => "gift_qty", Count, Raw, GiftsExtras;
    GiftUnit => "gift_unit", Money, Raw, GiftsExtras;
    Extra1Description => "extra1_description", Text, Raw, GiftsExtras;
    Extra1Value => "extra1_value", Money, Raw, GiftsExtras;
    Extra2Description => "extra2_description", Text, Raw, GiftsExtras;
    Extra2Value => "extra2_value", Money, Raw, GiftsExtras;
    Extra3Description => "extra3_description", Text, Raw, GiftsExtras;
    Extra3Value => "extra3_value", Money, Raw, GiftsExtras;
    GiftsTotal => "gifts_total", Money, Derived, GiftsExtras;
    GiftsExtrasTotal => "gifts_extras_total", Money, Derived, GiftsExtras;

    Raffle1Description => "raffle1_description", Text, Raw, Raffles;
    Raffle1Qty => "raffle1_qty", Count, Raw, Raffles;
    Raffle1Unit => "raffle1_unit", Money, Raw, Raffles;
    Raffle1Total => "raffle1_total", Money, Derived, Raffles;
    Raffle2Description => "raffle2_description", Text, Raw, Raffles;
    Raffle2Qty => "raffle2_qty", Count, Raw, Raffles;
    Raffle2Unit => "raffle2_unit", Money, Raw, Raffles;
    Raffle2Total => "raffle2_total", Money, Derived, Raffles;
    Raffle3Description => "raffle3_description", Text, Raw, Raffles;
    Raffle3Qty => "raffle3_qty", Count, Raw, Raffles;
    Raffle3Unit => "raffle3_unit", Money, Raw, Raffles;
    Raffle3Total => "raffle3_total", Money, Derived, Raffles;
    RafflesTotal => "raffles_total", Money, Derived, Raffles;

    MiscDescription => "misc_description", Text, Raw, Miscellaneous;
    MiscValue => "misc_value", Money, Raw, Miscellaneous;
    MiscTotal => "misc_total", Money, Derived, Miscellaneous;

    OtherRevenueDescription => "other_revenue_description", Text, Raw, OtherRevenue;
    OtherRevenueValue => "other_revenue_value", Money, Raw, OtherRevenue;
    OtherRevenueTotal => "other_revenue_total", Money, Derived, OtherRevenue;

    DesiredMarginPercent => "desired_margin_percent", Percent, Raw, Estimate;
    CommissionPercent => "commission_percent", Percent, Raw, Estimate;
    DefinedPrice => "defined_price", Money, Raw, Estimate;
    PayingCountResult => "paying_count_result", Count, Derived, Estimate;
    TotalExpense => "total_expense", Money, Derived, Estimate;
    BreakEven => "break_even", Money, Derived, Estimate;
    SuggestedPrice => "suggested_price", Money, Derived, Estimate;
    RevenueTotal => "revenue_total", Money, Derived, Estimate;
    GrossProfit => "gross_profit", Money, Derived, Estimate;
    CommissionPerTicket => "commission_per_ticket", Money, Derived, Estimate;
    MaxCommission => "max_commission", Money, Derived, Estimate;
    NetProfit => "net_profit", Money, Derived, Estimate;

    RealDataReady => "real_data_ready", Count, Aggregate, Real;
    RealPayingCount => "real_paying_count", Count, Aggregate, Real;
    RealPromoDiscountSum => "real_promo_discount_sum", Money, Aggregate, Real;
    RealReferralDiscountSum => "real_referral_discount_sum", Money, Aggregate, Real;
    RealExpense => "real_expense", Money, Derived, Real;
    MinimumPayingCount => "minimum_paying_count", Count, Derived, Real;
    RealRevenue => "real_revenue", Money, Derived, Real;
    RealGrossProfit => "real_gross_profit", Money, Derived, Real;
    RealNetProfit => "real_net_profit", Money, Derived, Real;
}

impl Field {
    pub fn from_key(key: &str) -> Option<Field> {
        let key = key.trim();
        Field::ALL.iter().copied().find(|f| f.key() == key)
    }

    pub fn in_category(category: Category) -> impl Iterator<Item = Field> {
        Field::ALL
            .iter()
            .copied()
            .filter(move |f| f.category() == category)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
