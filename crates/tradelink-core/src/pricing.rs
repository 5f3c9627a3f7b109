use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use tradelink_types::models::MembershipType;

/// Unit price of a lead before any membership discount.
pub const BASE_LEAD_PRICE: f64 = 9.99;

/// Fractional discount a tier gets on lead purchases.
pub fn lead_discount(membership: MembershipType) -> f64 {
    match membership {
        MembershipType::None => 0.0,
        MembershipType::Basic => 0.10,
        MembershipType::Premium => 0.25,
        MembershipType::Unlimited5Year => 1.0,
    }
}

/// Final charge for one lead purchase at the given tier.
pub fn lead_price(membership: MembershipType) -> f64 {
    match membership {
        MembershipType::Unlimited5Year => 0.0,
        tier => BASE_LEAD_PRICE * (1.0 - lead_discount(tier)),
    }
}

/// Subtract `amount` from a balance without going below zero.
pub fn deduct(credits: f64, amount: f64) -> f64 {
    (credits - amount).max(0.0)
}

/// Purchasable boost / membership plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoostPlan {
    OneWeek,
    OneMonth,
    ThreeMonth,
    FiveYearUnlimited,
}

impl BoostPlan {
    pub const ALL: [BoostPlan; 4] = [
        Self::OneWeek,
        Self::OneMonth,
        Self::ThreeMonth,
        Self::FiveYearUnlimited,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::OneWeek => "1 Week Boost",
            Self::OneMonth => "1 Month Boost",
            Self::ThreeMonth => "3 Month Boost",
            Self::FiveYearUnlimited => "5 Years Unlimited Leads",
        }
    }

    /// Listed price in GBP. Informational only, no payment is taken.
    pub fn price_gbp(self) -> f64 {
        match self {
            Self::OneWeek => 19.99,
            Self::OneMonth => 49.99,
            Self::ThreeMonth => 99.99,
            Self::FiveYearUnlimited => 995.0,
        }
    }

    /// Tier granted while the plan is running.
    pub fn membership(self) -> MembershipType {
        match self {
            Self::FiveYearUnlimited => MembershipType::Unlimited5Year,
            _ => MembershipType::Basic,
        }
    }

    pub fn expiry_from(self, start: DateTime<Utc>) -> DateTime<Utc> {
        let months = match self {
            Self::OneWeek => return start + Duration::days(7),
            Self::OneMonth => 1,
            Self::ThreeMonth => 3,
            Self::FiveYearUnlimited => 60,
        };
        start
            .checked_add_months(Months::new(months))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn tiered_lead_prices() {
        assert!(close(lead_price(MembershipType::None), 9.99));
        assert!(close(lead_price(MembershipType::Basic), 8.991));
        assert!(close(lead_price(MembershipType::Premium), 7.4925));
        assert_eq!(lead_price(MembershipType::Unlimited5Year), 0.0);
    }

    #[test]
    fn deduct_clamps_at_zero() {
        assert!(close(deduct(45.75, 7.4925), 38.2575));
        assert_eq!(deduct(5.0, 7.4925), 0.0);
        assert_eq!(deduct(0.0, 9.99), 0.0);
    }

    #[test]
    fn plan_expiry() {
        let start = Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();
        assert_eq!(
            BoostPlan::OneWeek.expiry_from(start),
            Utc.with_ymd_and_hms(2024, 2, 7, 12, 0, 0).unwrap()
        );
        // Month arithmetic clamps to the last day of the month.
        assert_eq!(
            BoostPlan::OneMonth.expiry_from(start),
            Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap()
        );
        assert_eq!(
            BoostPlan::FiveYearUnlimited.expiry_from(start),
            Utc.with_ymd_and_hms(2029, 1, 31, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn plan_tiers() {
        assert_eq!(BoostPlan::ThreeMonth.membership(), MembershipType::Basic);
        assert_eq!(
            BoostPlan::FiveYearUnlimited.membership(),
            MembershipType::Unlimited5Year
        );
    }
}
