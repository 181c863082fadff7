//! Remaining-days maths and urgency tiers.

use chrono::NaiveDate;

use super::{Deal, Expiry};

/// Whole days from `today` until `expiry`, or `None` for a deal that never
/// expires.
///
/// Both sides are calendar dates, so there is no time-of-day or DST drift:
/// an expiry of today is `0` and tomorrow is exactly `1`.  Already-expired
/// dates come out negative.
pub fn remaining_days(expiry: Expiry, today: NaiveDate) -> Option<i64> {
    expiry.date().map(|date| (date - today).num_days())
}

/// How loudly a deal's expiry should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    /// Expires today (or is somehow already past).
    LastDay,
    Tomorrow,
    /// Two or three days left.
    Urgent,
    /// More than three days left, or no expiry at all.
    Normal,
}

impl Urgency {
    pub fn from_remaining(days: Option<i64>) -> Self {
        match days {
            Some(d) if d <= 0 => Self::LastDay,
            Some(1) => Self::Tomorrow,
            Some(2..=3) => Self::Urgent,
            _ => Self::Normal,
        }
    }
}

/// Render-time badge data for one deal.
///
/// Derived on every draw from the deal and the date its snapshot was
/// processed on; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub days_left: Option<i64>,
    pub urgency: Urgency,
}

impl Badge {
    pub fn for_deal(deal: &Deal, today: NaiveDate) -> Self {
        let days_left = remaining_days(deal.expiry, today);
        Self {
            days_left,
            urgency: Urgency::from_remaining(days_left),
        }
    }
}
