//! Raw snapshot → ordered, render-ready deal list.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::debug;

use super::{normalize, Deal};

/// One full delivery from the feed: opaque key → raw record, in feed order.
pub type RawSnapshot = Map<String, Value>;

/// Build the list of deals to show for `snapshot` as of `today`.
///
/// 1. Normalize every record.  Malformed ones are logged and skipped.
/// 2. Keep deals that are ready and not expired before `today`.
/// 3. Stable-sort by expiry, soonest first, never-expiring last.  Deals with
///    the same expiry keep their feed order.
///
/// `None` (the feed reported no collection) gives an empty list.  The input
/// is never modified, and the same inputs always give the same output.
pub fn project(snapshot: Option<&RawSnapshot>, today: NaiveDate) -> Vec<Deal> {
    let Some(snapshot) = snapshot else {
        return Vec::new();
    };

    let mut deals: Vec<Deal> = snapshot
        .iter()
        .filter_map(|(id, raw)| match normalize(id, raw) {
            Ok(deal) => Some(deal),
            Err(e) => {
                debug!(id = %id, error = %e, "skipping malformed deal");
                None
            }
        })
        .filter(|deal| deal.is_visible_on(today))
        .collect();

    // `sort_by_key` is stable.
    deals.sort_by_key(|deal| deal.expiry);
    deals
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::{remaining_days, Badge, Expiry, Urgency};
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn snapshot(value: Value) -> RawSnapshot {
        match value {
            Value::Object(map) => map,
            other => panic!("test snapshot must be an object, got {other}"),
        }
    }

    fn ids(deals: &[Deal]) -> Vec<&str> {
        deals.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn ready_dated_deal_precedes_undated_and_unready_is_dropped() {
        let raw = snapshot(json!({
            "A": { "title": "X", "isReady": "true", "expiryDate": "2999-01-01" },
            "B": { "title": "Y", "isready": "true" },
            "C": { "title": "Z", "isReady": "false", "expiryDate": "2999-01-01" }
        }));

        let deals = project(Some(&raw), date(2025, 6, 1));
        assert_eq!(ids(&deals), ["A", "B"]);
    }

    #[test]
    fn deal_expiring_today_is_kept_with_last_day_badge() {
        let today = date(2025, 6, 1);
        let raw = snapshot(json!({
            "today": { "title": "Ends now", "isReady": "true", "expiryDate": "2025-06-01" },
            "gone": { "title": "Ended", "isReady": "true", "expiryDate": "2025-05-31" }
        }));

        let deals = project(Some(&raw), today);
        assert_eq!(ids(&deals), ["today"]);
        assert_eq!(remaining_days(deals[0].expiry, today), Some(0));
        assert_eq!(Badge::for_deal(&deals[0], today).urgency, Urgency::LastDay);
    }

    #[test]
    fn malformed_records_do_not_stop_the_rest() {
        let raw = snapshot(json!({
            "no-fields": { "link": "https://shop.example" },
            "bad-type": { "title": ["nope"], "isReady": "true" },
            "not-a-record": 17,
            "bad-date": { "title": "?", "isReady": "true", "expiryDate": "someday" },
            "ok": { "title": "Fine", "isReady": true }
        }));

        let deals = project(Some(&raw), date(2025, 6, 1));
        assert_eq!(ids(&deals), ["ok"]);
    }

    #[test]
    fn absent_snapshot_is_an_empty_list() {
        assert!(project(None, date(2025, 1, 1)).is_empty());
        assert!(project(Some(&RawSnapshot::new()), date(2025, 1, 1)).is_empty());
    }

    #[test]
    fn output_is_sorted_with_undated_last() {
        let raw = snapshot(json!({
            "n1": { "isReady": "true" },
            "late": { "isReady": "true", "expiryDate": "2025-09-01" },
            "soon": { "isReady": "true", "expiryDate": "2025-06-03" },
            "n2": { "isReady": "true" },
            "mid": { "isReady": "true", "expiryDate": "2025-07-15" }
        }));

        let deals = project(Some(&raw), date(2025, 6, 1));
        assert_eq!(ids(&deals), ["soon", "mid", "late", "n1", "n2"]);

        let first_undated = deals.iter().position(|d| d.expiry == Expiry::Never).unwrap();
        assert!(deals[..first_undated].windows(2).all(|w| w[0].expiry <= w[1].expiry));
        assert!(deals[first_undated..].iter().all(|d| d.expiry == Expiry::Never));
    }

    #[test]
    fn equal_expiries_keep_feed_order() {
        let raw = snapshot(json!({
            "zulu": { "isReady": "true", "expiryDate": "2025-07-01" },
            "alpha": { "isReady": "true", "expiryDate": "2025-07-01" },
            "mike": { "isReady": "true", "expiryDate": "2025-07-01" }
        }));

        let deals = project(Some(&raw), date(2025, 6, 1));
        assert_eq!(ids(&deals), ["zulu", "alpha", "mike"]);
    }

    #[test]
    fn every_projected_deal_is_ready_and_live() {
        let today = date(2025, 6, 1);
        let raw = snapshot(json!({
            "a": { "isReady": "true", "expiryDate": "2025-05-01" },
            "b": { "isReady": "false" },
            "c": { "isready": "true", "expiryDate": "2025-06-02" },
            "d": {},
            "e": { "isReady": true, "expiryDate": "2026-01-01" }
        }));

        let deals = project(Some(&raw), today);
        assert!(deals.iter().all(|d| d.is_ready && d.expiry.is_live_on(today)));
        assert_eq!(ids(&deals), ["c", "e"]);
    }

    #[test]
    fn projection_is_deterministic_and_leaves_input_alone() {
        let raw = snapshot(json!({
            "a": { "title": "A", "isReady": "true", "expiryDate": "2025-08-01" },
            "b": { "title": "B", "isReady": "true" },
            "c": { "title": "C", "isReady": "true", "expiryDate": "2025-07-01" }
        }));
        let before = raw.clone();
        let today = date(2025, 6, 1);

        let first = project(Some(&raw), today);
        let second = project(Some(&raw), today);

        assert_eq!(first, second);
        assert_eq!(raw, before);
    }
}
