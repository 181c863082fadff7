//! Presentation state: what the screen shows, independent of how.
//!
//! [`PresentationState`] is mutated in exactly two ways: a feed delivery
//! ([`apply`](PresentationState::apply)) and a language switch
//! ([`set_language`](PresentationState::set_language)).  Everything else,
//! including badges and display strings, is derived on demand.
//!
//! ```text
//!            snapshot / null            snapshot / null
//! Loading ─────────────────────► Ready ◄────────────────┐
//!    │                             │  ▲                 │
//!    │ transport or payload error  │  │ snapshot / null │
//!    └───────────────────────────► Error ───────────────┘
//! ```

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{info, warn};

use crate::deal::{project, Badge, Deal, Urgency};
use crate::export::{ExportRequest, ExportRow};
use crate::feed::{into_snapshot, FeedMsg};
use crate::locale::{arg, Arg, Key, Language, LocaleTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
    Error,
}

pub struct PresentationState {
    locale: LocaleTable,
    language: Language,
    deals: Vec<Deal>,
    /// Date the current `deals` were projected for.  Only a new delivery
    /// moves it forward.
    today: NaiveDate,
    loading: bool,
    /// Underlying cause of the last failure, kept for logs and details.
    error: Option<String>,
}

impl PresentationState {
    pub fn new(locale: LocaleTable, language: Language, today: NaiveDate) -> Self {
        Self {
            locale,
            language,
            deals: Vec::new(),
            today,
            loading: true,
            error: None,
        }
    }

    // -- transitions ---------------------------------------------------------

    /// Handle one message from the feed, processed as of `today`.
    pub fn apply(&mut self, msg: FeedMsg, today: NaiveDate) {
        match msg {
            FeedMsg::Snapshot(value) => self.on_snapshot(value, today),
            FeedMsg::Error(cause) => self.on_failure(cause),
        }
    }

    /// Replace the list with the projection of `value`.
    ///
    /// `null` is an empty collection, not a failure.  A payload that is not
    /// a collection at all is a failure and leaves the previous list alone.
    pub fn on_snapshot(&mut self, value: Value, today: NaiveDate) {
        match into_snapshot(value) {
            Ok(snapshot) => {
                self.deals = project(snapshot.as_ref(), today);
                self.today = today;
                self.error = None;
                self.loading = false;
                info!(deals = self.deals.len(), %today, "snapshot applied");
            }
            Err(e) => self.on_failure(e.to_string()),
        }
    }

    /// Record a failure.  Deals from the last good delivery stay visible.
    pub fn on_failure(&mut self, cause: String) {
        warn!(error = %cause, kept = self.deals.len(), "feed delivery failed");
        self.error = Some(cause);
        self.loading = false;
    }

    /// Switch the display language.  The deal list is not recomputed.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn cycle_language(&mut self) {
        self.set_language(self.language.next());
    }

    // -- accessors -----------------------------------------------------------

    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Error
        } else {
            Phase::Ready
        }
    }

    pub fn deals(&self) -> &[Deal] {
        &self.deals
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error_cause(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The banner text for the current failure, in the current language.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|_| self.text(Key::FeedError))
    }

    // -- derived display data ------------------------------------------------

    pub fn text(&self, key: Key) -> String {
        self.locale.text(self.language, key)
    }

    pub fn resolve(&self, key: Key, args: &[Arg]) -> String {
        self.locale.resolve(self.language, key, args)
    }

    pub fn badge(&self, deal: &Deal) -> Badge {
        Badge::for_deal(deal, self.today)
    }

    /// Badge caption: "last day", "tomorrow", "N days left" or "no expiry".
    pub fn badge_text(&self, badge: &Badge) -> String {
        match (badge.urgency, badge.days_left) {
            (Urgency::LastDay, _) => self.text(Key::BadgeLastDay),
            (Urgency::Tomorrow, _) => self.text(Key::BadgeTomorrow),
            (_, Some(days)) => self.resolve(Key::DaysLeft, &[arg("days", days)]),
            (_, None) => self.text(Key::NoExpiry),
        }
    }

    pub fn expiry_text(&self, deal: &Deal) -> String {
        match deal.expiry.date() {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => self.text(Key::NoExpiry),
        }
    }

    /// The current list, as shown, ready for a document generator.
    pub fn export_request(&self, created: NaiveDate) -> ExportRequest {
        ExportRequest {
            title: self.text(Key::ExportTitle),
            created_label: self.resolve(
                Key::CreatedLabel,
                &[arg("date", created.format("%Y-%m-%d"))],
            ),
            name_label: self.text(Key::NameLabel),
            expiry_label: self.text(Key::ExpiryLabel),
            rows: self
                .deals
                .iter()
                .map(|deal| ExportRow {
                    name: deal.title.clone(),
                    expiry: self.expiry_text(deal),
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
