//! The deal pipeline: normalization, expiry maths and list projection.
//!
//! Everything in this module is pure.  A raw snapshot goes in together with
//! the date it was processed on, and an ordered list of [`Deal`]s comes out.
//! No state survives between calls, which is what lets the presentation
//! layer re-run the pipeline on every feed delivery.
//!
//! ```text
//! raw snapshot ──► normalize() ──► visible on today? ──► sort by expiry ──► Vec<Deal>
//!                  (per record)      (ready + unexpired)   (stable, Never last)
//! ```

mod expiry;
mod normalize;
mod project;

pub use expiry::{remaining_days, Badge, Urgency};
pub use normalize::{is_ready, normalize};
pub use project::{project, RawSnapshot};

use chrono::NaiveDate;

/// When a deal stops being shown.
///
/// `Never` is an explicit sentinel instead of a magic far-future date.
/// The derived [`Ord`] puts every `On(_)` before `Never`, so sorting by
/// `Expiry` sends never-expiring deals to the end of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Expiry {
    /// Last day the deal is valid (inclusive).
    On(NaiveDate),
    Never,
}

impl Expiry {
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            Self::On(date) => Some(date),
            Self::Never => None,
        }
    }

    /// An expiry of today still counts as live.
    pub fn is_live_on(self, today: NaiveDate) -> bool {
        match self {
            Self::On(date) => date >= today,
            Self::Never => true,
        }
    }
}

/// A promotional offer, normalised from one raw feed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deal {
    /// Feed-assigned key, unique within one snapshot.
    pub id: String,

    /// Display title.  Empty when the record has none.
    pub title: String,

    pub link: Option<String>,

    /// Tracked / resolved link, preferred over [`link`](Self::link).
    pub final_link: Option<String>,

    /// `None` means the UI shows a placeholder glyph instead.
    pub image_url: Option<String>,

    /// Publisher's "finalized" flag, coerced to a strict boolean.
    pub is_ready: bool,

    pub expiry: Expiry,
}

impl Deal {
    /// The link to open for this deal: `finalLink` when present, else `link`.
    pub fn preferred_link(&self) -> Option<&str> {
        self.final_link.as_deref().or(self.link.as_deref())
    }

    /// Ready and not yet expired on `today`.
    pub fn is_visible_on(&self, today: NaiveDate) -> bool {
        self.is_ready && self.expiry.is_live_on(today)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
