//! Raw record → [`Deal`].
//!
//! The upstream producer has drifted over time: readiness shows up as
//! `isReady` or `isready`, as a JSON boolean or as the strings
//! `"true"`/`"false"`.  All of that is folded into one strict boolean here so
//! nothing downstream has to care.

use std::borrow::Cow;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use super::{Deal, Expiry};
use crate::error::{kind_of, MalformedRecord};

/// Readiness keys in precedence order.
const READINESS_KEYS: [&str; 2] = ["isReady", "isready"];

/// Convert one raw feed record into a [`Deal`].
///
/// Missing fields are never an error: a missing title becomes `""`, missing
/// URLs become `None`, a missing readiness flag means "not ready" and a
/// missing (or empty) `expiryDate` means the deal never expires.  Only
/// records whose fields have the wrong JSON type, or whose expiry is not a
/// `YYYY-MM-DD` date, are rejected.
pub fn normalize(id: &str, raw: &Value) -> Result<Deal, MalformedRecord> {
    let record = raw
        .as_object()
        .ok_or(MalformedRecord::NotAnObject(kind_of(raw)))?;

    Ok(Deal {
        id: id.to_string(),
        title: text_field(record, "title")?.unwrap_or_default(),
        link: url_field(record, "link")?,
        final_link: url_field(record, "finalLink")?,
        image_url: url_field(record, "imageUrl")?,
        is_ready: is_ready(record),
        expiry: expiry_field(record)?,
    })
}

/// `isReady` wins over `isready`; a `null` value counts as absent.
///
/// The chosen value is ready iff its string form is exactly `"true"`: a JSON
/// `true` or the string `"true"`.  `"True"`, `" true"` and `1` are not.
pub fn is_ready(record: &Map<String, Value>) -> bool {
    READINESS_KEYS
        .iter()
        .find_map(|key| record.get(*key).filter(|value| !value.is_null()))
        .is_some_and(|value| string_form(value) == "true")
}

fn string_form(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        Value::Bool(b) => Cow::Owned(b.to_string()),
        Value::Number(n) => Cow::Owned(n.to_string()),
        _ => Cow::Borrowed(""),
    }
}

fn text_field(
    record: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, MalformedRecord> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(MalformedRecord::WrongType {
            field,
            found: kind_of(other),
        }),
    }
}

/// Empty URLs are treated as absent so `finalLink: ""` falls back to `link`.
fn url_field(
    record: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, MalformedRecord> {
    Ok(text_field(record, field)?.filter(|url| !url.is_empty()))
}

fn expiry_field(record: &Map<String, Value>) -> Result<Expiry, MalformedRecord> {
    match text_field(record, "expiryDate")? {
        None => Ok(Expiry::Never),
        Some(s) if s.is_empty() => Ok(Expiry::Never),
        Some(s) => parse_iso_date(&s)
            .map(Expiry::On)
            .ok_or(MalformedRecord::BadExpiry(s)),
    }
}

/// Strict fixed-width `YYYY-MM-DD`.
fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
