//! User-facing strings, per language.
//!
//! The set of languages ([`Language`]) and the set of strings ([`Key`]) are
//! both closed enums.  The built-in dictionaries are exhaustive `match`es,
//! so adding a key or a language without translating it fails to compile.
//! An optional JSON override table can replace built-in entries; it is
//! validated when loaded.  Lookups never fall back at runtime.
//!
//! Entries are either flat strings or templates with `{name}` placeholders
//! (see [`Key::placeholders`]).  Both kinds go through
//! [`LocaleTable::resolve`].

use std::collections::HashMap;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

use crate::error::LocaleError;

// ---------------------------------------------------------------------------
// Languages and keys
// ---------------------------------------------------------------------------

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Language {
    #[default]
    Hu,
    En,
    De,
}

impl Language {
    /// Lower-case language code, e.g. `"hu"`.
    pub fn code(self) -> &'static str {
        self.into()
    }

    /// The next language in declaration order, wrapping around.
    pub fn next(self) -> Self {
        let all: Vec<Self> = Self::iter().collect();
        let i = all.iter().position(|l| *l == self).unwrap_or(0);
        all[(i + 1) % all.len()]
    }
}

/// Identifier of one user-facing string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Key {
    AppTitle,
    AppSubtitle,
    Loading,
    EmptyList,
    FeedError,
    BadgeLastDay,
    BadgeTomorrow,
    DaysLeft,
    NoExpiry,
    ExpiryLabel,
    NameLabel,
    CreatedLabel,
    ImageMissing,
    ExportTitle,
    Exporting,
    ExportDone,
    ExportFailed,
    DealCount,
    LanguageName,
    Help,
    Footer,
}

impl Key {
    /// Stable identifier used in override files, e.g. `"days_left"`.
    pub fn id(self) -> &'static str {
        self.into()
    }

    /// Placeholders every translation of this key must contain.
    pub fn placeholders(self) -> &'static [&'static str] {
        match self {
            Self::DaysLeft => &["days"],
            Self::CreatedLabel => &["date"],
            Self::ExportDone => &["path"],
            Self::ExportFailed => &["error"],
            Self::DealCount => &["count"],
            _ => &[],
        }
    }
}

/// A named value substituted into a templated entry.
#[derive(Debug, Clone)]
pub struct Arg {
    pub name: &'static str,
    pub value: String,
}

pub fn arg(name: &'static str, value: impl Display) -> Arg {
    Arg {
        name,
        value: value.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct LocaleTable {
    overrides: HashMap<(Language, Key), String>,
}

/// On-disk override format: `{ "<lang>": { "<key>": "<text>" } }`.
type OverrideFile = HashMap<String, HashMap<String, String>>;

impl LocaleTable {
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON override table.
    ///
    /// Unknown languages or keys are rejected, as are entries that drop a
    /// placeholder their key needs.  Entries not mentioned keep their
    /// built-in text.
    pub fn with_overrides_json(json: &str) -> Result<Self, LocaleError> {
        let file: OverrideFile = serde_json::from_str(json)?;
        let mut overrides = HashMap::new();

        for (lang_code, entries) in file {
            let language = Language::from_str(&lang_code)
                .map_err(|_| LocaleError::UnknownLanguage(lang_code.clone()))?;
            for (key_id, text) in entries {
                let key = Key::from_str(&key_id).map_err(|_| LocaleError::UnknownKey {
                    language: lang_code.clone(),
                    key: key_id.clone(),
                })?;
                check_placeholders(language, key, &text)?;
                overrides.insert((language, key), text);
            }
        }

        Ok(Self { overrides })
    }

    pub fn load(path: &Path) -> Result<Self, LocaleError> {
        let json = std::fs::read_to_string(path)?;
        Self::with_overrides_json(&json)
    }

    /// Check every entry of every language against its key's placeholders.
    pub fn validate(&self) -> Result<(), LocaleError> {
        for language in Language::iter() {
            for key in Key::iter() {
                check_placeholders(language, key, self.entry(language, key))?;
            }
        }
        Ok(())
    }

    /// The raw (unsubstituted) entry.
    pub fn entry(&self, language: Language, key: Key) -> &str {
        self.overrides
            .get(&(language, key))
            .map(String::as_str)
            .unwrap_or_else(|| builtin(language, key))
    }

    /// Resolve `key` in `language`, substituting `args` into its placeholders.
    pub fn resolve(&self, language: Language, key: Key, args: &[Arg]) -> String {
        let mut text = self.entry(language, key).to_string();
        for a in args {
            text = text.replace(&format!("{{{}}}", a.name), &a.value);
        }
        text
    }

    /// Shorthand for flat entries.
    pub fn text(&self, language: Language, key: Key) -> String {
        self.resolve(language, key, &[])
    }
}

fn check_placeholders(language: Language, key: Key, text: &str) -> Result<(), LocaleError> {
    match key
        .placeholders()
        .iter()
        .copied()
        .find(|p| !text.contains(&format!("{{{p}}}")))
    {
        Some(placeholder) => Err(LocaleError::MissingPlaceholder {
            language: language.code(),
            key: key.id(),
            placeholder,
        }),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Built-in dictionaries
// ---------------------------------------------------------------------------

fn builtin(language: Language, key: Key) -> &'static str {
    match language {
        Language::Hu => hu(key),
        Language::En => en(key),
        Language::De => de(key),
    }
}

fn hu(key: Key) -> &'static str {
    match key {
        Key::AppTitle => "Cashback Hub",
        Key::AppSubtitle => "Aktuális ajánlatok",
        Key::Loading => "Tartalom betöltése…",
        Key::EmptyList => "Jelenleg nincs elérhető ajánlat.",
        Key::FeedError => "Nem sikerült betölteni az ajánlatokat.",
        Key::BadgeLastDay => "Utolsó nap!",
        Key::BadgeTomorrow => "Holnap lejár",
        Key::DaysLeft => "Még {days} nap",
        Key::NoExpiry => "Nincs lejárat",
        Key::ExpiryLabel => "Lejárat",
        Key::NameLabel => "Ajánlat",
        Key::CreatedLabel => "Készült: {date}",
        Key::ImageMissing => "nincs kép",
        Key::ExportTitle => "Aktuális ajánlatok",
        Key::Exporting => "Exportálás…",
        Key::ExportDone => "Exportálva: {path}",
        Key::ExportFailed => "Az exportálás sikertelen: {error}",
        Key::DealCount => "{count} ajánlat",
        Key::LanguageName => "Magyar",
        Key::Help => "q: kilépés  ↑/↓: görgetés  l: nyelv  e: export  o: megnyitás",
        Key::Footer => "Biztonságos kapcsolat • Publikus hozzáférés",
    }
}

fn en(key: Key) -> &'static str {
    match key {
        Key::AppTitle => "Cashback Hub",
        Key::AppSubtitle => "Current offers",
        Key::Loading => "Loading content…",
        Key::EmptyList => "There are no offers right now.",
        Key::FeedError => "Could not load the offers.",
        Key::BadgeLastDay => "Last day!",
        Key::BadgeTomorrow => "Ends tomorrow",
        Key::DaysLeft => "{days} days left",
        Key::NoExpiry => "No expiry",
        Key::ExpiryLabel => "Expires",
        Key::NameLabel => "Offer",
        Key::CreatedLabel => "Created: {date}",
        Key::ImageMissing => "no image",
        Key::ExportTitle => "Current offers",
        Key::Exporting => "Exporting…",
        Key::ExportDone => "Exported to {path}",
        Key::ExportFailed => "Export failed: {error}",
        Key::DealCount => "{count} offers",
        Key::LanguageName => "English",
        Key::Help => "q: quit  ↑/↓: scroll  l: language  e: export  o: open",
        Key::Footer => "Secure connection • Public access",
    }
}

fn de(key: Key) -> &'static str {
    match key {
        Key::AppTitle => "Cashback Hub",
        Key::AppSubtitle => "Aktuelle Angebote",
        Key::Loading => "Inhalte werden geladen…",
        Key::EmptyList => "Derzeit gibt es keine Angebote.",
        Key::FeedError => "Die Angebote konnten nicht geladen werden.",
        Key::BadgeLastDay => "Letzter Tag!",
        Key::BadgeTomorrow => "Endet morgen",
        Key::DaysLeft => "Noch {days} Tage",
        Key::NoExpiry => "Kein Ablaufdatum",
        Key::ExpiryLabel => "Gültig bis",
        Key::NameLabel => "Angebot",
        Key::CreatedLabel => "Erstellt: {date}",
        Key::ImageMissing => "kein Bild",
        Key::ExportTitle => "Aktuelle Angebote",
        Key::Exporting => "Export läuft…",
        Key::ExportDone => "Exportiert nach {path}",
        Key::ExportFailed => "Export fehlgeschlagen: {error}",
        Key::DealCount => "{count} Angebote",
        Key::LanguageName => "Deutsch",
        Key::Help => "q: Beenden  ↑/↓: Blättern  l: Sprache  e: Export  o: Öffnen",
        Key::Footer => "Sichere Verbindung • Öffentlicher Zugang",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_is_complete_and_valid() {
        let table = LocaleTable::builtin();
        table.validate().unwrap();
        for language in Language::iter() {
            for key in Key::iter() {
                assert!(
                    !table.entry(language, key).is_empty(),
                    "{}/{} is empty",
                    language.code(),
                    key.id()
                );
            }
        }
    }

    #[test]
    fn flat_and_templated_entries_resolve_the_same_way() {
        let table = LocaleTable::builtin();
        assert_eq!(table.text(Language::En, Key::BadgeLastDay), "Last day!");
        assert_eq!(
            table.resolve(Language::En, Key::DaysLeft, &[arg("days", 3)]),
            "3 days left"
        );
        assert_eq!(
            table.resolve(Language::Hu, Key::DaysLeft, &[arg("days", 5)]),
            "Még 5 nap"
        );
    }

    #[test]
    fn language_codes_parse_case_insensitively() {
        assert_eq!(Language::from_str("hu").unwrap(), Language::Hu);
        assert_eq!(Language::from_str("EN").unwrap(), Language::En);
        assert!(Language::from_str("fr").is_err());
        assert_eq!(Language::De.code(), "de");
    }

    #[test]
    fn next_language_cycles_through_all() {
        assert_eq!(Language::Hu.next(), Language::En);
        assert_eq!(Language::En.next(), Language::De);
        assert_eq!(Language::De.next(), Language::Hu);
    }

    #[test]
    fn key_ids_are_snake_case() {
        assert_eq!(Key::DaysLeft.id(), "days_left");
        assert_eq!(Key::from_str("badge_last_day").unwrap(), Key::BadgeLastDay);
    }

    #[test]
    fn overrides_replace_only_named_entries() {
        let table = LocaleTable::with_overrides_json(
            r#"{ "en": { "app_title": "Deal Board", "days_left": "{days}d" } }"#,
        )
        .unwrap();

        assert_eq!(table.text(Language::En, Key::AppTitle), "Deal Board");
        assert_eq!(table.resolve(Language::En, Key::DaysLeft, &[arg("days", 2)]), "2d");
        assert_eq!(table.text(Language::Hu, Key::AppTitle), "Cashback Hub");
        table.validate().unwrap();
    }

    #[test]
    fn override_with_unknown_language_is_rejected() {
        let err = LocaleTable::with_overrides_json(r#"{ "fr": { "app_title": "x" } }"#).unwrap_err();
        assert!(matches!(err, LocaleError::UnknownLanguage(code) if code == "fr"));
    }

    #[test]
    fn override_with_unknown_key_is_rejected() {
        let err = LocaleTable::with_overrides_json(r#"{ "en": { "banner": "x" } }"#).unwrap_err();
        assert!(matches!(err, LocaleError::UnknownKey { key, .. } if key == "banner"));
    }

    #[test]
    fn override_missing_placeholder_is_rejected() {
        let err =
            LocaleTable::with_overrides_json(r#"{ "de": { "days_left": "bald" } }"#).unwrap_err();
        assert!(matches!(
            err,
            LocaleError::MissingPlaceholder { language: "de", key: "days_left", placeholder: "days" }
        ));
    }
}
