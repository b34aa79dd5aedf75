//! Display labels for seeded records.
//!
//! Only the handful of keys used for role, priority and query names are
//! carried here. A key missing from the selected locale resolves to the
//! caller's default text, then to English, then to the key itself.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Locale used when the requested one is unsupported.
pub const DEFAULT_LOCALE: &str = "en";

/// A selected locale code such as `en` or `de`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LOCALE.to_string())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps a symbolic key to a display string under a locale.
pub trait LabelResolver {
    /// Whether the resolver has a table for `code`.
    fn supports(&self, code: &str) -> bool;

    /// Resolve `key` under `locale`, falling back to `default` when the
    /// locale has no entry.
    fn resolve(&self, key: &str, locale: &Locale, default: Option<&str>) -> String;

    /// Pick the locale to use for `requested`, silently falling back to
    /// [`DEFAULT_LOCALE`] when it is unsupported.
    fn select_locale(&self, requested: &str) -> Locale {
        let code = requested.trim().to_ascii_lowercase();
        if self.supports(&code) {
            Locale(code)
        } else {
            tracing::debug!(requested, fallback = DEFAULT_LOCALE, "unsupported locale");
            Locale::default()
        }
    }
}

type LabelTable = HashMap<&'static str, &'static str>;

static TABLES: Lazy<HashMap<&'static str, LabelTable>> = Lazy::new(|| {
    let mut tables = HashMap::new();
    tables.insert(
        "en",
        HashMap::from([
            ("default_priority_low", "Low"),
            ("default_priority_normal", "Normal"),
            ("default_priority_high", "High"),
            ("default_priority_urgent", "Urgent"),
            ("label_assigned_to_me_issues", "Issues assigned to me"),
            ("label_reported_issues", "Reported issues"),
            ("label_updated_issues", "Updated issues"),
            ("label_watched_issues", "Watched issues"),
            ("label_my_projects", "My projects"),
            ("label_my_bookmarks", "My bookmarks"),
        ]),
    );
    tables.insert(
        "de",
        HashMap::from([
            ("default_priority_low", "Niedrig"),
            ("default_priority_normal", "Normal"),
            ("default_priority_high", "Hoch"),
            ("default_priority_urgent", "Dringend"),
            ("label_assigned_to_me_issues", "Mir zugewiesene Tickets"),
            ("label_reported_issues", "Gemeldete Tickets"),
            ("label_updated_issues", "Aktualisierte Tickets"),
            ("label_watched_issues", "Beobachtete Tickets"),
            ("label_my_projects", "Meine Projekte"),
            ("label_my_bookmarks", "Meine Lesezeichen"),
        ]),
    );
    tables.insert(
        "fr",
        HashMap::from([
            ("default_priority_low", "Bas"),
            ("default_priority_normal", "Normal"),
            ("default_priority_high", "Haut"),
            ("default_priority_urgent", "Urgent"),
            ("label_assigned_to_me_issues", "Demandes qui me sont assignées"),
            ("label_reported_issues", "Demandes créées"),
            ("label_updated_issues", "Demandes mises à jour"),
            ("label_watched_issues", "Demandes surveillées"),
            ("label_my_projects", "Mes projets"),
            ("label_my_bookmarks", "Mes favoris"),
        ]),
    );
    tables
});

/// Resolver backed by the compiled-in tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLabels;

impl BuiltinLabels {
    pub fn new() -> Self {
        Self
    }

    /// Locale codes with a compiled-in table.
    pub fn locales() -> Vec<&'static str> {
        let mut codes: Vec<&'static str> = TABLES.keys().copied().collect();
        codes.sort_unstable();
        codes
    }
}

impl LabelResolver for BuiltinLabels {
    fn supports(&self, code: &str) -> bool {
        TABLES.contains_key(code)
    }

    fn resolve(&self, key: &str, locale: &Locale, default: Option<&str>) -> String {
        if let Some(text) = TABLES.get(locale.as_str()).and_then(|t| t.get(key)) {
            return (*text).to_string();
        }
        if let Some(text) = default {
            return text.to_string();
        }
        TABLES
            .get(DEFAULT_LOCALE)
            .and_then(|t| t.get(key))
            .map(|text| (*text).to_string())
            .unwrap_or_else(|| key.to_string())
    }
}
