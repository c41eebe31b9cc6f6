use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Locale
///
/// The closed set of languages the portal renders. Anything outside this set
/// resolves to [`Locale::DEFAULT`] instead of failing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Am,
}

impl Locale {
    pub const DEFAULT: Locale = Locale::En;
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Am];

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Am => "am",
        }
    }

    /// Native name, used by the language switcher.
    pub fn label(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Am => "አማርኛ",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale '{0}'")]
pub struct UnsupportedLocale(pub String);

impl FromStr for Locale {
    type Err = UnsupportedLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::ALL
            .into_iter()
            .find(|locale| locale.code() == s)
            .ok_or_else(|| UnsupportedLocale(s.to_string()))
    }
}

/// Path segments of `path`, ignoring the query string and empty segments.
pub(crate) fn segments(path: &str) -> impl Iterator<Item = &str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|segment| !segment.is_empty())
}

/// derive_locale
///
/// Locale named by the first non-empty segment of `path`, or the default
/// locale when that segment is missing or not a supported code. Total: every
/// input yields a supported locale.
pub fn derive_locale(path: &str) -> Locale {
    segments(path)
        .next()
        .and_then(|segment| segment.parse().ok())
        .unwrap_or(Locale::DEFAULT)
}

/// Login page of `locale`.
pub fn login_path(locale: Locale) -> String {
    format!("/{locale}/login")
}

/// negotiate
///
/// Picks the best supported locale from an `Accept-Language` header value.
/// Region subtags are ignored (`am-ET` counts as `am`), entries with `q=0` are
/// refused and equal weights keep header order. `None` when nothing matches.
pub fn negotiate(accept_language: &str) -> Option<Locale> {
    let mut best: Option<(Locale, f32)> = None;

    for entry in accept_language.split(',') {
        let mut parts = entry.split(';');
        let tag = parts.next().unwrap_or_default().trim();
        let weight = parts
            .filter_map(|param| param.trim().strip_prefix("q="))
            .find_map(|q| q.trim().parse::<f32>().ok())
            .unwrap_or(1.0);

        if weight <= 0.0 {
            continue;
        }

        let primary = tag.split('-').next().unwrap_or_default().to_ascii_lowercase();
        let Ok(locale) = primary.parse::<Locale>() else {
            continue;
        };

        if best.is_none_or(|(_, best_weight)| weight > best_weight) {
            best = Some((locale, weight));
        }
    }

    best.map(|(locale, _)| locale)
}
