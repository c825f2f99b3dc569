//! Distance output formatting
//!
//! Distances up to and including 10 km are shown in whole meters, longer distances in whole
//! kilometers (truncated, never rounded). The integer part is grouped in threes using the
//! separator of the configured locale.

use crate::core::constants::KM_DISPLAY_THRESHOLD_M;
use serde::{Deserialize, Serialize};

/// Digit grouping rules for one locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberLocale {
    /// Thousands separator
    pub grouping_separator: char,
}

impl NumberLocale {
    /// German grouping, e.g. `1.234.567`
    pub const fn german() -> Self {
        Self { grouping_separator: '.' }
    }

    /// English grouping, e.g. `1,234,567`
    pub const fn english() -> Self {
        Self { grouping_separator: ',' }
    }

    /// French grouping with a narrow no-break space
    pub const fn french() -> Self {
        Self { grouping_separator: '\u{202F}' }
    }

    /// Swiss grouping, e.g. `1'234'567`
    pub const fn swiss() -> Self {
        Self { grouping_separator: '\'' }
    }

    /// Resolve grouping rules from a language tag such as `de-DE` or `en_US`.
    ///
    /// Unknown languages fall back to German grouping.
    pub fn from_tag(tag: &str) -> Self {
        let normalized = tag.trim().replace('_', "-").to_ascii_lowercase();
        let mut parts = normalized.split('-');
        let language = parts.next().unwrap_or_default();
        let region = parts.next().unwrap_or_default();

        match (language, region) {
            (_, "ch") | (_, "li") => Self::swiss(),
            ("en", _) | ("ja", _) | ("zh", _) | ("ko", _) | ("he", _) => Self::english(),
            ("fr", _) => Self::french(),
            _ => Self::german(),
        }
    }
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self::german()
    }
}

/// Renders distances in meters as display strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DistanceFormatter {
    locale: NumberLocale,
}

impl DistanceFormatter {
    pub fn new(locale: NumberLocale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> NumberLocale {
        self.locale
    }

    /// Format a distance, e.g. `"10.000 m"` or `"877 km"`
    pub fn format(&self, distance_m: u32) -> String {
        if distance_m > KM_DISPLAY_THRESHOLD_M {
            format!("{} km", self.group(distance_m / 1000))
        } else {
            format!("{} m", self.group(distance_m))
        }
    }

    /// Group the decimal digits of `value` in threes
    pub fn group(&self, value: u32) -> String {
        let digits = value.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 * 3);

        for (i, digit) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(self.locale.grouping_separator);
            }
            grouped.push(digit);
        }

        grouped
    }
}
