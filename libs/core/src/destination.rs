use std::fmt;

use serde::{Deserialize, Serialize};

/// Domain suffix WhatsApp uses for individual (non-group) chats.
pub const USER_DOMAIN_SUFFIX: &str = "@c.us";

/// Country prefix substituted for a leading trunk `0`.
pub const DEFAULT_COUNTRY_CODE: &str = "62";

/// Canonical chat identifier: digits followed by exactly one `@c.us`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(String);

impl ChatId {
    /// Wraps an identifier that already carries the network suffix, e.g. the
    /// `from` field of an inbound message.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identifier with the trailing domain suffix cut off, for log lines.
    pub fn display_number(&self) -> &str {
        self.0
            .strip_suffix(USER_DOMAIN_SUFFIX)
            .unwrap_or(self.0.as_str())
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ChatId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Turns user supplied phone numbers into [`ChatId`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationNormalizer {
    country_code: String,
}

impl DestinationNormalizer {
    pub fn new(country_code: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
        }
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// Strips every non-digit, swaps a single leading `0` for the country
    /// code and appends the domain suffix unless it is already present.
    ///
    /// ```
    /// use wa_relay_core::DestinationNormalizer;
    ///
    /// let normalizer = DestinationNormalizer::default();
    /// assert_eq!(normalizer.normalize("0812-345 678").as_str(), "62812345678@c.us");
    /// ```
    pub fn normalize(&self, raw: &str) -> ChatId {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

        let mut formatted = match digits.strip_prefix('0') {
            Some(rest) => format!("{}{rest}", self.country_code),
            None => digits,
        };
        if !formatted.ends_with(USER_DOMAIN_SUFFIX) {
            formatted.push_str(USER_DOMAIN_SUFFIX);
        }
        ChatId(formatted)
    }
}

impl Default for DestinationNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTRY_CODE)
    }
}

/// Normalizes with the default country code.
pub fn normalize_destination(raw: &str) -> ChatId {
    DestinationNormalizer::default().normalize(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_zero_becomes_country_code() {
        assert_eq!(normalize_destination("0812345").as_str(), "62812345@c.us");
    }

    #[test]
    fn international_number_only_gets_suffix() {
        assert_eq!(
            normalize_destination("628123456789").as_str(),
            "628123456789@c.us"
        );
    }

    #[test]
    fn separators_are_stripped() {
        assert_eq!(
            normalize_destination("0812-345 678").as_str(),
            "62812345678@c.us"
        );
        assert_eq!(
            normalize_destination("+62 (812) 345.678").as_str(),
            "62812345678@c.us"
        );
    }

    #[test]
    fn suffixed_input_keeps_a_single_suffix() {
        assert_eq!(normalize_destination("628123@c.us").as_str(), "628123@c.us");
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in [
            "0812345",
            "628123456789",
            "0812-345 678",
            "628123@c.us",
            "abc",
            "",
            "00123",
        ] {
            let once = normalize_destination(raw);
            let twice = normalize_destination(once.as_str());
            assert_eq!(once, twice, "input {raw:?}");
        }
    }

    #[test]
    fn only_one_leading_zero_is_replaced() {
        assert_eq!(normalize_destination("00123").as_str(), "620123@c.us");
    }

    #[test]
    fn letters_only_yield_bare_suffix() {
        assert_eq!(normalize_destination("not a number").as_str(), "@c.us");
    }

    #[test]
    fn custom_country_code() {
        let normalizer = DestinationNormalizer::new("44");
        assert_eq!(normalizer.normalize("07700 900123").as_str(), "447700900123@c.us");
    }

    #[test]
    fn display_number_cuts_the_suffix() {
        let id = normalize_destination("0812345");
        assert_eq!(id.display_number(), "62812345");
        assert_eq!(ChatId::from_raw("12345").display_number(), "12345");
    }
}
