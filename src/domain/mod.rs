//! Domain types for ad targeting with strong typing.
//!
//! Every targeting value that reaches the store or the cache is one of the
//! closed-domain types defined here, so downstream code never re-validates
//! raw strings.

pub mod filter;
mod iso3166;
pub mod targeting;
pub mod validation;

pub use filter::{SearchFilter, normalize_filter};
pub use targeting::TargetingCondition;
pub use validation::{ValidationError, validate_ad};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const MIN_AGE: u8 = 1;
pub const MAX_AGE: u8 = 100;

/// Unique identifier for an Ad.
///
/// Assigned once at admission and never reused.
///
/// # Examples
///
/// ```rust
/// use adserve::domain::AdId;
///
/// let id = AdId::new();
/// let parsed: AdId = id.to_string().parse().unwrap();
/// assert_eq!(parsed, id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AdId(Uuid);

impl AdId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for AdId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AdId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for AdId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl Serialize for AdId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AdId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A value drawn from one of the closed targeting domains.
///
/// Implementors round-trip through their canonical string form, which is
/// what the store persists inside the targeting blobs.
pub trait TargetValue: Sized + Ord + Clone {
    /// Human-readable dimension name used in error messages.
    const DIMENSION: &'static str;

    fn parse(raw: &str) -> Option<Self>;

    fn as_str(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl TargetValue for Gender {
    const DIMENSION: &'static str = "gender";

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "M" => Some(Self::Male),
            "F" => Some(Self::Female),
            _ => None,
        }
    }

    fn as_str(&self) -> &str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    Web,
}

impl TargetValue for Platform {
    const DIMENSION: &'static str = "platform";

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "android" => Some(Self::Android),
            "ios" => Some(Self::Ios),
            "web" => Some(Self::Web),
            _ => None,
        }
    }

    fn as_str(&self) -> &str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Web => "web",
        }
    }
}

/// ISO 3166-1 alpha-2 country code.
///
/// Only constructible through [`TargetValue::parse`], which checks the code
/// against the official list.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl TargetValue for CountryCode {
    const DIMENSION: &'static str = "country";

    fn parse(raw: &str) -> Option<Self> {
        iso3166::is_alpha2(raw).then(|| Self(raw.to_string()))
    }

    fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CountryCode {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        if iso3166::is_alpha2(&raw) {
            Ok(Self(raw))
        } else {
            Err(format!("'{raw}' is not an ISO 3166-1 alpha-2 code"))
        }
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inclusive age bounds, `MIN_AGE <= start <= end <= MAX_AGE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    start: u8,
    end: u8,
}

impl AgeRange {
    /// Returns `None` when the bounds are out of domain or inverted.
    #[must_use]
    pub const fn new(start: u8, end: u8) -> Option<Self> {
        if start < MIN_AGE || end > MAX_AGE || start > end {
            None
        } else {
            Some(Self { start, end })
        }
    }

    #[must_use]
    pub const fn start(&self) -> u8 {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> u8 {
        self.end
    }

    #[must_use]
    pub const fn contains(&self, age: u8) -> bool {
        self.start <= age && age <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ad_id_round_trips_through_string() {
        let id = AdId::new();
        let parsed: AdId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<AdId>().is_err());
    }

    #[test]
    fn ad_ids_are_unique() {
        assert_ne!(AdId::new(), AdId::new());
    }

    #[test]
    fn gender_domain_is_closed() {
        assert_eq!(Gender::parse("M"), Some(Gender::Male));
        assert_eq!(Gender::parse("F"), Some(Gender::Female));
        assert_eq!(Gender::parse("m"), None);
        assert_eq!(Gender::parse("X"), None);
    }

    #[test]
    fn platform_domain_is_closed() {
        assert_eq!(Platform::parse("ios"), Some(Platform::Ios));
        assert_eq!(Platform::parse("web").map(|p| p.as_str().to_string()), Some("web".into()));
        assert_eq!(Platform::parse("IOS"), None);
        assert_eq!(Platform::parse("windows"), None);
    }

    #[test]
    fn country_code_checks_iso_table() {
        assert!(CountryCode::parse("TW").is_some());
        assert!(CountryCode::parse("JP").is_some());
        assert!(CountryCode::parse("tw").is_none());
        assert!(CountryCode::parse("XX").is_none());
        assert!(CountryCode::parse("TWN").is_none());
    }

    #[test]
    fn country_code_deserialization_validates() {
        let ok: Result<CountryCode, _> = serde_json::from_str("\"GB\"");
        assert!(ok.is_ok());
        let bad: Result<CountryCode, _> = serde_json::from_str("\"ZZ\"");
        assert!(bad.is_err());
    }

    #[test]
    fn age_range_bounds() {
        assert!(AgeRange::new(1, 100).is_some());
        assert!(AgeRange::new(20, 20).is_some());
        assert!(AgeRange::new(0, 10).is_none());
        assert!(AgeRange::new(10, 101).is_none());
        assert!(AgeRange::new(30, 20).is_none());

        let range = AgeRange::new(20, 30).unwrap();
        assert!(range.contains(20));
        assert!(range.contains(30));
        assert!(!range.contains(19));
        assert!(!range.contains(31));
    }

    #[test]
    fn value_serialization_matches_wire_form() {
        assert_eq!(serde_json::to_string(&Gender::Female).unwrap(), "\"F\"");
        assert_eq!(serde_json::to_string(&Platform::Android).unwrap(), "\"android\"");
    }
}
