//! Admission-time validation of ad payloads.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::filter::collect_values;
use super::targeting::wildcard_if_empty;
use super::{AgeRange, MAX_AGE, MIN_AGE, TargetValue, TargetingCondition};
use crate::models::ad::{AdConditionsInput, AdInput, NewAd};

/// A malformed or out-of-domain input. Always the client's fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("ad title cannot be empty")]
    EmptyTitle,

    #[error("startAt cannot be empty")]
    MissingStartAt,

    #[error("endAt cannot be empty")]
    MissingEndAt,

    #[error("startAt is after endAt")]
    StartAfterEnd,

    #[error("ageStart or ageEnd is missing")]
    IncompleteAgeRange,

    #[error("ageStart is greater than ageEnd")]
    InvertedAgeRange,

    #[error("ageStart must be at least {}", MIN_AGE)]
    AgeStartTooLow,

    #[error("ageEnd must be at most {}", MAX_AGE)]
    AgeEndTooHigh,

    #[error("invalid {dimension} value: {value}")]
    InvalidValue {
        dimension: &'static str,
        value: String,
    },

    #[error("offset value is invalid: {0}")]
    InvalidOffset(String),

    #[error("limit value is invalid: {0} (expected 1-100)")]
    InvalidLimit(String),

    #[error("age value is invalid: {0} (expected {min}-{max})", min = MIN_AGE, max = MAX_AGE)]
    InvalidAge(String),
}

impl ValidationError {
    pub fn invalid_value<T: TargetValue>(value: impl Into<String>) -> Self {
        Self::InvalidValue {
            dimension: T::DIMENSION,
            value: value.into(),
        }
    }
}

/// Checks an admission payload and turns it into a typed [`NewAd`].
///
/// Rules are checked in a fixed order and the first violation wins: title,
/// `startAt`, `endAt`, window ordering, age pairing and bounds, then the
/// country, gender and platform domains. Empty targeting lists come back as
/// wildcards.
pub fn validate_ad(input: &AdInput) -> Result<NewAd, ValidationError> {
    if input.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }

    let start_at = input
        .start_at
        .map(to_millis)
        .ok_or(ValidationError::MissingStartAt)?;
    let end_at = input
        .end_at
        .map(to_millis)
        .ok_or(ValidationError::MissingEndAt)?;

    if start_at > end_at {
        return Err(ValidationError::StartAfterEnd);
    }

    let conditions = validate_conditions(&input.conditions)?;

    Ok(NewAd {
        title: input.title.clone(),
        start_at,
        end_at,
        conditions,
    })
}

/// Drops sub-millisecond precision, the resolution the store keeps.
fn to_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or(at)
}

fn validate_conditions(input: &AdConditionsInput) -> Result<TargetingCondition, ValidationError> {
    let age = validate_age(input.age_start, input.age_end)?;

    let countries = collect_values(input.country.iter().flatten().map(String::as_str))?;
    let genders = collect_values(input.gender.iter().flatten().map(String::as_str))?;
    let platforms = collect_values(input.platform.iter().flatten().map(String::as_str))?;

    Ok(TargetingCondition {
        age,
        genders: wildcard_if_empty(genders),
        countries: wildcard_if_empty(countries),
        platforms: wildcard_if_empty(platforms),
    })
}

fn validate_age(start: Option<i64>, end: Option<i64>) -> Result<Option<AgeRange>, ValidationError> {
    let (start, end) = match (start, end) {
        (None, None) => return Ok(None),
        (Some(start), Some(end)) => (start, end),
        _ => return Err(ValidationError::IncompleteAgeRange),
    };

    if start > end {
        return Err(ValidationError::InvertedAgeRange);
    }

    let start = u8::try_from(start)
        .ok()
        .filter(|age| *age >= MIN_AGE)
        .ok_or(ValidationError::AgeStartTooLow)?;
    let end = u8::try_from(end)
        .ok()
        .filter(|age| *age <= MAX_AGE)
        .ok_or(ValidationError::AgeEndTooHigh)?;

    Ok(AgeRange::new(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CountryCode, Gender, Platform};
    use chrono::{Duration, TimeZone};

    fn valid_input() -> AdInput {
        AdInput {
            title: "Good case".to_string(),
            start_at: Some(Utc.with_ymd_and_hms(2023, 12, 10, 3, 0, 0).unwrap()),
            end_at: Some(Utc.with_ymd_and_hms(2024, 12, 31, 16, 0, 0).unwrap()),
            conditions: AdConditionsInput {
                age_start: Some(20),
                age_end: Some(30),
                gender: None,
                country: Some(vec!["TW".into(), "JP".into()]),
                platform: Some(vec!["android".into(), "ios".into()]),
            },
        }
    }

    #[test]
    fn accepts_valid_ad() {
        let ad = validate_ad(&valid_input()).unwrap();
        assert_eq!(ad.title, "Good case");
        assert_eq!(ad.conditions.age, AgeRange::new(20, 30));
        assert_eq!(ad.conditions.genders, None);

        let countries = ad.conditions.countries.unwrap();
        assert!(countries.contains(&CountryCode::parse("TW").unwrap()));
        assert!(countries.contains(&CountryCode::parse("JP").unwrap()));

        let platforms = ad.conditions.platforms.unwrap();
        assert_eq!(platforms.len(), 2);
        assert!(platforms.contains(&Platform::Android));
    }

    #[test]
    fn accepts_unconditioned_ad() {
        let mut input = valid_input();
        input.conditions = AdConditionsInput::default();
        let ad = validate_ad(&input).unwrap();
        assert!(ad.conditions.is_unconditioned());
    }

    #[test]
    fn empty_lists_become_wildcards() {
        let mut input = valid_input();
        input.conditions.country = Some(vec![]);
        input.conditions.gender = Some(vec![]);
        let ad = validate_ad(&input).unwrap();
        assert_eq!(ad.conditions.countries, None);
        assert_eq!(ad.conditions.genders, None);
    }

    #[test]
    fn start_equal_to_end_is_allowed() {
        let mut input = valid_input();
        input.end_at = input.start_at;
        assert!(validate_ad(&input).is_ok());
    }

    #[test]
    fn window_is_truncated_to_milliseconds() {
        let mut input = valid_input();
        let start = input.start_at.unwrap();
        input.start_at = Some(start + Duration::microseconds(500));
        input.end_at = Some(start + Duration::hours(1) + Duration::microseconds(999));

        let ad = validate_ad(&input).unwrap();
        assert_eq!(ad.start_at, start);
        assert_eq!(ad.end_at, start + Duration::hours(1));
        assert_eq!(ad.end_at.timestamp_subsec_nanos(), 0);

        assert!(ad.is_active_at(start));
        assert!(!ad.is_active_at(start + Duration::hours(1) + Duration::microseconds(500)));
    }

    #[test]
    fn rejects_blank_title() {
        let mut input = valid_input();
        input.title = "   ".to_string();
        assert_eq!(validate_ad(&input), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn rejects_missing_window() {
        let mut input = valid_input();
        input.start_at = None;
        assert_eq!(validate_ad(&input), Err(ValidationError::MissingStartAt));

        let mut input = valid_input();
        input.end_at = None;
        assert_eq!(validate_ad(&input), Err(ValidationError::MissingEndAt));
    }

    #[test]
    fn rejects_inverted_window() {
        let mut input = valid_input();
        std::mem::swap(&mut input.start_at, &mut input.end_at);
        assert_eq!(validate_ad(&input), Err(ValidationError::StartAfterEnd));
    }

    #[test]
    fn age_rules() {
        let check = |start, end| {
            let mut input = valid_input();
            input.conditions.age_start = start;
            input.conditions.age_end = end;
            validate_ad(&input).map(|ad| ad.conditions.age)
        };

        assert_eq!(check(Some(20), None), Err(ValidationError::IncompleteAgeRange));
        assert_eq!(check(None, Some(30)), Err(ValidationError::IncompleteAgeRange));
        assert_eq!(check(Some(30), Some(20)), Err(ValidationError::InvertedAgeRange));
        assert_eq!(check(Some(0), Some(20)), Err(ValidationError::AgeStartTooLow));
        assert_eq!(check(Some(-5), Some(20)), Err(ValidationError::AgeStartTooLow));
        assert_eq!(check(Some(20), Some(101)), Err(ValidationError::AgeEndTooHigh));
        assert_eq!(check(Some(1), Some(100)), Ok(AgeRange::new(1, 100)));
        assert_eq!(check(None, None), Ok(None));
    }

    #[test]
    fn domain_checks_run_in_order() {
        let mut input = valid_input();
        input.conditions.country = Some(vec!["XX".into()]);
        input.conditions.gender = Some(vec!["X".into()]);
        assert_eq!(
            validate_ad(&input),
            Err(ValidationError::invalid_value::<CountryCode>("XX"))
        );

        input.conditions.country = None;
        assert_eq!(
            validate_ad(&input),
            Err(ValidationError::invalid_value::<Gender>("X"))
        );

        input.conditions.gender = None;
        input.conditions.platform = Some(vec!["windows".into()]);
        assert_eq!(
            validate_ad(&input),
            Err(ValidationError::invalid_value::<Platform>("windows"))
        );
    }

    #[test]
    fn title_check_comes_first() {
        let mut input = valid_input();
        input.title = String::new();
        input.start_at = None;
        input.conditions.country = Some(vec!["XX".into()]);
        assert_eq!(validate_ad(&input), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn error_messages() {
        assert_eq!(ValidationError::StartAfterEnd.to_string(), "startAt is after endAt");
        assert_eq!(
            ValidationError::invalid_value::<Platform>("windows").to_string(),
            "invalid platform value: windows"
        );
        assert_eq!(
            ValidationError::AgeEndTooHigh.to_string(),
            "ageEnd must be at most 100"
        );
        assert_eq!(
            ValidationError::InvalidAge("0".into()).to_string(),
            "age value is invalid: 0 (expected 1-100)"
        );
    }
}
