//! Translates a [`SearchFilter`] into the `WHERE` clause of the ad query.
//!
//! The clause is one AND over the active-window test and one OR-group per
//! constrained dimension. Each OR-group lets unconditioned ads through (NULL
//! column) and otherwise requires the ad to target at least one of the
//! requested values.

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, Condition};

use crate::domain::{SearchFilter, TargetValue};
use crate::entities::ads::Column;

/// `start_at <= now < end_at`.
#[must_use]
pub fn active_at(now: DateTime<Utc>) -> Condition {
    let now = now.timestamp_millis();
    Condition::all()
        .add(Column::StartAtMs.lte(now))
        .add(Column::EndAtMs.gt(now))
}

#[must_use]
pub fn matching(filter: &SearchFilter, now: DateTime<Utc>) -> Condition {
    let mut condition = active_at(now);

    if !filter.ages.is_empty() {
        condition = condition.add(age_group(filter.ages.iter().copied()));
    }
    if !filter.genders.is_empty() {
        condition = condition.add(value_group(Column::Genders, &filter.genders));
    }
    if !filter.countries.is_empty() {
        condition = condition.add(value_group(Column::Countries, &filter.countries));
    }
    if !filter.platforms.is_empty() {
        condition = condition.add(value_group(Column::Platforms, &filter.platforms));
    }

    condition
}

fn age_group(ages: impl IntoIterator<Item = u8>) -> Condition {
    ages.into_iter().fold(
        Condition::any().add(Column::AgeStart.is_null()),
        |group, age| {
            let age = i32::from(age);
            group.add(
                Condition::all()
                    .add(Column::AgeStart.lte(age))
                    .add(Column::AgeEnd.gte(age)),
            )
        },
    )
}

/// Targeting columns hold JSON arrays, so a quoted token only matches a whole
/// element. Values come from closed domains and contain no LIKE wildcards.
fn value_group<'a, T: TargetValue + 'a>(
    column: Column,
    values: impl IntoIterator<Item = &'a T>,
) -> Condition {
    values
        .into_iter()
        .fold(Condition::any().add(column.is_null()), |group, value| {
            group.add(column.contains(json_token(value)))
        })
}

fn json_token<T: TargetValue>(value: &T) -> String {
    format!("\"{}\"", value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CountryCode, Platform};
    use crate::entities::ads;
    use chrono::TimeZone;
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    fn sql(condition: Condition) -> String {
        ads::Entity::find()
            .filter(condition)
            .build(DbBackend::Sqlite)
            .to_string()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn empty_filter_only_checks_window() {
        let sql = sql(matching(&SearchFilter::default(), now()));
        let (_, where_clause) = sql.split_once(" WHERE ").unwrap();
        let ms = now().timestamp_millis();
        assert!(where_clause.contains(&format!("\"start_at_ms\" <= {ms}")));
        assert!(where_clause.contains(&format!("\"end_at_ms\" > {ms}")));
        assert!(!where_clause.contains("LIKE"));
        assert!(!where_clause.contains("age_start"));
        assert!(!where_clause.contains("countries"));
    }

    #[test]
    fn set_dimension_admits_unconditioned_ads() {
        let mut filter = SearchFilter::default();
        filter.countries.insert(CountryCode::parse("TW").unwrap());
        filter.countries.insert(CountryCode::parse("JP").unwrap());

        let sql = sql(matching(&filter, now()));
        assert!(sql.contains("\"countries\" IS NULL"));
        assert!(sql.contains(r#""countries" LIKE '%"TW"%'"#));
        assert!(sql.contains(r#""countries" LIKE '%"JP"%'"#));
        assert!(sql.contains(" OR "));
    }

    #[test]
    fn age_group_checks_both_bounds() {
        let mut filter = SearchFilter::default();
        filter.ages.insert(24);

        let sql = sql(matching(&filter, now()));
        assert!(sql.contains("\"age_start\" IS NULL"));
        assert!(sql.contains("\"age_start\" <= 24"));
        assert!(sql.contains("\"age_end\" >= 24"));
    }

    #[test]
    fn platform_token_is_quoted() {
        assert_eq!(json_token(&Platform::Ios), "\"ios\"");
    }
}
