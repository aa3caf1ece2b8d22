use serde::Serialize;
use std::collections::BTreeSet;

use super::{CountryCode, Gender, MAX_AGE, MIN_AGE, Platform, TargetValue, ValidationError};

pub const DEFAULT_OFFSET: usize = 0;
pub const DEFAULT_LIMIT: usize = 5;
pub const MAX_LIMIT: usize = 100;

/// A normalized public search request.
///
/// Dimension values are kept in ordered sets, so two requests naming the same
/// values in a different order or with repeats compare (and serialize) equal.
/// An empty set means the caller put no constraint on that dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchFilter {
    pub offset: usize,
    pub limit: usize,
    pub ages: BTreeSet<u8>,
    pub genders: BTreeSet<Gender>,
    pub countries: BTreeSet<CountryCode>,
    pub platforms: BTreeSet<Platform>,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            offset: DEFAULT_OFFSET,
            limit: DEFAULT_LIMIT,
            ages: BTreeSet::new(),
            genders: BTreeSet::new(),
            countries: BTreeSet::new(),
            platforms: BTreeSet::new(),
        }
    }
}

/// Builds a [`SearchFilter`] from raw query parameters.
///
/// `offset`/`limit` fall back to their defaults when absent or blank. Every
/// `age`, `gender`, `country` and `platform` value is checked against its
/// domain, and the first invalid one rejects the whole filter. Unknown keys
/// are ignored.
pub fn normalize_filter<K, V>(params: &[(K, V)]) -> Result<SearchFilter, ValidationError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let offset = match first_value(params, "offset") {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| ValidationError::InvalidOffset(raw.to_string()))?,
        None => DEFAULT_OFFSET,
    };

    let limit = match first_value(params, "limit") {
        Some(raw) => raw
            .parse::<usize>()
            .ok()
            .filter(|limit| (1..=MAX_LIMIT).contains(limit))
            .ok_or_else(|| ValidationError::InvalidLimit(raw.to_string()))?,
        None => DEFAULT_LIMIT,
    };

    let ages = all_values(params, "age")
        .map(|raw| {
            raw.parse::<u8>()
                .ok()
                .filter(|age| (MIN_AGE..=MAX_AGE).contains(age))
                .ok_or_else(|| ValidationError::InvalidAge(raw.to_string()))
        })
        .collect::<Result<BTreeSet<_>, _>>()?;

    Ok(SearchFilter {
        offset,
        limit,
        ages,
        genders: collect_values(all_values(params, "gender"))?,
        countries: collect_values(all_values(params, "country"))?,
        platforms: collect_values(all_values(params, "platform"))?,
    })
}

fn first_value<'a, K: AsRef<str>, V: AsRef<str>>(
    params: &'a [(K, V)],
    name: &str,
) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key.as_ref() == name)
        .map(|(_, value)| value.as_ref())
        .filter(|value| !value.is_empty())
}

fn all_values<'a, K: AsRef<str>, V: AsRef<str>>(
    params: &'a [(K, V)],
    name: &'a str,
) -> impl Iterator<Item = &'a str> {
    params
        .iter()
        .filter(move |(key, _)| key.as_ref() == name)
        .map(|(_, value)| value.as_ref())
}

/// Parses every raw value into `T`, stopping at the first one outside the domain.
pub fn collect_values<'a, T: TargetValue>(
    raws: impl IntoIterator<Item = &'a str>,
) -> Result<BTreeSet<T>, ValidationError> {
    raws.into_iter()
        .map(|raw| T::parse(raw).ok_or_else(|| ValidationError::invalid_value::<T>(raw)))
        .collect()
}
