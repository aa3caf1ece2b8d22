use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{AgeRange, CountryCode, Gender, Platform, SearchFilter};

/// Who an ad is shown to.
///
/// `None` on a dimension is the wildcard: the ad matches every value of that
/// dimension. An empty set is never stored; [`wildcard_if_empty`] collapses it
/// so that "no list" and "empty list" cannot diverge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetingCondition {
    #[serde(default)]
    pub age: Option<AgeRange>,
    #[serde(default)]
    pub genders: Option<BTreeSet<Gender>>,
    #[serde(default)]
    pub countries: Option<BTreeSet<CountryCode>>,
    #[serde(default)]
    pub platforms: Option<BTreeSet<Platform>>,
}

impl TargetingCondition {
    #[must_use]
    pub const fn is_unconditioned(&self) -> bool {
        self.age.is_none()
            && self.genders.is_none()
            && self.countries.is_none()
            && self.platforms.is_none()
    }

    /// In-process evaluation of the same rule the store query encodes: one
    /// OR-group per constrained filter dimension, AND-ed together.
    #[must_use]
    pub fn matches(&self, filter: &SearchFilter) -> bool {
        let age_ok = filter.ages.is_empty()
            || self
                .age
                .is_none_or(|range| filter.ages.iter().any(|age| range.contains(*age)));

        age_ok
            && dimension_matches(self.genders.as_ref(), &filter.genders)
            && dimension_matches(self.countries.as_ref(), &filter.countries)
            && dimension_matches(self.platforms.as_ref(), &filter.platforms)
    }
}

fn dimension_matches<T: Ord>(targeted: Option<&BTreeSet<T>>, wanted: &BTreeSet<T>) -> bool {
    wanted.is_empty() || targeted.is_none_or(|values| !values.is_disjoint(wanted))
}

#[must_use]
pub fn wildcard_if_empty<T>(values: BTreeSet<T>) -> Option<BTreeSet<T>> {
    if values.is_empty() { None } else { Some(values) }
}
