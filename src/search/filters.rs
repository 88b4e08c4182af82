use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{FilterError, ParseError};
use crate::models::{TaskPriority, TaskStatus};
use super::date_range::DateRange;

/// Sentinel spelling of "no constraint" accepted by [`FilterState::update`].
pub const ALL: &str = "all";

/// A categorical constraint: either the "all" wildcard or one concrete value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Filter<T> {
    All,
    Only(T),
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Filter::All
    }
}

impl<T: PartialEq> Filter<T> {
    pub fn is_all(&self) -> bool {
        matches!(self, Filter::All)
    }

    pub fn matches(&self, value: &T) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(v) => v == value,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Filter::All => None,
            Filter::Only(v) => Some(v),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => f.write_str(ALL),
            Filter::Only(v) => v.fmt(f),
        }
    }
}

/// Parses "all" (any case) to [`Filter::All`], anything else through `T::from_str`.
fn parse_filter<T>(value: &str) -> Result<Filter<T>, ParseError>
where
    T: FromStr<Err = ParseError>,
{
    if value.eq_ignore_ascii_case(ALL) {
        Ok(Filter::All)
    } else {
        value.parse().map(Filter::Only)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Status,
    Priority,
    Category,
    DateRange,
}

impl FilterField {
    pub const ALL: [FilterField; 4] = [
        FilterField::Status,
        FilterField::Priority,
        FilterField::Category,
        FilterField::DateRange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::Status => "status",
            FilterField::Priority => "priority",
            FilterField::Category => "category",
            FilterField::DateRange => "dateRange",
        }
    }
}

impl FromStr for FilterField {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "status" => Ok(FilterField::Status),
            "priority" => Ok(FilterField::Priority),
            "category" => Ok(FilterField::Category),
            "daterange" | "date" | "due" => Ok(FilterField::DateRange),
            _ => Err(FilterError::UnknownField(s.to_string())),
        }
    }
}

/// The four categorical filters of a task search.
///
/// Every field holds either its "all" sentinel or a value from its domain;
/// updates that would break this are rejected before anything is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub status: Filter<TaskStatus>,
    pub priority: Filter<TaskPriority>,
    /// Category id.
    pub category: Filter<String>,
    pub date_range: DateRange,
}

impl FilterState {
    pub fn is_default(&self) -> bool {
        self.active_count() == 0
    }

    /// Number of fields not set to "all" (0 to 4).
    pub fn active_count(&self) -> usize {
        [
            !self.status.is_all(),
            !self.priority.is_all(),
            !self.category.is_all(),
            !self.date_range.is_all(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    pub fn reset(&mut self) {
        *self = FilterState::default();
    }

    /// Sets exactly one field from its string form.
    ///
    /// `"all"` restores the wildcard. Category values must be one of
    /// `known_categories`. On error the state is unchanged.
    pub fn update(
        &mut self,
        field: FilterField,
        value: &str,
        known_categories: &BTreeSet<String>,
    ) -> Result<(), FilterError> {
        match field {
            FilterField::Status => self.status = parse_filter(value)?,
            FilterField::Priority => self.priority = parse_filter(value)?,
            FilterField::DateRange => self.date_range = value.parse()?,
            FilterField::Category => {
                self.category = if value.eq_ignore_ascii_case(ALL) {
                    Filter::All
                } else if known_categories.contains(value) {
                    Filter::Only(value.to_string())
                } else {
                    return Err(FilterError::UnknownCategory(value.to_string()));
                };
            }
        }
        Ok(())
    }

    /// Current value of `field` in its string form.
    pub fn get(&self, field: FilterField) -> String {
        match field {
            FilterField::Status => self.status.to_string(),
            FilterField::Priority => self.priority.to_string(),
            FilterField::Category => self.category.to_string(),
            FilterField::DateRange => self.date_range.to_string(),
        }
    }
}
