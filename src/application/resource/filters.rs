//! Table filters and the query constraints they produce.

use time::{Date, format_description::FormatItem, macros::format_description};

use crate::application::repos::PostQueryFilter;
use crate::domain::types::PostStatus;

/// `Jan 1, 2024`, used by filter indicators.
pub const INDICATOR_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:short] [day padding:none], [year]");

/// Wire format of date inputs.
pub const DATE_INPUT_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Checkbox filter restricting the status column.
    Status(PostStatus),
    /// Exact match on the related record's title attribute.
    Select {
        relationship: &'static str,
        title_attribute: &'static str,
    },
    /// Two optional date inputs compared against `created_at`.
    DateRange {
        from_label: &'static str,
        until_label: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FilterKind,
}

/// A human-readable chip describing an active filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indicator {
    pub key: &'static str,
    pub label: String,
}

/// Submitted values for every filter on the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub publish: bool,
    pub draft: bool,
    pub category: Option<String>,
    pub created: DateRange,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<Date>,
    pub until: Option<Date>,
}

impl DateRange {
    /// Each bound is applied independently; `from > until` is accepted and simply matches nothing.
    pub fn apply(&self, mut query: PostQueryFilter) -> PostQueryFilter {
        if let Some(from) = self.from {
            query.created_from = Some(from);
        }
        if let Some(until) = self.until {
            query.created_until = Some(until);
        }
        query
    }

    pub fn indicators(&self) -> Vec<Indicator> {
        let mut indicators = Vec::new();

        if let Some(from) = self.from {
            indicators.push(Indicator {
                key: "from",
                label: format!("Created from {}", format_indicator_date(from)),
            });
        }

        if let Some(until) = self.until {
            indicators.push(Indicator {
                key: "until",
                label: format!("Created until {}", format_indicator_date(until)),
            });
        }

        indicators
    }
}

impl FilterSpec {
    pub fn status(name: &'static str, label: &'static str, status: PostStatus) -> Self {
        Self {
            name,
            label,
            kind: FilterKind::Status(status),
        }
    }

    pub fn select(
        name: &'static str,
        label: &'static str,
        relationship: &'static str,
        title_attribute: &'static str,
    ) -> Self {
        Self {
            name,
            label,
            kind: FilterKind::Select {
                relationship,
                title_attribute,
            },
        }
    }

    pub fn date_range(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FilterKind::DateRange {
                from_label: "From",
                until_label: "Until",
            },
        }
    }

    fn is_active(&self, state: &FilterState) -> bool {
        match self.kind {
            FilterKind::Status(PostStatus::Published) => state.publish,
            FilterKind::Status(PostStatus::Draft) => state.draft,
            FilterKind::Select { .. } => state.category.is_some(),
            FilterKind::DateRange { .. } => {
                state.created.from.is_some() || state.created.until.is_some()
            }
        }
    }

    /// Narrow `query` by this filter when the submitted state activates it.
    pub fn apply(&self, state: &FilterState, query: PostQueryFilter) -> PostQueryFilter {
        if !self.is_active(state) {
            return query;
        }

        match self.kind {
            FilterKind::Status(status) => query.with_status(status),
            FilterKind::Select { .. } => PostQueryFilter {
                category: state.category.clone(),
                ..query
            },
            FilterKind::DateRange { .. } => state.created.apply(query),
        }
    }

    pub fn indicators(&self, state: &FilterState) -> Vec<Indicator> {
        if !self.is_active(state) {
            return Vec::new();
        }

        match self.kind {
            FilterKind::Status(_) => vec![Indicator {
                key: self.name,
                label: self.label.to_string(),
            }],
            FilterKind::Select { .. } => state
                .category
                .as_ref()
                .map(|category| Indicator {
                    key: self.name,
                    label: format!("{}: {category}", self.label),
                })
                .into_iter()
                .collect(),
            FilterKind::DateRange { .. } => state.created.indicators(),
        }
    }
}

pub fn format_indicator_date(date: Date) -> String {
    date.format(INDICATOR_DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

pub fn parse_date_input(raw: &str) -> Result<Date, time::error::Parse> {
    Date::parse(raw.trim(), DATE_INPUT_FORMAT)
}
