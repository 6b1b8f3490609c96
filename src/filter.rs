//! Per-column filter and summary selections.
//!
//! Committing a popover is the only way to change this state. Every commit
//! clears the derived summary groupings and rebuilds them from the dataset
//! in the same call, so the summary layer never shows aggregates computed
//! against a previous selection.

use std::collections::{BTreeMap, HashSet};

use crate::error::{GridError, Result};
use crate::types::{format_number, CellValue, Dataset, GridEvent, SummaryRule};

/// A committed popover selection
#[derive(Debug, Clone, PartialEq)]
pub enum Commit {
    Filter {
        column_key: String,
        selected_values: Vec<String>,
    },
    Summary {
        column_key: String,
        rule: SummaryRule,
    },
}

impl Commit {
    pub fn column_key(&self) -> &str {
        match self {
            Self::Filter { column_key, .. } | Self::Summary { column_key, .. } => column_key,
        }
    }
}

/// Filter selections, summary rules and the groupings derived from them
#[derive(Debug, Clone, Default)]
pub struct FilterSummaryState {
    filters: BTreeMap<String, Vec<String>>,
    summaries: BTreeMap<String, SummaryRule>,
    /// Aggregate text per column, derived from `summaries` and the dataset
    groupings: BTreeMap<String, String>,
    rebuilds: usize,
}

impl FilterSummaryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values currently selected in a column's filter (empty = unfiltered).
    pub fn selected_values(&self, column_key: &str) -> &[String] {
        self.filters.get(column_key).map_or(&[], Vec::as_slice)
    }

    pub fn is_filtered(&self, column_key: &str) -> bool {
        !self.selected_values(column_key).is_empty()
    }

    pub fn rule(&self, column_key: &str) -> SummaryRule {
        self.summaries.get(column_key).copied().unwrap_or_default()
    }

    /// Summary text drawn in a column's summary cell.
    pub fn grouping(&self, column_key: &str) -> Option<&str> {
        self.groupings.get(column_key).map(String::as_str)
    }

    pub fn grouping_count(&self) -> usize {
        self.groupings.len()
    }

    /// Number of clear-and-rebuild passes so far.
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    /// Write a committed selection, rebuild every grouping, and return the
    /// event the host should receive.
    pub fn apply(&mut self, commit: Commit, dataset: &Dataset) -> Result<GridEvent> {
        if dataset.column_index(commit.column_key()).is_none() {
            return Err(GridError::UnknownColumn(commit.column_key().to_string()));
        }
        let event = match commit {
            Commit::Filter {
                column_key,
                selected_values,
            } => {
                if selected_values.is_empty() {
                    self.filters.remove(&column_key);
                } else {
                    self.filters
                        .insert(column_key.clone(), selected_values.clone());
                }
                GridEvent::FilterChange {
                    column_key,
                    selected_values,
                }
            }
            Commit::Summary { column_key, rule } => {
                if rule == SummaryRule::None {
                    self.summaries.remove(&column_key);
                } else {
                    self.summaries.insert(column_key.clone(), rule);
                }
                GridEvent::SummaryChange { column_key, rule }
            }
        };
        self.rebuild(dataset);
        Ok(event)
    }

    /// Clear the derived groupings and recompute them from `dataset`.
    pub fn rebuild(&mut self, dataset: &Dataset) {
        self.groupings.clear();
        for (key, rule) in &self.summaries {
            let Some(col) = dataset.column_index(key) else {
                tracing::warn!(column = %key, "summary rule for a column no longer in the dataset");
                continue;
            };
            if let Some(text) = aggregate(*rule, dataset, col) {
                self.groupings.insert(key.clone(), text);
            }
        }
        self.rebuilds += 1;
        tracing::debug!(
            groupings = self.groupings.len(),
            filters = self.filters.len(),
            "rebuilt summary groupings"
        );
    }
}

/// Aggregate a column under `rule`, formatted as `"<Rule>: <value>"`.
///
/// Numeric rules skip non-numeric cells and yield `None` when the column has
/// no numbers at all.
pub fn aggregate(rule: SummaryRule, dataset: &Dataset, col: usize) -> Option<String> {
    let values = || dataset.rows.iter().filter_map(|row| row.get(col));
    let numbers = || values().filter_map(CellValue::as_number);
    let value = match rule {
        SummaryRule::None => return None,
        SummaryRule::Count => values().filter(|v| !v.is_null()).count().to_string(),
        SummaryRule::Distinct => values()
            .filter(|v| !v.is_null())
            .map(CellValue::display)
            .collect::<HashSet<_>>()
            .len()
            .to_string(),
        SummaryRule::Sum => format_number(numbers().fold(0.0, |sum, v| sum + v)),
        SummaryRule::Average => {
            let (sum, n) = numbers().fold((0.0_f64, 0_u32), |(s, n), v| (s + v, n + 1));
            if n == 0 {
                return None;
            }
            format_number(sum / f64::from(n))
        }
        SummaryRule::Min => format_number(numbers().reduce(f64::min)?),
        SummaryRule::Max => format_number(numbers().reduce(f64::max)?),
    };
    Some(format!("{}: {value}", rule.label()))
}
