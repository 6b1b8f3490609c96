use serde::{Deserialize, Serialize};

/// Aggregate shown in a column's summary cell
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum SummaryRule {
    #[default]
    None,
    Count,
    Sum,
    Average,
    Min,
    Max,
    Distinct,
}

impl SummaryRule {
    /// Every rule, in the order the summary popover lists them.
    pub const ALL: [SummaryRule; 7] = [
        Self::None,
        Self::Count,
        Self::Sum,
        Self::Average,
        Self::Min,
        Self::Max,
        Self::Distinct,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Count => "Count",
            Self::Sum => "Sum",
            Self::Average => "Average",
            Self::Min => "Min",
            Self::Max => "Max",
            Self::Distinct => "Distinct",
        }
    }

    /// Inverse of [`SummaryRule::label`].
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.label() == label)
    }
}

/// Sort direction attached to a sort intent
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    #[default]
    None,
    Ascending,
    Descending,
}

impl SortDirection {
    /// Next state when a header is clicked: none → ascending → descending → none.
    pub fn cycle(self) -> Self {
        match self {
            Self::None => Self::Ascending,
            Self::Ascending => Self::Descending,
            Self::Descending => Self::None,
        }
    }

    /// Glyph appended to a sorted header label.
    pub fn indicator(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Ascending => " \u{25B2}",
            Self::Descending => " \u{25BC}",
        }
    }
}
