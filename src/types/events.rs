use serde::Serialize;

use super::{DragPayload, SortDirection, SummaryRule};

/// Intents the grid emits for the host application's query layer.
///
/// The grid never resolves these itself; the host reacts (re-query, re-sort)
/// and hands back a new dataset.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GridEvent {
    #[serde(rename_all = "camelCase")]
    SortChange {
        column_key: String,
        direction: SortDirection,
    },
    #[serde(rename_all = "camelCase")]
    FilterChange {
        column_key: String,
        selected_values: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    SummaryChange {
        column_key: String,
        rule: SummaryRule,
    },
    FieldDropped {
        payload: DragPayload,
    },
}
