//! Payloads carried by drag-and-drop onto the grid.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Where a dragged field came from
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DragSource {
    Dimension,
    Filter,
    Order,
    Group,
    Column,
}

/// A dropped field: its origin list, its position there and its value
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DragPayload {
    #[serde(rename = "from")]
    pub source: DragSource,
    pub index: usize,
    pub value: String,
}

impl DragPayload {
    /// Parse the serialized text attached to a drop event.
    ///
    /// Unknown sources are rejected instead of falling through.
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| GridError::DragPayload(e.to_string()))
    }

    pub fn to_text(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_column_payload() {
        let payload = DragPayload::parse(r#"{"from":"column","index":3,"value":"region"}"#).unwrap();
        assert_eq!(payload.source, DragSource::Column);
        assert_eq!(payload.index, 3);
        assert_eq!(payload.value, "region");
    }

    #[test]
    fn test_unknown_source_is_rejected() {
        let err = DragPayload::parse(r#"{"from":"measure","index":0,"value":"x"}"#).unwrap_err();
        assert!(matches!(err, GridError::DragPayload(_)));
    }

    #[test]
    fn test_text_round_trip_preserves_source() {
        let payload = DragPayload {
            source: DragSource::Group,
            index: 1,
            value: "city".to_string(),
        };
        let text = payload.to_text().unwrap();
        assert!(text.contains("\"from\":\"group\""));
        assert_eq!(DragPayload::parse(&text).unwrap(), payload);
    }
}
