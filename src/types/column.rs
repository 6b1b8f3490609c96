use serde::{Deserialize, Serialize};

/// Horizontal text alignment inside a cell
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    /// Canvas `textAlign` keyword for this alignment.
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Which side a column is frozen to, if any
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Fixed {
    Left,
    Right,
    #[default]
    None,
}

/// A declared column of the grid
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    /// Key used to look the value up in each row record
    pub key: String,
    /// Header label (falls back to `key` when empty)
    #[serde(default)]
    pub display_name: String,
    /// Width in pixels; `None` uses the configured minimum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default)]
    pub align: Align,
    #[serde(default)]
    pub fixed: Fixed,
    #[serde(default)]
    pub sortable: bool,
    #[serde(default)]
    pub filterable: bool,
}

impl ColumnDescriptor {
    /// Create a plain, scrollable column with default settings.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            display_name: String::new(),
            width: None,
            align: Align::Left,
            fixed: Fixed::None,
            sortable: false,
            filterable: false,
        }
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_fixed(mut self, fixed: Fixed) -> Self {
        self.fixed = fixed;
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    /// Text shown in the header cell.
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.key
        } else {
            &self.display_name
        }
    }
}
