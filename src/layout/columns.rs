//! Column bucketing and width computation.
//!
//! Declared columns are split into left-fixed, center-scrollable and
//! right-fixed buckets. Each bucket keeps declaration order and carries
//! cumulative offsets so a pixel position maps back to a column with a
//! binary search.

use crate::types::{ColumnDescriptor, Fixed};

/// One of the three horizontal column groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Left,
    Center,
    Right,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Left, Bucket::Center, Bucket::Right];
}

/// A column placed inside its bucket
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSlot {
    /// Index in the declared column list
    pub index: usize,
    /// Left edge relative to the bucket's origin
    pub x: f32,
    pub width: f32,
}

impl ColumnSlot {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Result of splitting the declared columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnLayout {
    pub left_cols: Vec<ColumnSlot>,
    pub center_cols: Vec<ColumnSlot>,
    pub right_cols: Vec<ColumnSlot>,
    pub left_width: f32,
    pub center_width: f32,
    pub right_width: f32,
}

/// Effective width of a column: unspecified or degenerate widths use the minimum.
pub fn column_width(column: &ColumnDescriptor, min_width: f32) -> f32 {
    match column.width {
        Some(w) if w.is_finite() && w >= min_width => w,
        Some(w) => {
            tracing::warn!(
                column = %column.key,
                width = w,
                min_width,
                "column width below minimum, clamping"
            );
            min_width
        }
        None => min_width,
    }
}

/// Split columns into fixed/scrollable buckets and compute their widths.
///
/// Pure function of the descriptor list: every column lands in exactly one
/// bucket and each bucket keeps declaration order.
pub fn split_columns(columns: &[ColumnDescriptor], min_width: f32) -> ColumnLayout {
    let mut layout = ColumnLayout::default();
    for (index, column) in columns.iter().enumerate() {
        let width = column_width(column, min_width);
        let (slots, total) = match column.fixed {
            Fixed::Left => (&mut layout.left_cols, &mut layout.left_width),
            Fixed::None => (&mut layout.center_cols, &mut layout.center_width),
            Fixed::Right => (&mut layout.right_cols, &mut layout.right_width),
        };
        slots.push(ColumnSlot {
            index,
            x: *total,
            width,
        });
        *total += width;
    }
    layout
}

impl ColumnLayout {
    pub fn bucket(&self, bucket: Bucket) -> &[ColumnSlot] {
        match bucket {
            Bucket::Left => &self.left_cols,
            Bucket::Center => &self.center_cols,
            Bucket::Right => &self.right_cols,
        }
    }

    pub fn bucket_width(&self, bucket: Bucket) -> f32 {
        match bucket {
            Bucket::Left => self.left_width,
            Bucket::Center => self.center_width,
            Bucket::Right => self.right_width,
        }
    }

    pub fn column_count(&self) -> usize {
        self.left_cols.len() + self.center_cols.len() + self.right_cols.len()
    }

    pub fn total_width(&self) -> f32 {
        self.left_width + self.center_width + self.right_width
    }

    /// Find a declared column's bucket and placement.
    pub fn locate(&self, index: usize) -> Option<(Bucket, &ColumnSlot)> {
        Bucket::ALL.into_iter().find_map(|bucket| {
            self.bucket(bucket)
                .iter()
                .find(|slot| slot.index == index)
                .map(|slot| (bucket, slot))
        })
    }

    /// Column under a bucket-relative x coordinate.
    pub fn column_at_x(&self, bucket: Bucket, x: f32) -> Option<usize> {
        if !x.is_finite() || x < 0.0 {
            return None;
        }
        let slots = self.bucket(bucket);
        // First slot whose right edge lies past x
        let pos = slots.partition_point(|slot| slot.right() <= x);
        slots.get(pos).map(|slot| slot.index)
    }
}
