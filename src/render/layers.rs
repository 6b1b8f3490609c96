//! Layer groups: independently redrawn drawing surfaces.
//!
//! The stage is cut into disjoint rectangles (header, body and summary
//! bands, each split into left/center/right groups, plus the two scrollbar
//! strips). Each layer owns its shapes and a translation; a layer can be
//! repainted alone without touching its neighbours.

use serde::Serialize;

use super::colors::CssColor;
use super::shapes::{Rect, Scene, ShapeId};
use crate::layout::Bucket;

/// Horizontal band a layer belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    Header,
    Body,
    Summary,
    Scrollbar,
}

/// Identifies one layer group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LayerId {
    HeaderLeft,
    HeaderCenter,
    HeaderRight,
    BodyLeft,
    BodyCenter,
    BodyRight,
    SummaryLeft,
    SummaryCenter,
    SummaryRight,
    ScrollbarVertical,
    ScrollbarHorizontal,
}

impl LayerId {
    pub const ALL: [LayerId; 11] = [
        Self::HeaderLeft,
        Self::HeaderCenter,
        Self::HeaderRight,
        Self::BodyLeft,
        Self::BodyCenter,
        Self::BodyRight,
        Self::SummaryLeft,
        Self::SummaryCenter,
        Self::SummaryRight,
        Self::ScrollbarVertical,
        Self::ScrollbarHorizontal,
    ];

    /// Position in [`LayerId::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn band(self) -> Band {
        match self {
            Self::HeaderLeft | Self::HeaderCenter | Self::HeaderRight => Band::Header,
            Self::BodyLeft | Self::BodyCenter | Self::BodyRight => Band::Body,
            Self::SummaryLeft | Self::SummaryCenter | Self::SummaryRight => Band::Summary,
            Self::ScrollbarVertical | Self::ScrollbarHorizontal => Band::Scrollbar,
        }
    }

    pub fn bucket(self) -> Option<Bucket> {
        match self {
            Self::HeaderLeft | Self::BodyLeft | Self::SummaryLeft => Some(Bucket::Left),
            Self::HeaderCenter | Self::BodyCenter | Self::SummaryCenter => Some(Bucket::Center),
            Self::HeaderRight | Self::BodyRight | Self::SummaryRight => Some(Bucket::Right),
            Self::ScrollbarVertical | Self::ScrollbarHorizontal => None,
        }
    }

    /// The layer for a band/bucket pair.
    pub fn for_band(band: Band, bucket: Bucket) -> Option<Self> {
        match (band, bucket) {
            (Band::Header, Bucket::Left) => Some(Self::HeaderLeft),
            (Band::Header, Bucket::Center) => Some(Self::HeaderCenter),
            (Band::Header, Bucket::Right) => Some(Self::HeaderRight),
            (Band::Body, Bucket::Left) => Some(Self::BodyLeft),
            (Band::Body, Bucket::Center) => Some(Self::BodyCenter),
            (Band::Body, Bucket::Right) => Some(Self::BodyRight),
            (Band::Summary, Bucket::Left) => Some(Self::SummaryLeft),
            (Band::Summary, Bucket::Center) => Some(Self::SummaryCenter),
            (Band::Summary, Bucket::Right) => Some(Self::SummaryRight),
            (Band::Scrollbar, _) => None,
        }
    }

    /// Whether the layer follows `scroll_x`.
    pub fn scrolls_x(self) -> bool {
        self.bucket() == Some(Bucket::Center)
    }

    /// Whether the layer follows `scroll_y`.
    pub fn scrolls_y(self) -> bool {
        self.band() == Band::Body
    }

    fn bit(self) -> u16 {
        1 << self.index()
    }
}

/// Small bitset of layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayerSet(u16);

impl LayerSet {
    pub const EMPTY: LayerSet = LayerSet(0);

    pub fn all() -> Self {
        LayerId::ALL.into_iter().collect()
    }

    pub fn only(layer: LayerId) -> Self {
        Self(layer.bit())
    }

    /// Every layer in a band.
    pub fn band(band: Band) -> Self {
        LayerId::ALL.into_iter().filter(|l| l.band() == band).collect()
    }

    pub fn insert(&mut self, layer: LayerId) {
        self.0 |= layer.bit();
    }

    pub fn contains(self, layer: LayerId) -> bool {
        self.0 & layer.bit() != 0
    }

    pub fn union(self, other: LayerSet) -> Self {
        Self(self.0 | other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = LayerId> {
        LayerId::ALL.into_iter().filter(move |l| self.contains(*l))
    }
}

impl FromIterator<LayerId> for LayerSet {
    fn from_iter<I: IntoIterator<Item = LayerId>>(iter: I) -> Self {
        let mut set = LayerSet::EMPTY;
        for layer in iter {
            set.insert(layer);
        }
        set
    }
}

impl std::ops::BitOrAssign for LayerSet {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Reference to a shape inside a particular layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeRef {
    pub layer: LayerId,
    pub shape: ShapeId,
}

/// A drawing surface: a clip rectangle on the stage plus a translated scene
#[derive(Debug, Clone)]
pub struct Layer {
    pub id: LayerId,
    /// Region of the stage this layer paints into
    pub clip: Rect,
    /// Translation applied to every shape (negative scroll)
    pub offset_x: f32,
    pub offset_y: f32,
    pub background: CssColor,
    pub font: String,
    pub scene: Scene,
}

impl Layer {
    pub fn new(id: LayerId) -> Self {
        Self {
            id,
            clip: Rect::default(),
            offset_x: 0.0,
            offset_y: 0.0,
            background: String::new(),
            font: String::new(),
            scene: Scene::new(),
        }
    }

    /// Stage position of a layer-local point.
    pub fn to_stage(&self, x: f32, y: f32) -> (f32, f32) {
        (self.clip.x + self.offset_x + x, self.clip.y + self.offset_y + y)
    }
}
