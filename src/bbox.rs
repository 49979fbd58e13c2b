use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

/// Axis-aligned box, left-top and right-bottom corners in pixel coordinates.
/// x1 <= x2 and y1 <= y2 are assumed, not enforced.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct BBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BBox {
    #[inline]
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    #[inline(always)]
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    #[inline(always)]
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    #[inline]
    pub fn center(&self) -> na::Point2<f32> {
        na::Point2::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }
}

impl From<BBox> for [f32; 4] {
    #[inline]
    fn from(bbox: BBox) -> Self {
        [bbox.x1, bbox.y1, bbox.x2, bbox.y2]
    }
}

impl From<[f32; 4]> for BBox {
    #[inline]
    fn from([x1, y1, x2, y2]: [f32; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}
