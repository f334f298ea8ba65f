//! Atlas orientation variants
//!
//! Skins paint numbers in four directions. Instead of rotating at runtime, the
//! atlas builder stores each font already rotated/mirrored, and the layout
//! engine only needs to know the resulting axis and whether the digit order
//! is reversed.
//!
//! | Variant               | rotate | invert X | invert Y | orientation | reverse |
//! |-----------------------|--------|----------|----------|-------------|---------|
//! | `LeftToRight`         | no     | no       | no       | Horizontal  | no      |
//! | `TopDown`             | yes    | no       | no       | Vertical    | yes     |
//! | `BottomUp`            | yes    | yes      | yes      | Vertical    | no      |
//! | `InvertedRightToLeft` | no     | yes      | yes      | Horizontal  | yes     |
//!
//! Rotation is 90° clockwise and is applied before the mirrors.

use image::{imageops, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::foundation::math::{PixelPos, PixelSize};
use crate::scheme::Orientation;

/// Rotate/mirror flags of one variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationProps {
    /// Rotate 90° clockwise
    pub rotate: bool,
    /// Mirror horizontally after rotating
    pub invert_x: bool,
    /// Mirror vertically after rotating
    pub invert_y: bool,
}

impl RotationProps {
    const fn new(rotate: bool, invert_x: bool, invert_y: bool) -> Self {
        Self { rotate, invert_x, invert_y }
    }
}

/// Indexed by `AtlasRotation as usize`
const ROTATION_TABLE: [RotationProps; 4] = [
    RotationProps::new(false, false, false),
    RotationProps::new(true, false, false),
    RotationProps::new(true, true, true),
    RotationProps::new(false, true, true),
];

/// Direction in which a font's numbers read on the destination texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AtlasRotation {
    /// Upright, left to right
    #[default]
    LeftToRight = 0,
    /// Rotated, reading downwards
    TopDown = 1,
    /// Rotated, reading upwards
    BottomUp = 2,
    /// Upside down, reading right to left
    InvertedRightToLeft = 3,
}

impl AtlasRotation {
    /// Every variant in table order
    pub const ALL: [Self; 4] = [
        Self::LeftToRight,
        Self::TopDown,
        Self::BottomUp,
        Self::InvertedRightToLeft,
    ];

    /// Rotate/mirror flags for this variant
    pub const fn props(self) -> RotationProps {
        ROTATION_TABLE[self as usize]
    }

    /// Layout axis of fonts built with this variant
    pub const fn orientation(self) -> Orientation {
        if self.props().rotate {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        }
    }

    /// Whether digits have to be emitted last-to-first
    pub const fn reverse_digits(self) -> bool {
        let p = self.props();
        (p.rotate && !p.invert_x && !p.invert_y) || (!p.rotate && p.invert_x && p.invert_y)
    }

    /// Image size after the transform
    pub fn rotated_size(self, size: PixelSize) -> PixelSize {
        if self.props().rotate {
            PixelSize::new(size.y, size.x)
        } else {
            size
        }
    }

    /// Where a glyph lands in the transformed image
    ///
    /// `(x, y)` is the glyph's top-left corner in the untransformed image
    /// (top-left origin) and `atlas_size` the transformed image size. The
    /// result is the glyph's left edge and its top edge measured from the
    /// bottom of the transformed image.
    pub fn map_glyph_rect(self, x: i32, y: i32, width: i32, height: i32, atlas_size: PixelSize) -> PixelPos {
        let props = self.props();
        let atlas_w = atlas_size.x as i32;
        let atlas_h = atlas_size.y as i32;

        let (mut x, mut y, footprint_w, footprint_h) = if props.rotate {
            // Source rows become columns counted from the right
            (atlas_w - y - height, x, height, width)
        } else {
            (x, y, width, height)
        };

        y = atlas_h - y;

        if props.invert_x {
            x = atlas_w - x - footprint_w;
        }
        if props.invert_y {
            y = atlas_h - y + footprint_h;
        }

        PixelPos::new(x, y)
    }

    /// Apply the transform to image pixels
    pub fn transform_image(self, image: &RgbaImage) -> RgbaImage {
        let props = self.props();
        let mut out = if props.rotate {
            imageops::rotate90(image)
        } else {
            image.clone()
        };
        if props.invert_x {
            imageops::flip_horizontal_in_place(&mut out);
        }
        if props.invert_y {
            imageops::flip_vertical_in_place(&mut out);
        }
        out
    }
}
