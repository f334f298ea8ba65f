//! Math utilities and types
//!
//! Pixel sizes, integer positions and UV rectangles used by the atlas builder
//! and the layout engine.

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Integer pixel size (width, height)
pub type PixelSize = Vector2<u32>;

/// Integer pixel position, may be negative while composing transforms
pub type PixelPos = Vector2<i32>;

/// Axis-aligned rectangle in normalized texture space
///
/// Stored in shader order: left, bottom, right, top. Texture space has its
/// origin at the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UvRect {
    /// Left edge
    pub left: f32,
    /// Bottom edge
    pub bottom: f32,
    /// Right edge
    pub right: f32,
    /// Top edge
    pub top: f32,
}

impl UvRect {
    /// Normalize a pixel rectangle (bottom-left origin) by a texture size
    pub fn from_pixels(left: i32, bottom: i32, right: i32, top: i32, size: PixelSize) -> Self {
        let w = size.x as f32;
        let h = size.y as f32;
        Self {
            left: left as f32 / w,
            bottom: bottom as f32 / h,
            right: right as f32 / w,
            top: top as f32 / h,
        }
    }

    /// Rectangle width in UV units
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Rectangle height in UV units
    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// Pack as a shader vector
    pub const fn to_array(self) -> [f32; 4] {
        [self.left, self.bottom, self.right, self.top]
    }
}
