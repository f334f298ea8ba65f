//! Shelf packing of per-font sub-atlases
//!
//! Items are sorted by height and placed left to right on shelves; a new shelf
//! starts when the next item would cross `max_width`. Every item keeps a
//! `padding` border so sampling never bleeds into a neighbour.

use crate::foundation::math::PixelSize;

/// Top-left placement of a packed item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedRect {
    /// Left edge
    pub x: u32,
    /// Top edge (top-left origin)
    pub y: u32,
    /// Item size
    pub size: PixelSize,
}

/// Output of a packing pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackResult {
    /// Placements in input order
    pub rects: Vec<PackedRect>,
    /// Size of the atlas holding every placement
    pub size: PixelSize,
}

/// Simple shelf bin-packer
#[derive(Debug, Clone, Copy)]
pub struct ShelfPacker {
    max_width: u32,
    padding: u32,
}

impl ShelfPacker {
    /// Create a packer with a soft width limit
    ///
    /// Items wider than the limit get a shelf of their own and widen the atlas.
    pub const fn new(max_width: u32, padding: u32) -> Self {
        Self { max_width, padding }
    }

    /// Pack items, returning placements in input order
    pub fn pack(&self, sizes: &[PixelSize]) -> PackResult {
        let pad = self.padding;
        let mut order: Vec<usize> = (0..sizes.len()).collect();
        order.sort_by(|&a, &b| sizes[b].y.cmp(&sizes[a].y).then(a.cmp(&b)));

        let mut rects = vec![PackedRect { x: 0, y: 0, size: PixelSize::zeros() }; sizes.len()];
        let mut shelf_y = pad;
        let mut shelf_height = 0;
        let mut cursor_x = pad;
        let mut width = 0;

        for index in order {
            let size = sizes[index];
            if cursor_x > pad && cursor_x + size.x + pad > self.max_width {
                shelf_y += shelf_height + pad;
                shelf_height = 0;
                cursor_x = pad;
            }

            rects[index] = PackedRect { x: cursor_x, y: shelf_y, size };
            cursor_x += size.x + pad;
            shelf_height = shelf_height.max(size.y);
            width = width.max(cursor_x);
        }

        let height = if sizes.is_empty() { 0 } else { shelf_y + shelf_height + pad };
        let result = PackResult {
            rects,
            size: PixelSize::new(width, height),
        };
        log::debug!("Packed {} sub-atlases into {}x{}", sizes.len(), result.size.x, result.size.y);
        result
    }
}
