use glam::Vec2;

use crate::constants::{BOARD_COLS, BOARD_ROWS};
use crate::error::{CoreError, CoreResult};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGeometry {
    width: f32,
    height: f32,
}

impl TileGeometry {
    pub fn new(width: f32, height: f32) -> CoreResult<Self> {
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return Err(CoreError::UndefinedOperation(
                "tile size must be finite and non-zero",
            ));
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Pixel position of a tile corner; tiles may be fractional (the home pen
    /// sits half a tile off the grid).
    pub fn tile_to_pixel(&self, col: f32, row: f32) -> Vec2 {
        Vec2::new(col * self.width, row * self.height)
    }

    pub fn pixel_to_tile(&self, position: Vec2) -> Vec2 {
        Vec2::new(position.x / self.width, position.y / self.height)
    }

    pub fn board_size(&self) -> Vec2 {
        Vec2::new(
            self.width * BOARD_COLS as f32,
            self.height * BOARD_ROWS as f32,
        )
    }
}

/// Integer lookup key for a pixel position. Node positions are always exact
/// multiples of half a tile, so rounding is lossless.
pub fn pixel_key(position: Vec2) -> (i32, i32) {
    (position.x.round() as i32, position.y.round() as i32)
}

/// True once `position` has travelled at least as far from `node` as
/// `target` is. Compares squared lengths only.
pub fn overshot(node: Vec2, target: Vec2, position: Vec2) -> bool {
    let node_to_target = (target - node).length_squared();
    let node_to_self = (position - node).length_squared();
    node_to_self >= node_to_target
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_tile_size_is_undefined() {
        assert!(matches!(
            TileGeometry::new(0.0, 16.0),
            Err(CoreError::UndefinedOperation(_))
        ));
        assert!(matches!(
            TileGeometry::new(16.0, f32::NAN),
            Err(CoreError::UndefinedOperation(_))
        ));
    }

    #[test]
    fn tile_pixel_conversion_round_trips_half_tiles() {
        let geometry = TileGeometry::new(16.0, 16.0).expect("valid geometry");
        let pixel = geometry.tile_to_pixel(11.5, 14.0);
        assert_eq!(pixel, Vec2::new(184.0, 224.0));
        assert_eq!(geometry.pixel_to_tile(pixel), Vec2::new(11.5, 14.0));
        assert_eq!(pixel_key(pixel), (184, 224));
    }

    #[test]
    fn overshoot_stays_true_while_advancing() {
        let node = Vec2::new(0.0, 0.0);
        let target = Vec2::new(16.0, 0.0);
        assert!(!overshot(node, target, Vec2::new(15.9, 0.0)));
        let mut position = Vec2::new(16.0, 0.0);
        for _ in 0..50 {
            assert!(overshot(node, target, position));
            position += Vec2::new(0.7, 0.0);
        }
    }

    #[test]
    fn stationary_entity_counts_as_arrived() {
        let node = Vec2::new(32.0, 48.0);
        assert!(overshot(node, node, node));
    }
}
