use serde::{Deserialize, Serialize};

use crate::{Direction, PixelPosition, Position};

/// Converts between grid cells and pixel space and decides when a moving
/// agent counts as centred on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateMapper {
    pub cell_size: f32,
    /// Maximum per-axis offset from a cell centre that still counts as aligned.
    /// Must stay below the per-tick speed so a crossing is aligned exactly once.
    pub tolerance: f32,
}

impl CoordinateMapper {
    pub fn new(cell_size: f32, tolerance: f32) -> Self {
        CoordinateMapper {
            cell_size,
            tolerance,
        }
    }

    /// Centre of `pos` in pixels.
    pub fn grid_to_pixel(&self, pos: Position) -> PixelPosition {
        let half = self.cell_size / 2.0;
        PixelPosition::new(
            pos.col as f32 * self.cell_size + half,
            pos.row as f32 * self.cell_size + half,
        )
    }

    /// Cell containing `pixel`. Negative coordinates clamp to cell zero.
    pub fn pixel_to_grid(&self, pixel: PixelPosition) -> Position {
        Position::new(
            (pixel.y / self.cell_size).floor().max(0.0) as usize,
            (pixel.x / self.cell_size).floor().max(0.0) as usize,
        )
    }

    pub fn is_aligned(&self, pixel: PixelPosition) -> bool {
        let center = self.grid_to_pixel(self.pixel_to_grid(pixel));
        (pixel.x - center.x).abs() <= self.tolerance && (pixel.y - center.y).abs() <= self.tolerance
    }

    /// Moves `pixel` by `speed` along `direction`.
    pub fn displace(&self, pixel: PixelPosition, direction: Direction, speed: f32) -> PixelPosition {
        let (dr, dc) = direction.delta();
        PixelPosition::new(pixel.x + dc as f32 * speed, pixel.y + dr as f32 * speed)
    }
}
