//! Static obstacle resistance map painted by the plant tool.
//!
//! Not double buffered: the physics rules only ever read it, and user
//! edits are queued by the simulation and applied between steps.

use glam::Vec2;

use crate::cell::ObstacleCell;
use crate::error::{SimError, SimResult};

/// Painted block half-extent; the reference stamps a 3x3 block per plant.
const PAINT_REACH: i32 = 1;

#[derive(Clone, Debug)]
pub struct ObstacleField {
    width: usize,
    cells: Vec<ObstacleCell>,
}

impl ObstacleField {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            cells: vec![ObstacleCell::default(); width * width],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> ObstacleCell {
        debug_assert!(x < self.width && y < self.width);
        self.cells[y * self.width + x]
    }

    pub fn try_get(&self, x: usize, y: usize) -> SimResult<ObstacleCell> {
        if x < self.width && y < self.width {
            Ok(self.cells[y * self.width + x])
        } else {
            Err(SimError::OutOfRange {
                x,
                y,
                width: self.width,
            })
        }
    }

    /// Set full resistance in a block around a center cell, clipped to the
    /// grid. Idempotent: repainting a resistant cell changes nothing.
    pub fn paint(&mut self, cx: usize, cy: usize) {
        for dy in -PAINT_REACH..=PAINT_REACH {
            for dx in -PAINT_REACH..=PAINT_REACH {
                let x = cx as i32 + dx;
                let y = cy as i32 + dy;
                if x >= 0 && x < self.width as i32 && y >= 0 && y < self.width as i32 {
                    self.cells[y as usize * self.width + x as usize].resistance = 1.0;
                }
            }
        }
    }

    /// Paint centered on the nearest cell to a UV pointer position.
    pub fn paint_uv(&mut self, uv: Vec2) {
        let max = self.width - 1;
        let cx = ((uv.x * self.width as f32) as usize).min(max);
        let cy = ((uv.y * self.width as f32) as usize).min(max);
        self.paint(cx, cy);
    }

    /// Read-only view for the debug overlay.
    pub fn cells(&self) -> &[ObstacleCell] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paints_three_by_three_block() {
        let mut field = ObstacleField::new(8);
        field.paint(4, 4);

        for y in 0..8 {
            for x in 0..8 {
                let expected = (3..=5).contains(&x) && (3..=5).contains(&y);
                assert_eq!(
                    field.get(x, y).resistance,
                    if expected { 1.0 } else { 0.0 },
                    "cell ({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn paint_is_idempotent() {
        let mut once = ObstacleField::new(8);
        once.paint(2, 2);

        let mut twice = once.clone();
        twice.paint(2, 2);

        assert_eq!(once.cells(), twice.cells());
    }

    #[test]
    fn paint_clips_at_corner() {
        let mut field = ObstacleField::new(8);
        field.paint(0, 0);

        assert_eq!(field.get(0, 0).resistance, 1.0);
        assert_eq!(field.get(1, 1).resistance, 1.0);
        assert_eq!(field.get(2, 2).resistance, 0.0);
    }
}
