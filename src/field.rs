//! Double-buffered square grid field.
//!
//! Every step reads the full previous-frame snapshot and writes the next
//! buffer; `swap` promotes next to current exactly once per completed step.
//! No update rule ever reads the write buffer, which is what makes the
//! per-cell pass embarrassingly data-parallel.

use glam::Vec2;

use crate::error::{SimError, SimResult};

/// A WIDTH x WIDTH row-major grid with `{current, next}` buffers.
#[derive(Clone, Debug)]
pub struct Field<T> {
    width: usize,
    current: Vec<T>,
    next: Vec<T>,
}

impl<T: Copy + Default> Field<T> {
    pub fn new(width: usize) -> Self {
        Self::filled(width, T::default())
    }

    /// Grid with every cell of both buffers set to `value`.
    pub fn filled(width: usize, value: T) -> Self {
        Self {
            width,
            current: vec![value; width * width],
            next: vec![value; width * width],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Row-major index for local coordinates.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.width);
        y * self.width + x
    }

    /// Read from the current (previous-step) buffer.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.current[self.index(x, y)]
    }

    /// Bounds-checked read for callers outside the update loop.
    pub fn try_get(&self, x: usize, y: usize) -> SimResult<T> {
        if x < self.width && y < self.width {
            Ok(self.current[y * self.width + x])
        } else {
            Err(SimError::OutOfRange {
                x,
                y,
                width: self.width,
            })
        }
    }

    /// Read with edge clamping: out-of-bounds neighbors resolve to the
    /// nearest edge cell, so border cells see themselves as their own
    /// missing neighbor.
    #[inline]
    pub fn get_clamped(&self, x: i32, y: i32) -> T {
        let max = self.width as i32 - 1;
        let cx = x.clamp(0, max) as usize;
        let cy = y.clamp(0, max) as usize;
        self.current[cy * self.width + cx]
    }

    /// Write into the next buffer only. Visible after `swap`.
    #[inline]
    pub fn write(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.next[idx] = value;
    }

    /// Split borrow for the parallel pass: read snapshot, write buffer.
    pub fn buffers(&mut self) -> (&[T], &mut [T]) {
        (&self.current, &mut self.next)
    }

    /// Promote next -> current. Atomic with respect to the full grid:
    /// a step either publishes every cell or none.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }

    /// Read-only view of the current buffer (render source).
    pub fn current(&self) -> &[T] {
        &self.current
    }

    /// Overwrite one cell in BOTH buffers. For initialization and
    /// between-step edits only, never during a pass.
    pub fn set_both(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.current[idx] = value;
        self.next[idx] = value;
    }

    /// UV coordinate of a cell center, matching the reference pixel-center
    /// convention `(x + 0.5) / width`.
    #[inline]
    pub fn cell_uv(&self, x: usize, y: usize) -> Vec2 {
        let w = self.width as f32;
        Vec2::new((x as f32 + 0.5) / w, (y as f32 + 0.5) / w)
    }

    /// Nearest cell to a UV position in [0,1]^2.
    pub fn uv_to_cell(&self, uv: Vec2) -> (usize, usize) {
        let max = self.width - 1;
        let x = ((uv.x * self.width as f32) as usize).min(max);
        let y = ((uv.y * self.width as f32) as usize).min(max);
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_invisible_until_swap() {
        let mut field: Field<f32> = Field::new(4);
        field.write(1, 2, 7.0);

        // Read buffer still holds the old value
        assert_eq!(field.get(1, 2), 0.0);

        field.swap();
        assert_eq!(field.get(1, 2), 7.0);
    }

    #[test]
    fn try_get_out_of_range() {
        let field: Field<f32> = Field::new(4);
        assert!(field.try_get(3, 3).is_ok());
        assert!(matches!(
            field.try_get(4, 0),
            Err(SimError::OutOfRange { x: 4, y: 0, width: 4 })
        ));
    }

    #[test]
    fn clamped_reads_mirror_edges() {
        let mut field: Field<f32> = Field::new(3);
        field.set_both(0, 0, 5.0);
        field.set_both(2, 2, 9.0);

        assert_eq!(field.get_clamped(-1, 0), 5.0);
        assert_eq!(field.get_clamped(0, -1), 5.0);
        assert_eq!(field.get_clamped(3, 2), 9.0);
        assert_eq!(field.get_clamped(2, 3), 9.0);
    }

    #[test]
    fn uv_round_trip() {
        let field: Field<f32> = Field::new(128);
        let uv = field.cell_uv(64, 123);
        assert_eq!(field.uv_to_cell(uv), (64, 123));
        // Corners clamp instead of indexing out of range
        assert_eq!(field.uv_to_cell(Vec2::new(1.0, 1.0)), (127, 127));
    }
}
