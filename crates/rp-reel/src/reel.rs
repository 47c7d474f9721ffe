//! A single reel: one column's rotating position on a symbol ring

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ring::SymbolRing;

/// A rotating position on a shared, read-only ring.
///
/// The position is an index into the ring. A non-integral position means the
/// reel sits between two symbols: `p` is `p - floor(p)` of the way from
/// symbol `floor(p)` to symbol `floor(p) + 1`.
#[derive(Debug, Clone)]
pub struct Reel {
    ring: Arc<SymbolRing>,
    column: usize,
    position: f64,
}

impl Reel {
    /// Create a reel resting on the first symbol
    pub fn new(ring: Arc<SymbolRing>, column: usize) -> Self {
        Self {
            ring,
            column,
            position: 0.0,
        }
    }

    /// The ring this reel cycles through
    pub fn ring(&self) -> &SymbolRing {
        &self.ring
    }

    /// Column (slot number) of this reel
    pub fn column(&self) -> usize {
        self.column
    }

    /// Normalized fractional position in `[0, N)`
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Move forward (or backward for negative deltas) and re-normalize
    pub fn advance(&mut self, delta: f64) {
        if !delta.is_finite() {
            log::warn!("reel {}: ignoring non-finite advance {}", self.column, delta);
            return;
        }
        self.position = self.ring.normalize(self.position + delta);
    }

    /// Place the reel exactly on a ring index
    pub fn set_index(&mut self, index: usize) {
        self.position = self.ring.normalize(index as f64);
    }

    /// Index of the symbol closest to the window centre
    pub fn current_display_index(&self) -> usize {
        let nearest = (self.position + 0.5).floor() as i64;
        nearest.rem_euclid(self.ring.len() as i64) as usize
    }

    /// Offset of the displayed symbol from the window centre, in `[-0.5, 0.5)`
    pub fn fractional_offset(&self) -> f64 {
        self.position - (self.position + 0.5).floor()
    }

    /// Symbol closest to the window centre
    pub fn current_symbol(&self) -> char {
        self.ring.symbols()[self.current_display_index()]
    }

    /// The displayed symbol plus `neighbors` symbols on each side.
    ///
    /// A renderer places each cell at `shift - offset` symbol heights from
    /// the centre line.
    pub fn window(&self, neighbors: usize) -> Vec<WindowCell> {
        let centre = (self.position + 0.5).floor() as i64;
        let offset = self.fractional_offset();
        let reach = neighbors as i64;

        (-reach..=reach)
            .map(|shift| WindowCell {
                symbol: self.ring.symbol_at(centre + shift),
                shift,
                offset,
            })
            .collect()
    }

    /// Rectangle this reel occupies inside its container
    pub fn layout(&self, total_columns: usize, container_width: f64, container_height: f64) -> ReelRect {
        ReelRect::for_column(self.column, total_columns, container_width, container_height)
    }
}

/// One symbol slot of a reel window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowCell {
    pub symbol: char,
    /// Row relative to the centre (negative = above)
    pub shift: i64,
    /// Fractional offset shared by the whole window
    pub offset: f64,
}

impl WindowCell {
    /// Vertical displacement from the centre line, in symbol heights
    pub fn displacement(&self) -> f64 {
        self.shift as f64 - self.offset
    }
}

/// Axis-aligned rectangle in container coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ReelRect {
    /// Equal-width column split of a container
    pub fn for_column(column: usize, total_columns: usize, container_width: f64, container_height: f64) -> Self {
        let width = container_width / total_columns.max(1) as f64;
        Self {
            x: column as f64 * width,
            y: 0.0,
            width,
            height: container_height,
        }
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reel() -> Reel {
        Reel::new(Arc::new(SymbolRing::alphabet_with('#').unwrap()), 0)
    }

    #[test]
    fn test_advance_wraps() {
        let mut reel = reel();
        reel.advance(30.0);
        assert_relative_eq!(reel.position(), 3.0);
        reel.advance(-4.0);
        assert_relative_eq!(reel.position(), 26.0);
        reel.advance(0.0);
        assert_relative_eq!(reel.position(), 26.0);
    }

    #[test]
    fn test_advance_ignores_non_finite() {
        let mut reel = reel();
        reel.advance(2.5);
        reel.advance(f64::INFINITY);
        reel.advance(f64::NAN);
        assert_relative_eq!(reel.position(), 2.5);
    }

    #[test]
    fn test_display_index_and_offset() {
        let mut reel = reel();
        reel.advance(10.25);
        assert_eq!(reel.current_display_index(), 10);
        assert_relative_eq!(reel.fractional_offset(), 0.25);

        reel.set_index(10);
        reel.advance(0.5);
        assert_eq!(reel.current_display_index(), 11);
        assert_relative_eq!(reel.fractional_offset(), -0.5);

        reel.set_index(26);
        reel.advance(0.75);
        assert_eq!(reel.current_display_index(), 0);
        assert_eq!(reel.current_symbol(), 'A');
    }

    #[test]
    fn test_window_neighbours() {
        let mut reel = reel();
        reel.set_index(0);
        let cells = reel.window(1);
        let symbols: Vec<char> = cells.iter().map(|c| c.symbol).collect();
        assert_eq!(symbols, vec!['#', 'A', 'B']);
        assert_eq!(cells[0].shift, -1);
        assert_relative_eq!(cells[2].displacement(), 1.0);
    }

    #[test]
    fn test_layout_columns() {
        let reel = Reel::new(Arc::new(SymbolRing::alphabet()), 2);
        let rect = reel.layout(5, 1000.0, 200.0);
        assert_relative_eq!(rect.x, 400.0);
        assert_relative_eq!(rect.width, 200.0);
        assert_relative_eq!(rect.center_x(), 500.0);
        assert_relative_eq!(rect.center_y(), 100.0);
    }
}
