//! Layout arithmetic shared by the screens. No state lives here.

use ratatui::layout::Rect;

/// Hands out consecutive full-width rows of a frame, top to bottom.
///
/// Rows that would start below the frame are never returned and the last
/// row is clipped to the frame's bottom edge, so content laid out through
/// `Rows` cannot spill past a border no matter how short the terminal is.
pub struct Rows {
    area: Rect,
    y: u16,
}

impl Rows {
    pub fn new(area: Rect) -> Self {
        Self { area, y: area.y }
    }

    /// Take the next `height` rows, clipped to the frame. `None` once the
    /// frame is exhausted.
    pub fn take(&mut self, height: u16) -> Option<Rect> {
        let bottom = self.area.bottom();
        if self.y >= bottom || height == 0 {
            self.y = self.y.saturating_add(height);
            return None;
        }
        let visible = height.min(bottom - self.y);
        let rect = Rect::new(self.area.x, self.y, self.area.width, visible);
        self.y = self.y.saturating_add(height);
        Some(rect)
    }

    /// Skip `height` rows.
    pub fn skip(&mut self, height: u16) {
        self.y = self.y.saturating_add(height);
    }
}

/// A `width × height` rect centered in `outer`, shrunk to fit when `outer`
/// is smaller.
pub fn centered(width: u16, height: u16, outer: Rect) -> Rect {
    let width = width.min(outer.width);
    let height = height.min(outer.height);
    Rect::new(
        outer.x + (outer.width - width) / 2,
        outer.y + (outer.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_clip_last_row_to_frame() {
        let mut rows = Rows::new(Rect::new(0, 0, 10, 4));
        assert_eq!(rows.take(3), Some(Rect::new(0, 0, 10, 3)));
        assert_eq!(rows.take(3), Some(Rect::new(0, 3, 10, 1)));
        assert_eq!(rows.take(1), None);
    }

    #[test]
    fn test_rows_skip_advances() {
        let mut rows = Rows::new(Rect::new(2, 5, 10, 10));
        rows.skip(2);
        assert_eq!(rows.take(1), Some(Rect::new(2, 7, 10, 1)));
    }

    #[test]
    fn test_centered_shrinks_to_outer() {
        let outer = Rect::new(0, 0, 60, 20);
        assert_eq!(centered(77, 30, outer), Rect::new(0, 0, 60, 20));
        assert_eq!(centered(20, 10, outer), Rect::new(20, 5, 20, 10));
    }
}
