use serde::{Deserialize, Serialize};

/// Screen geometry the grid is cut from. The shop panel takes the right
/// edge of the screen; the field is everything left of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLayout {
    pub width: i32,
    pub height: i32,
    pub cell_size: i32,
    pub shop_width: i32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            width: 1536,
            height: 1024,
            cell_size: 128,
            shop_width: 320,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    layout: GridLayout,
    cols: i32,
    rows: i32,
}

impl Grid {
    pub fn new(layout: GridLayout) -> Self {
        let cell_size = layout.cell_size.max(1);
        Self {
            layout,
            cols: ((layout.width - layout.shop_width) / cell_size).max(0),
            rows: (layout.height / cell_size).max(0),
        }
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn layout(&self) -> GridLayout {
        self.layout
    }

    /// The cell under a screen position. The result may lie outside the
    /// grid; check it with [`Grid::contains`].
    pub fn cell_at(&self, px: i32, py: i32) -> Cell {
        let cell_size = self.layout.cell_size.max(1);
        Cell {
            x: px.div_euclid(cell_size),
            y: py.div_euclid(cell_size),
        }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        (0..self.cols).contains(&cell.x) && (0..self.rows).contains(&cell.y)
    }

    /// Whether a screen x coordinate is left of the shop panel.
    pub fn in_field(&self, px: i32) -> bool {
        px < self.layout.width - self.layout.shop_width
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(GridLayout::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dimensions() {
        let grid = Grid::default();
        assert_eq!(grid.cols(), 9);
        assert_eq!(grid.rows(), 8);
    }

    #[test]
    fn test_cell_at() {
        let grid = Grid::default();
        assert_eq!(grid.cell_at(0, 0), Cell { x: 0, y: 0 });
        assert_eq!(grid.cell_at(130, 300), Cell { x: 1, y: 2 });
        assert_eq!(grid.cell_at(-1, 5), Cell { x: -1, y: 0 });
    }

    #[test]
    fn test_field_strip_past_last_column() {
        let grid = Grid::default();
        let cell = grid.cell_at(1200, 10);
        assert!(grid.in_field(1200));
        assert!(!grid.contains(cell));
        assert!(!grid.in_field(1300));
    }
}
