use qtally_core::CellValue;
use std::collections::HashMap;

/// Inclusive rectangle of a sheet that holds data, as absolute 0-based `(row, col)` corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsedRange {
    pub start: (u32, u32),
    pub end: (u32, u32),
}

impl UsedRange {
    #[must_use]
    pub fn new(start: (u32, u32), end: (u32, u32)) -> Self {
        UsedRange {
            start: (start.0.min(end.0), start.1.min(end.1)),
            end: (start.0.max(end.0), start.1.max(end.1)),
        }
    }

    /// Grow the range so it covers `(row, col)`.
    #[must_use]
    pub fn including(self, row: u32, col: u32) -> Self {
        UsedRange {
            start: (self.start.0.min(row), self.start.1.min(col)),
            end: (self.end.0.max(row), self.end.1.max(col)),
        }
    }

    /// Columns covered by the range.
    pub fn columns(&self) -> std::ops::RangeInclusive<u32> {
        self.start.1..=self.end.1
    }
}

/// One decoded cell: its cached value and whether a formula produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCell {
    pub value: CellValue,
    pub is_formula: bool,
}

impl RawCell {
    #[must_use]
    pub fn value(value: impl Into<CellValue>) -> Self {
        RawCell {
            value: value.into(),
            is_formula: false,
        }
    }

    #[must_use]
    pub fn formula(cached: impl Into<CellValue>) -> Self {
        RawCell {
            value: cached.into(),
            is_formula: true,
        }
    }
}

/// A sparse cell grid handed over by a decoder, with the sheet's declared used range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    range: Option<UsedRange>,
    cells: HashMap<(u32, u32), RawCell>,
}

impl Grid {
    /// Create a grid with no used range (an empty sheet)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty grid that declares a used range.
    #[must_use]
    pub fn with_range(range: UsedRange) -> Self {
        Grid {
            range: Some(range),
            cells: HashMap::new(),
        }
    }

    /// Build a grid from row-major data anchored at `A1`.
    pub fn from_rows<I, R, V>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let mut grid = Grid::new();
        for (r, row) in rows.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                grid.set(r as u32, c as u32, RawCell::value(value));
            }
        }
        grid
    }

    /// Place a cell, growing the used range to cover it.
    pub fn set(&mut self, row: u32, col: u32, cell: RawCell) {
        self.include(row, col);
        self.cells.insert((row, col), cell);
    }

    /// Mark an existing or missing cell as formula-bearing.
    pub fn mark_formula(&mut self, row: u32, col: u32) {
        self.include(row, col);
        self.cells.entry((row, col)).or_default().is_formula = true;
    }

    /// Grow the used range to cover a position without storing a cell.
    pub fn include(&mut self, row: u32, col: u32) {
        self.range = Some(match self.range {
            Some(range) => range.including(row, col),
            None => UsedRange::new((row, col), (row, col)),
        });
    }

    #[must_use]
    pub fn used_range(&self) -> Option<UsedRange> {
        self.range
    }

    #[must_use]
    pub fn cell_at(&self, row: u32, col: u32) -> Option<&RawCell> {
        self.cells.get(&(row, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_declares_bounding_range() {
        let grid = Grid::from_rows(vec![vec!["a", "b"], vec!["c", "d", "e"]]);
        assert_eq!(grid.used_range(), Some(UsedRange::new((0, 0), (1, 2))));
        assert_eq!(grid.cell_at(1, 2).unwrap().value, CellValue::text("e"));
        assert!(grid.cell_at(0, 2).is_none());
    }

    #[test]
    fn test_empty_grid_has_no_range() {
        let rows: Vec<Vec<&str>> = Vec::new();
        assert_eq!(Grid::from_rows(rows).used_range(), None);
    }

    #[test]
    fn test_mark_formula_keeps_value() {
        let mut grid = Grid::new();
        grid.set(3, 4, RawCell::value(2.0));
        grid.mark_formula(3, 4);
        grid.mark_formula(5, 1);

        assert_eq!(grid.cell_at(3, 4), Some(&RawCell::formula(2.0)));
        assert_eq!(grid.cell_at(5, 1), Some(&RawCell::formula(CellValue::Empty)));
        assert_eq!(grid.used_range(), Some(UsedRange::new((3, 1), (5, 4))));
    }
}
