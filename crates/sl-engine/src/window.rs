//! Visible symbol grid for one spin

use serde::{Deserialize, Serialize};

use crate::symbols::{SymbolId, SymbolTable};

/// One window cell: a symbol plus an optional drawn value.
///
/// Collectible symbols carry their value here instead of in the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowCell {
    pub symbol: SymbolId,
    pub value: Option<u32>,
}

impl WindowCell {
    pub fn new(symbol: SymbolId) -> Self {
        Self {
            symbol,
            value: None,
        }
    }

    pub fn with_value(symbol: SymbolId, value: u32) -> Self {
        Self {
            symbol,
            value: Some(value),
        }
    }

    /// Two cells show the same face only if symbol and drawn value agree
    pub fn same_face(&self, other: &WindowCell) -> bool {
        self.symbol == other.symbol && self.value == other.value
    }

    /// Display label, e.g. "P1" or "CP_5"
    pub fn label(&self, symbols: &SymbolTable) -> String {
        let name = symbols.name(self.symbol);
        match self.value {
            Some(value) => format!("{name}_{value}"),
            None => name.to_string(),
        }
    }
}

/// Grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// rows × columns grid, row-major; cells stay empty until filled
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolWindow {
    width: usize,
    height: usize,
    cells: Vec<Option<WindowCell>>,
}

impl SymbolWindow {
    /// Empty window of `width` columns and `height` rows
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    /// Build a fully filled window from rows of symbols
    pub fn from_rows(rows: &[Vec<SymbolId>]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut window = Self::new(width, height);
        for (row, symbols) in rows.iter().enumerate() {
            for (col, &symbol) in symbols.iter().enumerate() {
                window.set(row, col, WindowCell::new(symbol));
            }
        }
        window
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell at (row, col); `None` when out of bounds or not yet filled
    pub fn get(&self, row: usize, col: usize) -> Option<WindowCell> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.cells[row * self.width + col]
    }

    /// Place a cell. Out-of-bounds writes are ignored.
    pub fn set(&mut self, row: usize, col: usize, cell: WindowCell) {
        if row < self.height && col < self.width {
            self.cells[row * self.width + col] = Some(cell);
        }
    }

    /// All filled cells with their positions, row by row
    pub fn cells(&self) -> impl Iterator<Item = (Position, WindowCell)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.map(|c| (Position::new(i / self.width, i % self.width), c))
        })
    }

    /// Symbol labels row by row, for spin records
    pub fn labels(&self, symbols: &SymbolTable) -> Vec<Vec<String>> {
        (0..self.height)
            .map(|row| {
                (0..self.width)
                    .map(|col| {
                        self.get(row, col)
                            .map(|cell| cell.label(symbols))
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect()
    }

    pub fn is_filled(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }
}
