use thiserror::Error;

/// One slot of a container: empty, or holding a unit of colored liquid.
///
/// Colors are opaque small integers assigned at content-authoring time; the
/// engine only ever compares them for equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Color(u8),
}

impl Cell {
    /// The wire code used for an empty slot.
    pub const EMPTY_CODE: i8 = -1;

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Decodes a cell from the signed wire encoding (`-1` = empty,
    /// non-negative = color).
    pub fn from_code(code: i8) -> Result<Self, LayoutError> {
        match code {
            Self::EMPTY_CODE => Ok(Cell::Empty),
            c if c >= 0 => Ok(Cell::Color(c as u8)),
            c => Err(LayoutError::UnknownCellCode { code: c }),
        }
    }

    pub fn to_code(&self) -> i8 {
        match self {
            Cell::Empty => Self::EMPTY_CODE,
            Cell::Color(c) => *c as i8,
        }
    }
}

/// Errors that can occur while building containers from raw layout data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// A container must have room for at least one cell
    #[error("container has zero capacity")]
    ZeroCapacity,

    /// Liquid may not float above an empty slot
    #[error("container has a liquid cell floating above an empty slot at position {index}")]
    FloatingCell { index: usize },

    /// Cell code outside the wire encoding
    #[error("unknown cell code {code}, expected -1 (empty) or a non-negative color")]
    UnknownCellCode { code: i8 },
}

/// A fixed-capacity ordered stack of cells. Index 0 is the closed bottom,
/// the last index is the open top.
///
/// Gravity invariant: no empty cell sits below a non-empty cell. Enforced at
/// construction and preserved by every pour.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Container {
    cells: Vec<Cell>,
}

impl Container {
    pub fn new(cells: Vec<Cell>) -> Result<Self, LayoutError> {
        if cells.is_empty() {
            return Err(LayoutError::ZeroCapacity);
        }
        let mut seen_empty_at: Option<usize> = None;
        for (index, cell) in cells.iter().enumerate() {
            if cell.is_empty() {
                seen_empty_at.get_or_insert(index);
            } else if seen_empty_at.is_some() {
                return Err(LayoutError::FloatingCell { index });
            }
        }
        Ok(Self { cells })
    }

    /// A container with every slot empty.
    pub fn empty(capacity: usize) -> Result<Self, LayoutError> {
        Self::new(vec![Cell::Empty; capacity])
    }

    /// Decodes a container from bottom-to-top wire codes.
    pub fn from_codes(codes: &[i8]) -> Result<Self, LayoutError> {
        let cells = codes
            .iter()
            .map(|code| Cell::from_code(*code))
            .collect::<Result<Vec<Cell>, LayoutError>>()?;
        Self::new(cells)
    }

    /// Bottom-to-top wire codes.
    pub fn to_codes(&self) -> Vec<i8> {
        self.cells.iter().map(Cell::to_code).collect()
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// True iff every slot is empty.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }

    /// True iff the topmost slot is occupied. Under the gravity invariant
    /// this means every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.cells.last().is_some_and(|cell| !cell.is_empty())
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }
}
