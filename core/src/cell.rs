use serde::{Deserialize, Serialize};

/// Player-visible state of a single cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Hidden,
    Revealed,
    Flagged,
}

impl CellState {
    pub const fn is_unrevealed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged)
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::Hidden
    }
}

/// What a cell holds once uncovered.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellContent {
    Mine,
    AdjacentCount(u8),
}

impl CellContent {
    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }
}

impl Default for CellContent {
    fn default() -> Self {
        Self::AdjacentCount(0)
    }
}

/// Scratch classification assigned by the deducer, never guessed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Deduction {
    Unknown,
    Safe,
    GuaranteedMine,
}

impl Default for Deduction {
    fn default() -> Self {
        Self::Unknown
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub(crate) state: CellState,
    pub(crate) content: CellContent,
    pub(crate) deduction: Deduction,
    pub(crate) hint_marked: bool,
}

/// Read-only projection of a cell for the presentation layer.
///
/// `content` is populated only once the cell is revealed, so a renderer can
/// pick an icon without being able to peek under hidden cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    pub state: CellState,
    pub content: Option<CellContent>,
    pub hint_marked: bool,
}

impl CellView {
    pub(crate) fn from_cell(cell: &Cell) -> Self {
        Self {
            state: cell.state,
            content: match cell.state {
                CellState::Revealed => Some(cell.content),
                CellState::Hidden | CellState::Flagged => None,
            },
            hint_marked: cell.hint_marked,
        }
    }
}
