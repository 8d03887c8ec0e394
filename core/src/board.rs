use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Owns the grid of cells plus the derived counts the engine needs.
///
/// Created whole at session start or restart and replaced wholesale on
/// restart; dimensions are never mutated in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    grid: Array2<Cell>,
    mine_count: CellCount,
    revealed_count: CellCount,
    flagged_count: CellCount,
}

impl Board {
    pub(crate) fn empty(config: GameConfig) -> Self {
        Self {
            grid: Array2::default((config.rows, config.cols).to_nd_index()),
            mine_count: 0,
            revealed_count: 0,
            flagged_count: 0,
        }
    }

    /// Builds a fully generated board from an explicit mine layout.
    pub fn from_mine_coords(rows: Coord, cols: Coord, mine_coords: &[Coord2]) -> Result<Self> {
        let config = GameConfig::new(rows, cols, mine_coords.len() as CellCount);
        config.validate()?;

        let mut board = Self::empty(config);
        for &coords in mine_coords {
            if coords.0 >= rows || coords.1 >= cols {
                return Err(GameError::InvalidCoords);
            }
            board.set_mine(coords);
        }
        board.compute_adjacency();
        Ok(board)
    }

    pub fn rows(&self) -> Coord {
        self.grid.dim().0.try_into().unwrap()
    }

    pub fn cols(&self) -> Coord {
        self.grid.dim().1.try_into().unwrap()
    }

    pub fn size(&self) -> Coord2 {
        (self.rows(), self.cols())
    }

    pub fn total_cells(&self) -> CellCount {
        self.grid.len().try_into().unwrap()
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    /// How many mines have not been flagged yet; negative when over-flagged.
    pub fn mines_left(&self) -> isize {
        (self.mine_count as isize) - (self.flagged_count as isize)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if coords.0 < self.rows() && coords.1 < self.cols() {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self.cell(coords).content.is_mine()
    }

    pub fn cell_view(&self, coords: Coord2) -> CellView {
        CellView::from_cell(self.cell(coords))
    }

    /// True once every non-mine cell has been revealed.
    pub fn is_cleared(&self) -> bool {
        self.revealed_count == self.safe_cell_count()
    }

    pub(crate) fn cell(&self, coords: Coord2) -> &Cell {
        &self.grid[coords.to_nd_index()]
    }

    pub(crate) fn cell_mut(&mut self, coords: Coord2) -> &mut Cell {
        &mut self.grid[coords.to_nd_index()]
    }

    pub(crate) fn set_mine(&mut self, coords: Coord2) {
        let cell = self.cell_mut(coords);
        if !cell.content.is_mine() {
            cell.content = CellContent::Mine;
            self.mine_count += 1;
        }
    }

    /// Counts the mine cells in the Moore neighborhood of `coords`.
    pub(crate) fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self.iter_neighbors(coords)
            .filter(|&pos| self.contains_mine(pos))
            .count()
            .try_into()
            .unwrap()
    }

    /// Assigns every non-mine cell its adjacency number. Idempotent over a
    /// fixed mine layout; runs once per generation pass.
    pub(crate) fn compute_adjacency(&mut self) {
        for coords in self.coords_row_major() {
            if self.contains_mine(coords) {
                continue;
            }
            let count = self.adjacent_mine_count(coords);
            self.cell_mut(coords).content = CellContent::AdjacentCount(count);
        }
    }

    /// Transitions a cell to `Revealed`, clearing any flag or hint marker.
    ///
    /// `revealed_count` tracks safe cells only; the win check compares it
    /// against `safe_cell_count`.
    pub(crate) fn mark_revealed(&mut self, coords: Coord2) {
        let was_flagged = self.cell(coords).state == CellState::Flagged;
        let is_mine = self.contains_mine(coords);

        let cell = self.cell_mut(coords);
        cell.state = CellState::Revealed;
        cell.hint_marked = false;

        if was_flagged {
            self.flagged_count -= 1;
        }
        if !is_mine {
            self.revealed_count += 1;
        }
    }

    pub(crate) fn set_flagged(&mut self, coords: Coord2) {
        self.cell_mut(coords).state = CellState::Flagged;
        self.flagged_count += 1;
    }

    pub(crate) fn clear_flag(&mut self, coords: Coord2) {
        self.cell_mut(coords).state = CellState::Hidden;
        self.flagged_count -= 1;
    }

    pub(crate) fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.grid.iter_neighbors(coords)
    }

    pub(crate) fn coords_row_major(&self) -> impl Iterator<Item = Coord2> + use<> {
        let (rows, cols) = self.size();
        (0..rows).flat_map(move |row| (0..cols).map(move |col| (row, col)))
    }
}
