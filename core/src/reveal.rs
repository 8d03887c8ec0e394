use std::collections::VecDeque;

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::HitMine | Self::Won)
    }
}

/// What a single top-level reveal changed, in the order it changed it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevealReport {
    pub outcome: RevealOutcome,
    pub revealed: Vec<Coord2>,
}

/// Result of flipping a flag annotation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagToggle {
    Flagged,
    Unflagged,
}

/// Reveals a cell, cascading through zero-count regions.
///
/// Flags never block a reveal; a flagged cell simply loses its flag as it is
/// uncovered. The cascade runs on an explicit worklist with the `Revealed`
/// state as the visited guard, so it is bounded by the board size and never
/// re-enters a cell.
pub fn reveal(board: &mut Board, coords: Coord2) -> Result<RevealReport> {
    let coords = board.validate_coords(coords)?;

    if board.cell(coords).state == CellState::Revealed {
        return Ok(RevealReport {
            outcome: RevealOutcome::NoChange,
            revealed: Vec::new(),
        });
    }

    if board.contains_mine(coords) {
        let revealed = open_all_mines(board);
        return Ok(RevealReport {
            outcome: RevealOutcome::HitMine,
            revealed,
        });
    }

    let mut revealed = Vec::new();
    board.mark_revealed(coords);
    revealed.push(coords);

    if board.cell(coords).content == CellContent::AdjacentCount(0) {
        let mut to_visit: VecDeque<_> = board
            .iter_neighbors(coords)
            .filter(|&pos| board.cell(pos).state.is_unrevealed())
            .collect();

        while let Some(visit_coords) = to_visit.pop_front() {
            if !board.cell(visit_coords).state.is_unrevealed() {
                continue;
            }

            board.mark_revealed(visit_coords);
            revealed.push(visit_coords);
            log::trace!("cascade revealed {visit_coords:?}");

            if board.cell(visit_coords).content == CellContent::AdjacentCount(0) {
                to_visit.extend(
                    board
                        .iter_neighbors(visit_coords)
                        .filter(|&pos| board.cell(pos).state.is_unrevealed()),
                );
            }
        }
    }

    if board.is_cleared() {
        revealed.extend(open_all_mines(board));
        Ok(RevealReport {
            outcome: RevealOutcome::Won,
            revealed,
        })
    } else {
        Ok(RevealReport {
            outcome: RevealOutcome::Revealed,
            revealed,
        })
    }
}

/// Flips `Hidden <-> Flagged`; a revealed cell cannot carry a flag.
pub fn toggle_flag(board: &mut Board, coords: Coord2) -> Result<FlagToggle> {
    let coords = board.validate_coords(coords)?;

    match board.cell(coords).state {
        CellState::Hidden => {
            board.set_flagged(coords);
            Ok(FlagToggle::Flagged)
        }
        CellState::Flagged => {
            board.clear_flag(coords);
            Ok(FlagToggle::Unflagged)
        }
        CellState::Revealed => Err(GameError::InvalidOperation),
    }
}

/// Uncovers every mine with a direct state set, no cascade. Used when the
/// game ends, win or loss.
fn open_all_mines(board: &mut Board) -> Vec<Coord2> {
    let mut opened = Vec::new();
    for coords in board.coords_row_major() {
        if board.contains_mine(coords) && board.cell(coords).state != CellState::Revealed {
            board.mark_revealed(coords);
            opened.push(coords);
        }
    }
    opened
}
