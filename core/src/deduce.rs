use crate::*;

/// One propagation pass over every revealed numeric clue.
///
/// For a revealed cell showing `n`, with `hidden` its unrevealed neighbors
/// (flags count as hidden) and `known_mines` the members of `hidden` already
/// classified as mines:
/// - exhausted-mines: `known_mines == n` marks the unclassified rest `Safe`;
/// - forced-mines: `known_mines + hidden.len() == n` marks the unclassified
///   rest `GuaranteedMine`.
///
/// Returns whether the pass classified anything. Classifications are
/// monotonic, so `propagate_to_fixpoint` terminates within one pass per cell.
pub fn propagate(board: &mut Board) -> bool {
    let mut changed = false;

    for coords in board.coords_row_major() {
        let cell = *board.cell(coords);
        if cell.state != CellState::Revealed {
            continue;
        }
        let CellContent::AdjacentCount(n) = cell.content else {
            continue;
        };
        if n == 0 {
            continue;
        }

        let mut hidden = Vec::new();
        let mut known_mines = 0usize;
        for pos in board.iter_neighbors(coords) {
            let neighbor = board.cell(pos);
            if neighbor.state.is_unrevealed() {
                if neighbor.deduction == Deduction::GuaranteedMine {
                    known_mines += 1;
                }
                hidden.push(pos);
            }
        }

        if known_mines == usize::from(n) {
            for &pos in &hidden {
                if classify(board, pos, Deduction::Safe) {
                    changed = true;
                }
            }
        }

        if known_mines + hidden.len() == usize::from(n) {
            for &pos in &hidden {
                if classify(board, pos, Deduction::GuaranteedMine) {
                    changed = true;
                }
            }
        }
    }

    changed
}

/// Runs `propagate` until a pass makes no further classification.
pub fn propagate_to_fixpoint(board: &mut Board) {
    while propagate(board) {}
}

/// Assigns a deduction only to still-unclassified cells, keeping `Safe` and
/// `GuaranteedMine` mutually exclusive.
fn classify(board: &mut Board, coords: Coord2, deduction: Deduction) -> bool {
    let cell = board.cell_mut(coords);
    if cell.deduction == Deduction::Unknown {
        cell.deduction = deduction;
        log::trace!("classified {coords:?} as {deduction:?}");
        true
    } else {
        false
    }
}
