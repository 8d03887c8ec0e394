use rand::prelude::*;

use crate::*;

pub trait BoardGenerator {
    fn generate(self, config: GameConfig) -> Result<Board>;
}

/// Places mines by seeded rejection sampling: draw a uniform `(row, col)`,
/// retry while the cell already holds a mine.
///
/// The config guarantees at least one free cell, so every draw has a nonzero
/// chance to land and the loop terminates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RandomBoardGenerator {
    seed: u64,
}

impl RandomBoardGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl BoardGenerator for RandomBoardGenerator {
    fn generate(self, config: GameConfig) -> Result<Board> {
        config.validate()?;

        let mut board = Board::empty(config);
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut placed: CellCount = 0;

        while placed < config.mines {
            let coords = (
                rng.random_range(0..config.rows),
                rng.random_range(0..config.cols),
            );
            if board.contains_mine(coords) {
                continue;
            }
            board.set_mine(coords);
            placed += 1;
        }

        board.compute_adjacency();
        log::debug!(
            "generated {}x{} board with {} mines (seed {})",
            config.rows,
            config.cols,
            board.mine_count(),
            self.seed
        );
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn places_exactly_the_requested_mine_count() {
        let board = RandomBoardGenerator::new(7)
            .generate(GameConfig::new(8, 8, 10))
            .unwrap();

        let counted = board
            .coords_row_major()
            .filter(|&coords| board.contains_mine(coords))
            .count() as CellCount;
        assert_eq!(counted, 10);
        assert_eq!(board.mine_count(), 10);
    }

    #[test]
    fn same_seed_reproduces_the_same_layout() {
        let config = GameConfig::new(9, 9, 12);
        let first = RandomBoardGenerator::new(42).generate(config).unwrap();
        let second = RandomBoardGenerator::new(42).generate(config).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn adjacency_is_consistent_on_a_seeded_layout() {
        let board = RandomBoardGenerator::new(3)
            .generate(GameConfig::new(6, 6, 8))
            .unwrap();

        for coords in board.coords_row_major() {
            if board.contains_mine(coords) {
                continue;
            }
            let expected = board.adjacent_mine_count(coords);
            assert_eq!(
                board.cell_view(coords).state,
                CellState::Hidden,
                "fresh boards start fully hidden"
            );
            assert_eq!(
                board.cell(coords).content,
                CellContent::AdjacentCount(expected)
            );
        }
    }

    #[test]
    fn rejects_mine_count_filling_the_board() {
        let err = RandomBoardGenerator::new(0).generate(GameConfig::new(3, 3, 9));
        assert_eq!(
            err,
            Err(GameError::InvalidConfiguration {
                rows: 3,
                cols: 3,
                mines: 9
            })
        );
    }

    #[test]
    fn rejects_empty_dimensions() {
        assert!(RandomBoardGenerator::new(0)
            .generate(GameConfig::new(0, 5, 1))
            .is_err());
        assert!(RandomBoardGenerator::new(0)
            .generate(GameConfig::new(5, 0, 1))
            .is_err());
    }

    #[test]
    fn zero_mines_yields_all_zero_counts() {
        let board = RandomBoardGenerator::new(1)
            .generate(GameConfig::new(2, 3, 0))
            .unwrap();

        assert_eq!(board.mine_count(), 0);
        for coords in board.coords_row_major() {
            assert_eq!(board.cell(coords).content, CellContent::AdjacentCount(0));
        }
    }
}
