use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
}

impl GameStatus {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Events raised for the presentation layer, drained with
/// [`GameSession::take_events`] after each call.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    CellRevealed(Coord2),
    GameWon,
    GameLost,
    HintUnavailable,
}

/// Answer to a hint request. `NoSafeMoveFound` is a valid terminal answer,
/// not an error: the remaining board requires a guess.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HintResult {
    Suggested(Coord2),
    NoSafeMoveFound,
}

/// Coordinates one play/restart lifecycle over an owned [`Board`].
#[derive(Clone, Debug)]
pub struct GameSession {
    config: GameConfig,
    board: Board,
    status: GameStatus,
    active_hint: Option<Coord2>,
    events: Vec<GameEvent>,
    seed: u64,
    started_at: Instant,
    ended_at: Option<Instant>,
}

impl GameSession {
    /// Starts a fresh session with an OS-random generation seed.
    pub fn start(rows: Coord, cols: Coord, mines: CellCount) -> Result<Self> {
        Self::start_with_seed(rows, cols, mines, rand::random())
    }

    /// Starts a fresh session from an explicit seed, for deterministic replay.
    pub fn start_with_seed(rows: Coord, cols: Coord, mines: CellCount, seed: u64) -> Result<Self> {
        let config = GameConfig::new(rows, cols, mines);
        let board = RandomBoardGenerator::new(seed).generate(config)?;
        Ok(Self::from_parts(config, board, seed))
    }

    /// Builds a session around a prepared board, e.g. one from
    /// [`Board::from_mine_coords`].
    pub fn from_board(board: Board) -> Self {
        let config = GameConfig::new(board.rows(), board.cols(), board.mine_count());
        Self::from_parts(config, board, 0)
    }

    fn from_parts(config: GameConfig, board: Board, seed: u64) -> Self {
        Self {
            config,
            board,
            status: GameStatus::InProgress,
            active_hint: None,
            events: Vec::new(),
            seed,
            started_at: Instant::now(),
            ended_at: None,
        }
    }

    /// Discards the board and returns to a fresh `InProgress` state with all
    /// deduction and hint state cleared. Valid from any status.
    pub fn restart(&mut self, rows: Coord, cols: Coord, mines: CellCount) -> Result<()> {
        *self = Self::start(rows, cols, mines)?;
        Ok(())
    }

    pub fn restart_with_seed(
        &mut self,
        rows: Coord,
        cols: Coord,
        mines: CellCount,
        seed: u64,
    ) -> Result<()> {
        *self = Self::start_with_seed(rows, cols, mines, seed)?;
        Ok(())
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn rows(&self) -> Coord {
        self.board.rows()
    }

    pub fn cols(&self) -> Coord {
        self.board.cols()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn mines_left(&self) -> isize {
        self.board.mines_left()
    }

    pub fn active_hint(&self) -> Option<Coord2> {
        self.active_hint
    }

    /// Seconds since the session started, frozen once the game ends.
    pub fn elapsed_secs(&self) -> u64 {
        self.ended_at
            .unwrap_or_else(Instant::now)
            .duration_since(self.started_at)
            .as_secs()
    }

    /// Read-only cell snapshot for the presentation layer; allowed in any
    /// session state.
    pub fn cell_view(&self, coords: Coord2) -> Result<CellView> {
        let coords = self.board.validate_coords(coords)?;
        Ok(self.board.cell_view(coords))
    }

    /// Drains the events accumulated since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        core::mem::take(&mut self.events)
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        self.check_in_progress()?;

        let report = reveal(&mut self.board, coords)?;

        if let Some(hint) = self.active_hint {
            if self.board.cell_view(hint).state == CellState::Revealed {
                self.active_hint = None;
            }
        }

        self.events
            .extend(report.revealed.iter().map(|&pos| GameEvent::CellRevealed(pos)));

        match report.outcome {
            RevealOutcome::HitMine => {
                self.finish(GameStatus::Lost);
                self.events.push(GameEvent::GameLost);
            }
            RevealOutcome::Won => {
                self.finish(GameStatus::Won);
                self.events.push(GameEvent::GameWon);
            }
            RevealOutcome::Revealed | RevealOutcome::NoChange => {}
        }

        Ok(report.outcome)
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<FlagToggle> {
        self.check_in_progress()?;
        toggle_flag(&mut self.board, coords)
    }

    /// Suggests the next provably safe move.
    ///
    /// Runs constraint propagation to a fixed point, clears the previous hint
    /// marker, then scans row-major for the first safe hidden cell. Marking a
    /// hint is a pure annotation; revealing it stays a separate player action.
    pub fn hint(&mut self) -> Result<HintResult> {
        self.check_in_progress()?;

        propagate_to_fixpoint(&mut self.board);

        if let Some(prev) = self.active_hint.take() {
            if self.board.cell_view(prev).state != CellState::Revealed {
                self.board.cell_mut(prev).hint_marked = false;
            }
        }

        for coords in self.board.coords_row_major() {
            let cell = self.board.cell(coords);
            if cell.deduction == Deduction::Safe
                && cell.state == CellState::Hidden
                && !cell.hint_marked
            {
                self.board.cell_mut(coords).hint_marked = true;
                self.active_hint = Some(coords);
                return Ok(HintResult::Suggested(coords));
            }
        }

        self.events.push(GameEvent::HintUnavailable);
        Ok(HintResult::NoSafeMoveFound)
    }

    fn finish(&mut self, status: GameStatus) {
        self.status = status;
        self.ended_at = Some(Instant::now());
        self.active_hint = None;
        log::debug!("session finished: {status:?}");
    }

    fn check_in_progress(&self) -> Result<()> {
        if self.status.is_finished() {
            Err(GameError::InvalidOperation)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(rows: Coord, cols: Coord, mines: &[Coord2]) -> GameSession {
        GameSession::from_board(Board::from_mine_coords(rows, cols, mines).unwrap())
    }

    #[test]
    fn corner_mine_scenario_cascades_to_a_win() {
        let mut session = session(3, 3, &[(0, 0)]);

        let outcome = session.reveal((2, 2)).unwrap();

        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(session.status(), GameStatus::Won);
        assert_eq!(session.cell_view((0, 1)).unwrap().content, Some(CellContent::AdjacentCount(1)));
        assert_eq!(session.cell_view((1, 0)).unwrap().content, Some(CellContent::AdjacentCount(1)));
        assert_eq!(session.cell_view((1, 1)).unwrap().content, Some(CellContent::AdjacentCount(1)));

        let events = session.take_events();
        let revealed: Vec<_> = events
            .iter()
            .filter(|event| matches!(event, GameEvent::CellRevealed(_)))
            .collect();
        // eight safe cells plus the mine opened by the win
        assert_eq!(revealed.len(), 9);
        assert_eq!(events.last(), Some(&GameEvent::GameWon));
    }

    #[test]
    fn win_is_reported_exactly_once() {
        let mut session = session(1, 2, &[(0, 0)]);

        assert_eq!(session.reveal((0, 1)).unwrap(), RevealOutcome::Won);
        assert_eq!(session.reveal((0, 1)), Err(GameError::InvalidOperation));
        assert_eq!(
            session
                .take_events()
                .iter()
                .filter(|&&event| event == GameEvent::GameWon)
                .count(),
            1
        );
    }

    #[test]
    fn losing_reveal_reports_game_lost_and_locks_the_session() {
        let mut session = session(2, 2, &[(0, 0)]);

        assert_eq!(session.reveal((0, 0)).unwrap(), RevealOutcome::HitMine);
        assert_eq!(session.status(), GameStatus::Lost);
        assert_eq!(session.take_events().last(), Some(&GameEvent::GameLost));

        assert_eq!(session.reveal((1, 1)), Err(GameError::InvalidOperation));
        assert_eq!(session.toggle_flag((1, 1)), Err(GameError::InvalidOperation));
        assert_eq!(session.hint(), Err(GameError::InvalidOperation));
        assert_eq!(session.cell_view((1, 1)).unwrap().state, CellState::Hidden);
    }

    #[test]
    fn hint_marks_the_first_safe_cell_in_row_major_order() {
        // Center mine with the border revealed except one corner; the corner
        // is provably safe.
        let mut session = session(3, 3, &[(1, 1)]);
        for coords in [(0, 0), (0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1)] {
            session.reveal(coords).unwrap();
        }

        let result = session.hint().unwrap();

        assert_eq!(result, HintResult::Suggested((2, 2)));
        assert_eq!(session.active_hint(), Some((2, 2)));
        let view = session.cell_view((2, 2)).unwrap();
        assert!(view.hint_marked);
        assert_eq!(view.state, CellState::Hidden, "hint must not reveal");
    }

    #[test]
    fn revealing_the_hinted_cell_clears_the_active_hint() {
        let mut session = session(3, 3, &[(1, 1)]);
        for coords in [(0, 0), (0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1)] {
            session.reveal(coords).unwrap();
        }
        session.hint().unwrap();

        assert_eq!(session.reveal((2, 2)).unwrap(), RevealOutcome::Won);
        assert_eq!(session.active_hint(), None);
    }

    #[test]
    fn hint_without_safe_cells_reports_no_safe_move_and_marks_nothing() {
        // The clue pins the mine, but no hidden cell is provably safe.
        let mut session = session(1, 3, &[(0, 1)]);
        session.reveal((0, 0)).unwrap();

        let result = session.hint().unwrap();

        assert_eq!(result, HintResult::NoSafeMoveFound);
        assert_eq!(session.active_hint(), None);
        assert_eq!(session.take_events().last(), Some(&GameEvent::HintUnavailable));
        for col in 0..3 {
            assert!(!session.cell_view((0, col)).unwrap().hint_marked);
        }
    }

    #[test]
    fn repeated_hint_keeps_a_single_marker() {
        let mut session = session(3, 3, &[(1, 1)]);
        for coords in [(0, 0), (0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1)] {
            session.reveal(coords).unwrap();
        }

        assert_eq!(session.hint().unwrap(), HintResult::Suggested((2, 2)));
        // the old marker is cleared before rescanning, so the lone safe cell
        // is simply suggested again
        assert_eq!(session.hint().unwrap(), HintResult::Suggested((2, 2)));

        let marked = (0..3)
            .flat_map(|row| (0..3).map(move |col| (row, col)))
            .filter(|&coords| session.cell_view(coords).unwrap().hint_marked)
            .count();
        assert_eq!(marked, 1);
        assert_eq!(session.active_hint(), Some((2, 2)));
    }

    #[test]
    fn restart_replaces_the_board_and_clears_state() {
        let mut session = GameSession::start_with_seed(4, 4, 3, 11).unwrap();
        session.reveal((0, 0)).ok();

        session.restart_with_seed(5, 6, 4, 12).unwrap();

        assert_eq!(session.status(), GameStatus::InProgress);
        assert_eq!((session.rows(), session.cols()), (5, 6));
        assert_eq!(session.mines_left(), 4);
        assert_eq!(session.active_hint(), None);
        assert!(session.take_events().is_empty());
        for row in 0..5 {
            for col in 0..6 {
                let view = session.cell_view((row, col)).unwrap();
                assert_eq!(view.state, CellState::Hidden);
                assert_eq!(view.content, None);
            }
        }
    }

    #[test]
    fn restart_is_allowed_after_a_loss() {
        let mut session = session(2, 2, &[(0, 0)]);
        session.reveal((0, 0)).unwrap();
        assert_eq!(session.status(), GameStatus::Lost);

        session.restart_with_seed(2, 2, 1, 5).unwrap();
        assert_eq!(session.status(), GameStatus::InProgress);
    }

    #[test]
    fn failed_restart_leaves_the_session_untouched() {
        let mut session = session(2, 2, &[(0, 0)]);
        session.toggle_flag((0, 0)).unwrap();

        assert!(session.restart(0, 3, 1).is_err());

        assert_eq!(session.status(), GameStatus::InProgress);
        assert_eq!(session.cell_view((0, 0)).unwrap().state, CellState::Flagged);
    }

    #[test]
    fn invalid_configuration_is_rejected_at_start() {
        assert_eq!(
            GameSession::start_with_seed(3, 3, 9, 0).err(),
            Some(GameError::InvalidConfiguration {
                rows: 3,
                cols: 3,
                mines: 9
            })
        );
        assert!(GameSession::start_with_seed(0, 3, 0, 0).is_err());
    }

    #[test]
    fn view_types_serialize_for_the_presentation_layer() {
        let mut session = session(2, 2, &[(0, 0)]);
        session.reveal((1, 1)).unwrap();

        let view = session.cell_view((1, 1)).unwrap();
        let json = serde_json::to_string(&view).unwrap();
        let round_tripped: CellView = serde_json::from_str(&json).unwrap();
        assert_eq!(round_tripped, view);

        let events = session.take_events();
        assert!(serde_json::to_string(&events).is_ok());
    }
}
