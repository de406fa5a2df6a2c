use crate::errors::{GameError, Result};
use crate::game::board::{Board, EngineKind, Mark, Player};
use crate::game::moves::Move;
use crate::game::opponent::Opponent;

/// A ruleset. Implementations provide validation, board updates and the
/// winner test; game orchestration is shared by the provided methods.
///
/// Engines are stateless value objects; everything they need travels with
/// the board.
pub trait Engine {
    fn kind(&self) -> EngineKind;

    fn board_size(&self) -> usize;

    /// Checks a move against the current board, without applying it.
    fn validate_move(&self, mv: &Move, board: &Board) -> Result<()>;

    /// Applies a move in place. Callers validate first.
    fn apply_move(&self, mv: &Move, board: &mut Board) -> Result<()>;

    fn winner(&self, board: &Board) -> Option<Player>;

    /// Builds an empty board and flips a coin: on heads the opponent makes
    /// the first mark move before the board is handed out.
    fn start_game(&self, opponent: &mut dyn Opponent) -> Result<Board> {
        let mut board = Board::empty(self.board_size(), self.kind());
        if opponent.opens_game() {
            let mv = opponent.choose_move(&board)?;
            self.apply_move(&mv, &mut board)?;
        }
        Ok(board)
    }

    /// Plays one full turn: the player's move, then the opponent's reply,
    /// testing for a winner after each. The prior board is never touched;
    /// all updates happen on a deep copy. A finished game surfaces as the
    /// `GameOver` control event carrying the final board.
    fn play_move(
        &self,
        mv: &Move,
        previous_board: &Board,
        opponent: &mut dyn Opponent,
    ) -> Result<Board> {
        self.validate_move(mv, previous_board)?;

        let mut board = previous_board.clone();

        self.apply_move(mv, &mut board)?;
        if let Some(winner) = self.winner(&board) {
            return Err(GameError::GameOver { board, winner });
        }

        let reply = opponent.choose_move(&board)?;
        self.apply_move(&reply, &mut board)?;
        if let Some(winner) = self.winner(&board) {
            return Err(GameError::GameOver { board, winner });
        }

        Ok(board)
    }
}

/// Number of cells that must carry at least one mark for the demonstration
/// ruleset to declare its winner.
const STOP_AFTER_N_MARKS: usize = 7;

/// Demonstration ruleset that skips the quantum rules entirely: every move
/// is accepted, collapse moves are ignored, and player 1 wins once
/// `STOP_AFTER_N_MARKS` cells have been marked at least once. It exists to
/// exercise the transport without the real engine.
pub struct DummyEngine {
    board_size: usize,
}

impl DummyEngine {
    pub fn new(board_size: usize) -> Self {
        DummyEngine { board_size }
    }
}

impl Engine for DummyEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Dummy
    }

    fn board_size(&self) -> usize {
        self.board_size
    }

    fn validate_move(&self, _mv: &Move, _board: &Board) -> Result<()> {
        Ok(())
    }

    fn apply_move(&self, mv: &Move, board: &mut Board) -> Result<()> {
        if let Move::Mark(mark_move) = mv {
            let cells = board.cells.len();
            if mark_move.first_cell >= cells || mark_move.second_cell >= cells {
                return Err(GameError::Unexpected(format!(
                    "mark move ({}, {}) is out of range",
                    mark_move.first_cell, mark_move.second_cell
                )));
            }
            let mark = Mark::new(board.active_player(), board.next_round());
            board.cells[mark_move.first_cell].quantic_marks.push(mark);
            board.cells[mark_move.second_cell].quantic_marks.push(mark);
        }
        Ok(())
    }

    fn winner(&self, board: &Board) -> Option<Player> {
        let marked = board
            .cells
            .iter()
            .filter(|cell| !cell.quantic_marks.is_empty())
            .count();
        if marked >= STOP_AFTER_N_MARKS {
            Some(Player::X)
        } else {
            None
        }
    }
}
