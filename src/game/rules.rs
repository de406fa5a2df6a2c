use crate::errors::{GameError, Result};
use crate::game::board::{Board, EngineKind, Mark, Player};
use crate::game::engine::Engine;
use crate::game::moves::{CollapseMove, MarkMove, Move};
use crate::game::quantum::{collapse_cascade, EntanglementGraph};

/// The real Quantum Tic-Tac-Toe ruleset: paired mark placement, cycle
/// detection over the entanglement graph, collapse cascades, and the
/// classical three-in-a-row winner test.
pub struct CaseEngine {
    board_size: usize,
}

impl CaseEngine {
    pub fn new(board_size: usize) -> Self {
        CaseEngine { board_size }
    }

    fn place_mark(&self, mark_move: &MarkMove, board: &mut Board) -> Result<()> {
        let mark = Mark::new(board.active_player(), board.next_round());
        board.cells[mark_move.first_cell].quantic_marks.push(mark);
        board.cells[mark_move.second_cell].quantic_marks.push(mark);
        board.pending_collapse = None;

        // The new mark joins first_cell and second_cell. If the rest of the
        // graph already connects them, the mark has closed a cycle and the
        // pair must be collapsed before play continues.
        let graph = EntanglementGraph::from_board(board)?;
        if graph
            .find_cycle_path(mark_move.second_cell, mark_move.first_cell, mark.round_index)
            .is_some()
        {
            board.pending_collapse = Some((mark_move.first_cell, mark_move.second_cell));
        }
        Ok(())
    }

    fn validate_mark_move(&self, mark_move: &MarkMove, board: &Board) -> Result<()> {
        if board.pending_collapse.is_some() {
            return Err(GameError::InvalidMove(
                "Cannot make a mark move while a collapse is pending.".into(),
            ));
        }
        let cells = board.cells.len();
        if mark_move.first_cell >= cells || mark_move.second_cell >= cells {
            return Err(GameError::InvalidMove("Cell index out of bounds.".into()));
        }
        if mark_move.first_cell == mark_move.second_cell {
            return Err(GameError::InvalidMove(
                "A mark move requires two different cells.".into(),
            ));
        }
        if board.cells[mark_move.first_cell].collapsed_mark.is_some()
            || board.cells[mark_move.second_cell].collapsed_mark.is_some()
        {
            return Err(GameError::InvalidMove(
                "Cannot place a mark in a collapsed cell.".into(),
            ));
        }
        Ok(())
    }

    fn validate_collapse_move(&self, collapse_move: &CollapseMove, board: &Board) -> Result<()> {
        let (first, second) = match board.pending_collapse {
            Some(pair) => pair,
            None => return Err(GameError::InvalidMove("No collapse is pending.".into())),
        };
        if collapse_move.selected_cell != first && collapse_move.selected_cell != second {
            return Err(GameError::InvalidMove(
                "Selected cell is not one of the pending collapse cells.".into(),
            ));
        }
        Ok(())
    }
}

impl Engine for CaseEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Case
    }

    fn board_size(&self) -> usize {
        self.board_size
    }

    fn validate_move(&self, mv: &Move, board: &Board) -> Result<()> {
        match mv {
            Move::Mark(mark_move) => self.validate_mark_move(mark_move, board),
            Move::Collapse(collapse_move) => self.validate_collapse_move(collapse_move, board),
        }
    }

    fn apply_move(&self, mv: &Move, board: &mut Board) -> Result<()> {
        match mv {
            Move::Mark(mark_move) => self.place_mark(mark_move, board),
            Move::Collapse(collapse_move) => {
                collapse_cascade(board, collapse_move.selected_cell)
            }
        }
    }

    /// Scans rows, then columns, then the two diagonals for a line of
    /// classical marks owned by one player. The first matching line wins.
    fn winner(&self, board: &Board) -> Option<Player> {
        let size = board.board_size;
        for row in 0..size {
            if let Some(player) = line_winner(board, (0..size).map(|col| row * size + col)) {
                return Some(player);
            }
        }
        for col in 0..size {
            if let Some(player) = line_winner(board, (0..size).map(|row| row * size + col)) {
                return Some(player);
            }
        }
        if let Some(player) = line_winner(board, (0..size).map(|i| i * size + i)) {
            return Some(player);
        }
        line_winner(board, (0..size).map(|i| i * size + (size - 1 - i)))
    }
}

fn line_winner<I>(board: &Board, mut cells: I) -> Option<Player>
where
    I: Iterator<Item = usize>,
{
    let first = board.cells[cells.next()?].collapsed_mark?.player_id;
    for index in cells {
        if board.cells[index].collapsed_mark.map(|mark| mark.player_id) != Some(first) {
            return None;
        }
    }
    Some(first)
}
