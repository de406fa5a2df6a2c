//! End-to-end scenarios and invariant properties for the quantum ruleset.

use std::collections::{HashMap, VecDeque};

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use quantum_tictactoe::game::board::{Board, EngineKind, Mark, Player};
use quantum_tictactoe::game::engine::Engine;
use quantum_tictactoe::game::moves::{CollapseMove, MarkMove, Move};
use quantum_tictactoe::game::opponent::Opponent;
use quantum_tictactoe::game::rules::CaseEngine;
use quantum_tictactoe::GameError;

/// Opponent that plays back a fixed list of replies, for tests that need
/// the other side of the table to be predictable.
struct ScriptedOpponent {
    replies: VecDeque<Move>,
}

impl ScriptedOpponent {
    fn new(replies: impl IntoIterator<Item = Move>) -> Self {
        ScriptedOpponent {
            replies: replies.into_iter().collect(),
        }
    }
}

impl Opponent for ScriptedOpponent {
    fn opens_game(&mut self) -> bool {
        false
    }

    fn choose_move(&mut self, _board: &Board) -> Result<Move, GameError> {
        self.replies
            .pop_front()
            .ok_or_else(|| GameError::Unexpected("opponent script exhausted".into()))
    }
}

fn mark_move(first_cell: usize, second_cell: usize) -> Move {
    Move::Mark(MarkMove {
        first_cell,
        second_cell,
    })
}

fn collapse_move(selected_cell: usize) -> Move {
    Move::Collapse(CollapseMove { selected_cell })
}

fn triangle_board() -> Board {
    let engine = CaseEngine::new(3);
    let mut board = Board::empty(3, EngineKind::Case);
    for (first, second) in [(0, 1), (1, 2), (2, 0)] {
        engine
            .apply_move(&mark_move(first, second), &mut board)
            .unwrap();
    }
    board
}

/// A board already won by "X" on the top row, with enough history to keep
/// round indexes contiguous and two cells still free for a move.
fn won_board() -> Board {
    let mut board = Board::empty(3, EngineKind::Case);
    for (round, index) in [(1, 0), (3, 1), (5, 2)] {
        board.cells[index].collapsed_mark = Some(Mark::new(Player::X, round));
    }
    for (round, cells) in [(2, (3, 4)), (4, (5, 6))] {
        let mark = Mark::new(Player::O, round);
        board.cells[cells.0].quantic_marks.push(mark);
        board.cells[cells.1].quantic_marks.push(mark);
    }
    board
}

#[test]
fn s1_the_first_mark_enters_both_cells() {
    let engine = CaseEngine::new(3);
    let mut board = Board::empty(3, EngineKind::Case);

    let mv = mark_move(0, 1);
    engine.validate_move(&mv, &board).unwrap();
    engine.apply_move(&mv, &mut board).unwrap();

    let placed = Mark::new(Player::X, 1);
    assert_eq!(board.cells[0].quantic_marks, vec![placed]);
    assert_eq!(board.cells[1].quantic_marks, vec![placed]);
    assert!(board.pending_collapse.is_none());
    assert_eq!(engine.winner(&board), None);
}

#[test]
fn s2_marking_a_collapsed_cell_is_invalid() {
    let engine = CaseEngine::new(3);
    let mut board = Board::empty(3, EngineKind::Case);
    board.cells[0].collapsed_mark = Some(Mark::new(Player::X, 1));

    assert!(matches!(
        engine.validate_move(&mark_move(0, 2), &board),
        Err(GameError::InvalidMove(_))
    ));
}

#[test]
fn s3_the_board_phase_decides_the_legal_move_kind() {
    let engine = CaseEngine::new(3);
    let board = triangle_board();
    assert_eq!(board.pending_collapse, Some((2, 0)));

    assert!(matches!(
        engine.validate_move(&mark_move(3, 4), &board),
        Err(GameError::InvalidMove(_))
    ));
    assert!(matches!(
        engine.validate_move(&collapse_move(4), &board),
        Err(GameError::InvalidMove(_))
    ));
}

#[test]
fn s4_closing_the_triangle_schedules_the_collapse() {
    let board = triangle_board();

    assert_eq!(board.pending_collapse, Some((2, 0)));
    for index in 0..3 {
        assert_eq!(board.cells[index].quantic_marks.len(), 2);
    }
}

#[test]
fn s5_collapsing_the_triangle_forces_every_mark() {
    let engine = CaseEngine::new(3);
    let mut board = triangle_board();

    engine.apply_move(&collapse_move(0), &mut board).unwrap();

    // The newest mark shared by cells 0 and 2 resolves into cell 0; the
    // rest of the cycle is forced.
    assert_eq!(board.cells[0].collapsed_mark, Some(Mark::new(Player::X, 3)));
    assert_eq!(board.cells[1].collapsed_mark, Some(Mark::new(Player::X, 1)));
    assert_eq!(board.cells[2].collapsed_mark, Some(Mark::new(Player::O, 2)));
    assert!(board.cells.iter().all(|cell| cell.quantic_marks.is_empty()));
    assert!(board.pending_collapse.is_none());
    board.validate().unwrap();
}

#[test]
fn s6_a_completed_row_surfaces_game_over() {
    let engine = CaseEngine::new(3);
    let mut opponent = ScriptedOpponent::new([]);

    let result = engine.play_move(&mark_move(7, 8), &won_board(), &mut opponent);

    match result {
        Err(GameError::GameOver { winner, board }) => {
            assert_eq!(winner, Player::X);
            assert_eq!(board.cells[7].quantic_marks.len(), 1);
        }
        other => panic!("expected GameOver, got {other:?}"),
    }
}

#[test]
fn play_move_leaves_the_prior_board_untouched() {
    let engine = CaseEngine::new(3);
    let previous = triangle_board();
    let snapshot = previous.clone();
    let mut opponent = ScriptedOpponent::new([mark_move(3, 4)]);

    engine
        .play_move(&collapse_move(0), &previous, &mut opponent)
        .unwrap();

    assert_eq!(previous, snapshot);
}

#[test]
fn a_full_turn_applies_the_opponent_reply() {
    let engine = CaseEngine::new(3);
    let previous = Board::empty(3, EngineKind::Case);
    let mut opponent = ScriptedOpponent::new([mark_move(4, 5)]);

    let board = engine
        .play_move(&mark_move(0, 1), &previous, &mut opponent)
        .unwrap();

    assert_eq!(board.cells[0].quantic_marks, vec![Mark::new(Player::X, 1)]);
    assert_eq!(board.cells[4].quantic_marks, vec![Mark::new(Player::O, 2)]);
    assert_eq!(board.next_round(), 3);
}

fn random_legal_move(board: &Board, rng: &mut StdRng) -> Option<Move> {
    if let Some((first, second)) = board.pending_collapse {
        let selected = if rng.gen() { first } else { second };
        return Some(collapse_move(selected));
    }
    let open: Vec<usize> = board
        .cells
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.collapsed_mark.is_none())
        .map(|(index, _)| index)
        .collect();
    if open.len() < 2 {
        return None;
    }
    let picked: Vec<usize> = open.choose_multiple(rng, 2).copied().collect();
    Some(mark_move(picked[0], picked[1]))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Random legal games keep every structural invariant: paired quantum
    /// marks, contiguous round indexes, a well formed pending pair, exactly
    /// one legal move kind per phase, and classical marks that never change.
    #[test]
    fn random_legal_games_keep_the_board_consistent(seed in any::<u64>(), steps in 1usize..60) {
        let engine = CaseEngine::new(3);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut board = Board::empty(3, EngineKind::Case);
        let mut frozen: HashMap<usize, Mark> = HashMap::new();

        for _ in 0..steps {
            // Exactly one move kind is legal in any phase.
            match board.pending_collapse {
                Some(_) => prop_assert!(engine.validate_move(&mark_move(0, 1), &board).is_err()),
                None => prop_assert!(engine.validate_move(&collapse_move(0), &board).is_err()),
            }

            let mv = match random_legal_move(&board, &mut rng) {
                Some(mv) => mv,
                None => break,
            };
            engine.validate_move(&mv, &board).unwrap();
            engine.apply_move(&mv, &mut board).unwrap();

            prop_assert!(board.validate().is_ok());

            for (index, mark) in &frozen {
                prop_assert_eq!(board.cells[*index].collapsed_mark, Some(*mark));
            }
            for (index, cell) in board.cells.iter().enumerate() {
                if let Some(mark) = cell.collapsed_mark {
                    frozen.entry(index).or_insert(mark);
                }
            }
        }
    }

    /// The winner test reads classical marks only, so shuffling superposed
    /// marks inside cells cannot change its verdict.
    #[test]
    fn the_winner_test_is_blind_to_quantum_mark_order(seed in any::<u64>()) {
        let engine = CaseEngine::new(3);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut board = Board::empty(3, EngineKind::Case);
        for _ in 0..6 {
            let mv = match random_legal_move(&board, &mut rng) {
                Some(mv) => mv,
                None => break,
            };
            engine.apply_move(&mv, &mut board).unwrap();
        }

        let before = engine.winner(&board);
        for cell in &mut board.cells {
            cell.quantic_marks.reverse();
        }
        prop_assert_eq!(engine.winner(&board), before);
    }
}
