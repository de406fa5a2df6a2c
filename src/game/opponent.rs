use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::errors::{GameError, Result};
use crate::game::board::Board;
use crate::game::moves::{CollapseMove, MarkMove, Move};

/// The built-in opponent. All randomness in a game flows through this seam,
/// so tests can script or seed it.
#[cfg_attr(test, mockall::automock)]
pub trait Opponent {
    /// Coin flip at game start: true when the opponent plays the first mark.
    fn opens_game(&mut self) -> bool;

    /// Produces a legal move for the given board: a collapse choice while a
    /// collapse is pending, a mark pair otherwise.
    fn choose_move(&mut self, board: &Board) -> Result<Move>;
}

/// Opponent picking uniformly at random among the legal options.
pub struct RandomOpponent<R = StdRng> {
    rng: R,
}

impl RandomOpponent<StdRng> {
    pub fn from_entropy() -> Self {
        RandomOpponent {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        RandomOpponent {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> Opponent for RandomOpponent<R> {
    fn opens_game(&mut self) -> bool {
        self.rng.gen()
    }

    fn choose_move(&mut self, board: &Board) -> Result<Move> {
        if let Some((first, second)) = board.pending_collapse {
            let selected_cell = if self.rng.gen() { first } else { second };
            return Ok(Move::Collapse(CollapseMove { selected_cell }));
        }

        let open: Vec<usize> = board
            .cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.collapsed_mark.is_none())
            .map(|(index, _)| index)
            .collect();
        if open.len() < 2 {
            return Err(GameError::Unexpected(
                "fewer than two uncollapsed cells left for a mark move".into(),
            ));
        }

        let picked: Vec<usize> = open.choose_multiple(&mut self.rng, 2).copied().collect();
        Ok(Move::Mark(MarkMove {
            first_cell: picked[0],
            second_cell: picked[1],
        }))
    }
}
