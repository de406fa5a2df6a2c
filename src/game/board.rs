use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{GameError, Result};

/// Identifies the ruleset that produced a board. Incoming requests carry the
/// tag so they can be routed back to the same ruleset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EngineKind {
    Dummy,
    Case,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Dummy => "DUMMY",
            EngineKind::Case => "CASE",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "DUMMY" => Ok(EngineKind::Dummy),
            "CASE" => Ok(EngineKind::Case),
            other => Err(GameError::InvalidEngine(other.to_string())),
        }
    }
}

impl TryFrom<String> for EngineKind {
    type Error = GameError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<EngineKind> for String {
    fn from(kind: EngineKind) -> Self {
        kind.as_str().to_string()
    }
}

/// One of the two players, serialized as "X" and "O" on the wire. Player 1
/// is "X" and moves on odd rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::X => f.write_str("X"),
            Player::O => f.write_str("O"),
        }
    }
}

/// A single placement event. Two records with equal attributes denote the
/// same mark; `round_index` alone is unique within a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mark {
    pub player_id: Player,
    pub round_index: u32,
}

impl Mark {
    pub fn new(player_id: Player, round_index: u32) -> Self {
        Mark {
            player_id,
            round_index,
        }
    }
}

/// A board cell: a superposition of quantum marks, or a single classical
/// mark. A cell holding a classical mark never accepts another mark.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub quantic_marks: Vec<Mark>,
    #[serde(default)]
    pub collapsed_mark: Option<Mark>,
}

/// The full game state. For a cell list [A..I] and board size 3 the layout is
///
///   A, B, C
///   D, E, F
///   G, H, I
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub cells: Vec<Cell>,
    pub board_size: usize,
    /// The two cells whose shared newest mark must be collapsed next. While
    /// set, only a collapse move is legal.
    #[serde(rename = "cells_indexes_to_be_collapsed")]
    pub pending_collapse: Option<(usize, usize)>,
    pub engine: EngineKind,
}

impl Board {
    pub fn empty(board_size: usize, engine: EngineKind) -> Self {
        Board {
            cells: vec![Cell::default(); board_size * board_size],
            board_size,
            pending_collapse: None,
            engine,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.board_size * self.board_size
    }

    /// Highest round index on the board, over quantum and classical marks.
    fn max_round(&self) -> u32 {
        self.cells
            .iter()
            .flat_map(|cell| cell.quantic_marks.iter().chain(cell.collapsed_mark.iter()))
            .map(|mark| mark.round_index)
            .max()
            .unwrap_or(0)
    }

    /// Round number of the next mark to be placed. Always recomputed from
    /// the marks on the board; no counter is persisted.
    pub fn next_round(&self) -> u32 {
        self.max_round() + 1
    }

    /// Player whose turn it is, derived from the parity of the next round.
    pub fn active_player(&self) -> Player {
        if self.next_round() % 2 == 1 {
            Player::X
        } else {
            Player::O
        }
    }

    /// Checks an inbound board against the structural invariants: cell count,
    /// classical cells holding no quantum marks, every quantum mark living in
    /// exactly two distinct cells, contiguous round indexes, and a well
    /// formed pending collapse pair.
    pub fn validate(&self) -> Result<()> {
        if self.board_size == 0 {
            return Err(GameError::InvalidBoard("board_size must be positive".into()));
        }
        let expected = self.board_size.saturating_mul(self.board_size);
        if self.cells.len() != expected {
            return Err(GameError::InvalidBoard(format!(
                "expected {} cells for board size {}, got {}",
                expected,
                self.board_size,
                self.cells.len()
            )));
        }

        let mut rounds: Vec<u32> = Vec::new();
        let mut placements: HashMap<u32, (Player, Vec<usize>)> = HashMap::new();
        for (index, cell) in self.cells.iter().enumerate() {
            if cell.collapsed_mark.is_some() && !cell.quantic_marks.is_empty() {
                return Err(GameError::InvalidBoard(format!(
                    "cell {index} holds quantum marks next to a classical mark"
                )));
            }
            if let Some(mark) = cell.collapsed_mark {
                rounds.push(mark.round_index);
            }
            for mark in &cell.quantic_marks {
                let entry = placements
                    .entry(mark.round_index)
                    .or_insert((mark.player_id, Vec::new()));
                if entry.0 != mark.player_id {
                    return Err(GameError::InvalidBoard(format!(
                        "round {} is claimed by both players",
                        mark.round_index
                    )));
                }
                entry.1.push(index);
            }
        }

        for (round, (_, cells)) in &placements {
            if cells.len() != 2 || cells[0] == cells[1] {
                return Err(GameError::InvalidBoard(format!(
                    "quantum mark of round {round} must live in exactly two distinct cells"
                )));
            }
            rounds.push(*round);
        }

        rounds.sort_unstable();
        for (position, round) in rounds.iter().enumerate() {
            if *round != position as u32 + 1 {
                return Err(GameError::InvalidBoard(
                    "round indexes must form a contiguous sequence starting at 1".into(),
                ));
            }
        }

        if let Some((first, second)) = self.pending_collapse {
            if first == second || first >= self.cells.len() || second >= self.cells.len() {
                return Err(GameError::InvalidBoard(format!(
                    "pending collapse pair ({first}, {second}) is out of range"
                )));
            }
            let shared = self.cells[first]
                .quantic_marks
                .iter()
                .any(|mark| self.cells[second].quantic_marks.contains(mark));
            if !shared {
                return Err(GameError::InvalidBoard(format!(
                    "pending collapse cells {first} and {second} share no quantum mark"
                )));
            }
        }

        Ok(())
    }
}
