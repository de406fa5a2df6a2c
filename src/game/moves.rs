use serde::{Deserialize, Serialize};

/// Places a pair of entangled marks across two distinct cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkMove {
    pub first_cell: usize,
    pub second_cell: usize,
}

/// Resolves a pending collapse by choosing the cell where the cycle-closing
/// mark becomes classical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapseMove {
    pub selected_cell: usize,
}

/// The two move variants a player can submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Mark(MarkMove),
    Collapse(CollapseMove),
}

impl From<MarkMove> for Move {
    fn from(mark_move: MarkMove) -> Self {
        Move::Mark(mark_move)
    }
}

impl From<CollapseMove> for Move {
    fn from(collapse_move: CollapseMove) -> Self {
        Move::Collapse(collapse_move)
    }
}
