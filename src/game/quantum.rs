use std::collections::{HashMap, HashSet};

use crate::errors::{GameError, Result};
use crate::game::board::{Board, Mark};

/// The entanglement multigraph of a board: cells are vertices and quantum
/// marks are edges joining the two cells they are superposed in. Classical
/// marks contribute nothing. Adjacency lists keep the insertion order of
/// `quantic_marks`, which makes traversal deterministic.
#[derive(Debug)]
pub struct EntanglementGraph {
    edges: HashMap<u32, Edge>,
    adjacency: Vec<Vec<u32>>,
}

#[derive(Debug)]
struct Edge {
    mark: Mark,
    cells: (usize, usize),
}

impl EntanglementGraph {
    /// Builds the graph, checking that every quantum mark spans exactly two
    /// distinct cells.
    pub fn from_board(board: &Board) -> Result<Self> {
        let mut partial: HashMap<u32, (Mark, Vec<usize>)> = HashMap::new();
        let mut adjacency = vec![Vec::new(); board.cells.len()];

        for (index, cell) in board.cells.iter().enumerate() {
            for mark in &cell.quantic_marks {
                adjacency[index].push(mark.round_index);
                partial
                    .entry(mark.round_index)
                    .or_insert((*mark, Vec::new()))
                    .1
                    .push(index);
            }
        }

        let mut edges = HashMap::with_capacity(partial.len());
        for (id, (mark, cells)) in partial {
            match cells.as_slice() {
                [first, second] if first != second => {
                    edges.insert(
                        id,
                        Edge {
                            mark,
                            cells: (*first, *second),
                        },
                    );
                }
                _ => {
                    return Err(GameError::InvalidBoard(format!(
                        "quantum mark of round {id} must live in exactly two distinct cells"
                    )))
                }
            }
        }

        Ok(EntanglementGraph { edges, adjacency })
    }

    pub fn mark(&self, id: u32) -> Option<Mark> {
        self.edges.get(&id).map(|edge| edge.mark)
    }

    /// The unique cell other than `cell` holding an instance of the mark.
    pub fn other_endpoint(&self, id: u32, cell: usize) -> Option<usize> {
        let (first, second) = self.edges.get(&id)?.cells;
        if cell == first {
            Some(second)
        } else if cell == second {
            Some(first)
        } else {
            None
        }
    }

    /// Depth-first search for a path of marks from `start` to `goal` that
    /// never traverses `excluded` and never revisits a cell. Together with
    /// `excluded`, which joins `goal` back to `start`, the returned edge
    /// sequence forms a simple cycle in the multigraph. Tracking cells
    /// rather than edges keeps walks that thread a cell twice (possible
    /// with parallel marks) out of the result.
    pub fn find_cycle_path(&self, start: usize, goal: usize, excluded: u32) -> Option<Vec<u32>> {
        let mut path = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(start);
        if self.dfs(start, goal, excluded, &mut path, &mut visited) {
            Some(path)
        } else {
            None
        }
    }

    fn dfs(
        &self,
        current: usize,
        goal: usize,
        excluded: u32,
        path: &mut Vec<u32>,
        visited: &mut HashSet<usize>,
    ) -> bool {
        for &id in &self.adjacency[current] {
            if id == excluded {
                continue;
            }
            let next = match self.other_endpoint(id, current) {
                Some(next) => next,
                None => continue,
            };
            if next == goal {
                path.push(id);
                return true;
            }
            if visited.contains(&next) {
                continue;
            }
            path.push(id);
            visited.insert(next);
            if self.dfs(next, goal, excluded, path, visited) {
                return true;
            }
            path.pop();
            visited.remove(&next);
        }
        false
    }
}

/// Executes the collapse cascade for `selected`, one of the two pending
/// cells. The newest mark shared by the pending pair becomes classical in
/// the selected cell, and the forced resolution propagates along the
/// detected cycle. Any mark left with a single live instance afterwards is
/// collapsed in place, repeatedly, until every surviving quantum mark again
/// spans two cells. A submitted board whose entanglement cannot be resolved
/// into one classical mark per cell is rejected as invalid.
pub fn collapse_cascade(board: &mut Board, selected: usize) -> Result<()> {
    let (first, second) = match board.pending_collapse {
        Some(pair) => pair,
        None => return Err(GameError::InvalidMove("No collapse is pending.".into())),
    };
    let other = if selected == first { second } else { first };

    let initiating = board.cells[first]
        .quantic_marks
        .iter()
        .filter(|mark| board.cells[second].quantic_marks.contains(mark))
        .max_by_key(|mark| mark.round_index)
        .copied();
    let initiating = match initiating {
        Some(mark) => mark,
        None => {
            return Err(GameError::InvalidMove(
                "Could not identify the initiating mark for collapse.".into(),
            ))
        }
    };

    // The cycle is recomputed from the intact board before any mutation.
    let graph = EntanglementGraph::from_board(board)?;
    let path = match graph.find_cycle_path(selected, other, initiating.round_index) {
        Some(path) => path,
        None => {
            return Err(GameError::InvalidMove(
                "Cycle path for collapse not found.".into(),
            ))
        }
    };

    board.cells[selected].collapsed_mark = Some(initiating);
    board.cells[selected].quantic_marks.clear();
    board.cells[other]
        .quantic_marks
        .retain(|mark| mark.round_index != initiating.round_index);

    // Walk the cycle. Each mark was co-located with the previously fixed
    // mark in `fixed_cell`, so its other endpoint is forced classical.
    let mut fixed_cell = selected;
    for id in path {
        let mark = match graph.mark(id) {
            Some(mark) => mark,
            None => {
                return Err(GameError::Unexpected(format!(
                    "mark {id} vanished from the entanglement graph"
                )))
            }
        };
        let next_cell = match graph.other_endpoint(id, fixed_cell) {
            Some(cell) => cell,
            None => {
                return Err(GameError::Unexpected(format!(
                    "mark {id} is not incident to cell {fixed_cell}"
                )))
            }
        };
        // The cycle path is simple, so no cell can already be classical
        // here; bail out instead of overwriting a mark if it ever is.
        if board.cells[next_cell].collapsed_mark.is_some() {
            return Err(GameError::Unexpected(format!(
                "collapse cascade revisited cell {next_cell}"
            )));
        }
        board.cells[next_cell].collapsed_mark = Some(mark);
        board.cells[next_cell].quantic_marks.clear();
        board.cells[fixed_cell]
            .quantic_marks
            .retain(|mark| mark.round_index != id);
        fixed_cell = next_cell;
    }

    collapse_orphans(board);
    board.pending_collapse = None;

    // Legal play keeps the graph a forest between moves, so the cascade
    // always resolves cleanly. A directly submitted board can instead hold
    // overlapping cycles that strand two marks in one cell, and a cell has
    // room for a single classical mark. Reject such boards rather than
    // dropping a mark silently.
    if board.validate().is_err() {
        return Err(GameError::InvalidBoard(
            "the entanglement cannot be resolved into one classical mark per cell".into(),
        ));
    }
    Ok(())
}

/// Collapses marks stranded with a single live instance after cells were
/// cleared. Clearing a cell can strand further marks, so the scan repeats
/// until none are left. Orphans are resolved lowest round first so the
/// outcome does not depend on cell order.
fn collapse_orphans(board: &mut Board) {
    loop {
        let mut instances: HashMap<u32, Vec<usize>> = HashMap::new();
        for (index, cell) in board.cells.iter().enumerate() {
            for mark in &cell.quantic_marks {
                instances.entry(mark.round_index).or_default().push(index);
            }
        }

        let orphan = instances
            .iter()
            .filter(|(_, cells)| cells.len() == 1)
            .min_by_key(|(id, _)| **id)
            .map(|(id, cells)| (*id, cells[0]));

        let (id, index) = match orphan {
            Some(found) => found,
            None => break,
        };
        let mark = board.cells[index]
            .quantic_marks
            .iter()
            .find(|mark| mark.round_index == id)
            .copied();
        if let Some(mark) = mark {
            board.cells[index].collapsed_mark = Some(mark);
            board.cells[index].quantic_marks.clear();
        }
    }
}
