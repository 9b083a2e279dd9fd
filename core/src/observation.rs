use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Snapshot of everything the player is allowed to see, for a renderer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub size: Coord2,
    pub mine_count: CellCount,
    pub state: GameState,
    pub flags_placed: CellCount,
    pub revealed_safe_count: CellCount,
    pub cells: Array2<CellView>,
}

impl Observation {
    pub fn from_board(board: &Board) -> Self {
        let game_over = board.is_game_over();
        Self {
            size: board.size(),
            mine_count: board.mine_count(),
            state: board.state(),
            flags_placed: board.flags_placed(),
            revealed_safe_count: board.revealed_safe_count(),
            cells: board.cells().mapv(|cell| cell.view(game_over)),
        }
    }

    pub fn mines_left(&self) -> i32 {
        i32::from(self.mine_count) - i32::from(self.flags_placed)
    }

    pub fn cell(&self, coords: Coord2) -> Option<CellView> {
        self.cells.get(coords.to_nd_index()).copied()
    }
}

impl From<&Board> for Observation {
    fn from(board: &Board) -> Self {
        Self::from_board(board)
    }
}
