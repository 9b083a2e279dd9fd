use serde::{Deserialize, Serialize};

/// Full state of a single board cell, mine included.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub(crate) is_mine: bool,
    pub(crate) is_revealed: bool,
    pub(crate) is_flagged: bool,
    pub(crate) adjacent_mines: u8,
}

impl Cell {
    pub const fn is_mine(self) -> bool {
        self.is_mine
    }

    pub const fn is_revealed(self) -> bool {
        self.is_revealed
    }

    pub const fn is_flagged(self) -> bool {
        self.is_flagged
    }

    /// Number of mines among the up-to-8 neighbors, always 0 for mines.
    pub const fn adjacent_mines(self) -> u8 {
        self.adjacent_mines
    }

    /// What the player may see of this cell. Mines stay hidden until they are
    /// revealed or the game ends.
    pub const fn view(self, game_over: bool) -> CellView {
        match (self.is_mine, self.is_revealed, self.is_flagged) {
            (true, _, true) if game_over => CellView::FlaggedMine,
            (true, true, _) => CellView::Mine,
            (true, false, false) if game_over => CellView::Mine,
            (false, true, _) => CellView::Revealed(self.adjacent_mines),
            (false, false, true) if game_over => CellView::WrongFlag,
            (_, false, true) => CellView::Flagged,
            (_, false, false) => CellView::Hidden,
        }
    }
}

/// Player-visible state of a cell, as handed to a renderer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    #[default]
    Hidden,
    Flagged,
    Revealed(u8),
    Mine,
    /// Correctly flagged mine on a finished board.
    FlaggedMine,
    /// Flag on a safe cell on a finished board.
    WrongFlag,
}

impl CellView {
    /// Whether the cell still looks closed to the player.
    pub const fn is_closed(self) -> bool {
        matches!(
            self,
            Self::Hidden | Self::Flagged | Self::FlaggedMine | Self::WrongFlag
        )
    }
}
