use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::*;

/// Valid transitions:
/// - Ready -> Active (first reveal places the mines)
/// - Ready -> Won (first reveal opens every safe cell)
/// - Active -> Won / Lost
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    /// No mines placed yet
    #[default]
    Ready,
    Active,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// A single game of minesweeper.
///
/// The `apply_*` methods update the board in place and report what happened.
/// [`Board::reveal`] and [`Board::toggle_flag`] leave the board untouched and
/// return the next one instead. Coordinates are checked before anything
/// changes, so a rejected call never leaves a half-updated board behind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    config: GameConfig,
    seed: u64,
    cells: Array2<Cell>,
    flags_placed: CellCount,
    revealed_safe_count: CellCount,
    state: GameState,
    triggered_mine: Option<Coord2>,
}

impl Board {
    /// Empty board, mines are placed on the first reveal.
    pub fn new(config: GameConfig) -> Result<Self> {
        Self::with_seed(config, rand::random())
    }

    /// Like [`Board::new`], with a fixed seed for mine placement.
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self::fresh(config, seed))
    }

    /// Board with mines already in place, ready to play.
    pub fn from_layout(layout: &MineLayout) -> Result<Self> {
        let config = layout.game_config();
        config.validate()?;

        let mut board = Self::fresh(config, 0);
        board.place_mines(layout);
        Ok(board)
    }

    /// Fresh board for another round with the same dimensions and mine count.
    pub fn new_game(&self) -> Self {
        Self::fresh(self.config, rand::random())
    }

    fn fresh(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            cells: Array2::default(config.size.to_nd_index()),
            flags_placed: 0,
            revealed_safe_count: 0,
            state: GameState::Ready,
            triggered_mine: None,
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    /// `(rows, cols)`
    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn rows(&self) -> Coord {
        self.config.size.0
    }

    pub fn cols(&self) -> Coord {
        self.config.size.1
    }

    pub fn mine_count(&self) -> CellCount {
        self.config.mines
    }

    pub fn safe_cell_total(&self) -> CellCount {
        self.config.safe_cell_total()
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        !self.state.is_ready()
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_finished()
    }

    pub fn is_won(&self) -> bool {
        matches!(self.state, GameState::Won)
    }

    pub fn flags_placed(&self) -> CellCount {
        self.flags_placed
    }

    pub fn revealed_safe_count(&self) -> CellCount {
        self.revealed_safe_count
    }

    /// Mines minus flags, negative when the player over-flags.
    pub fn mines_left(&self) -> i32 {
        i32::from(self.config.mines) - i32::from(self.flags_placed)
    }

    /// The mine that ended a lost game.
    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    /// Full cell state, mine flag included. Renderers should prefer
    /// [`Board::cell_view`].
    pub fn cell_at(&self, coords: Coord2) -> Result<Cell> {
        let coords = self.validate_coords(coords)?;
        Ok(self.cells[coords.to_nd_index()])
    }

    pub fn cell_view(&self, coords: Coord2) -> Result<CellView> {
        Ok(self.cell_at(coords)?.view(self.is_game_over()))
    }

    pub fn cells(&self) -> &Array2<Cell> {
        &self.cells
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let (rows, cols) = self.size();
        if coords.0 < rows && coords.1 < cols {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    /// Returns the board after revealing `coords`.
    pub fn reveal(&self, coords: Coord2) -> Result<Self> {
        let mut next = self.clone();
        next.apply_reveal(coords)?;
        Ok(next)
    }

    /// Returns the board after toggling the flag at `coords`.
    pub fn toggle_flag(&self, coords: Coord2) -> Result<Self> {
        let mut next = self.clone();
        next.apply_toggle_flag(coords)?;
        Ok(next)
    }

    /// Reveals `coords`, placing the mines first if this is the opening move.
    ///
    /// Revealing on a finished game, a flagged cell or an open cell does
    /// nothing. The opening move still places the mines in that case, which is
    /// not reported as an update.
    pub fn apply_reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;

        if self.state.is_finished() {
            return Ok(RevealOutcome::NoChange);
        }

        if self.state.is_ready() {
            let layout = RandomMinefieldGenerator::new(self.seed, coords).generate(self.config)?;
            self.place_mines(&layout);
        }

        let cell = self.cells[coords.to_nd_index()];
        if cell.is_flagged || cell.is_revealed {
            return Ok(RevealOutcome::NoChange);
        }

        if cell.is_mine {
            self.triggered_mine = Some(coords);
            self.reveal_all_mines();
            self.state = GameState::Lost;
            log::debug!("Hit mine at {:?}, game lost", coords);
            return Ok(RevealOutcome::HitMine);
        }

        self.revealed_safe_count += self.flood_reveal(coords);

        Ok(if self.check_win() {
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        })
    }

    /// Flags or unflags a closed cell. Open cells and finished games are left
    /// alone.
    pub fn apply_toggle_flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        let coords = self.validate_coords(coords)?;

        if self.state.is_finished() {
            return Ok(FlagOutcome::NoChange);
        }

        let cell = &mut self.cells[coords.to_nd_index()];
        if cell.is_revealed {
            return Ok(FlagOutcome::NoChange);
        }

        cell.is_flagged = !cell.is_flagged;
        if cell.is_flagged {
            self.flags_placed += 1;
        } else {
            self.flags_placed -= 1;
        }

        // flags never change the revealed count, so no win check here
        Ok(FlagOutcome::Changed)
    }

    fn place_mines(&mut self, layout: &MineLayout) {
        for ((row, col), cell) in self.cells.indexed_iter_mut() {
            let coords = (row as Coord, col as Coord);
            cell.is_mine = layout.contains_mine(coords);
            cell.adjacent_mines = if cell.is_mine {
                0
            } else {
                layout.adjacent_mine_count(coords)
            };
        }
        self.state = GameState::Active;
    }

    /// Opens `start` and spreads through neighboring zero cells, returning how
    /// many safe cells were opened. The border of numbered cells around a zero
    /// region is opened but not expanded. Flagged cells stop the spread.
    fn flood_reveal(&mut self, start: Coord2) -> CellCount {
        let start_cell = &mut self.cells[start.to_nd_index()];
        start_cell.is_revealed = true;
        let mut revealed: CellCount = 1;

        let mut to_visit = VecDeque::new();
        if start_cell.adjacent_mines == 0 {
            to_visit.push_back(start);
        }

        while let Some(visit_coords) = to_visit.pop_front() {
            for pos in self.cells.iter_neighbors(visit_coords) {
                let neighbor = &mut self.cells[pos.to_nd_index()];
                if neighbor.is_revealed || neighbor.is_flagged || neighbor.is_mine {
                    continue;
                }

                neighbor.is_revealed = true;
                revealed += 1;

                if neighbor.adjacent_mines == 0 {
                    to_visit.push_back(pos);
                }
            }
        }

        log::trace!("Reveal at {:?} opened {} cells", start, revealed);
        revealed
    }

    fn check_win(&mut self) -> bool {
        if self.state.is_finished() || self.revealed_safe_count < self.safe_cell_total() {
            return false;
        }

        self.reveal_all_mines();
        self.state = GameState::Won;
        self.triggered_mine = None;
        log::debug!("All {} safe cells revealed, game won", self.revealed_safe_count);
        true
    }

    fn reveal_all_mines(&mut self) {
        for cell in self.cells.iter_mut().filter(|cell| cell.is_mine) {
            cell.is_revealed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(size: Coord2, mines: &[Coord2]) -> Board {
        Board::from_layout(&MineLayout::from_mine_coords(size, mines).unwrap()).unwrap()
    }

    fn count_cells(board: &Board, pred: impl Fn(&Cell) -> bool) -> usize {
        board.cells().iter().filter(|cell| pred(cell)).count()
    }

    #[test]
    fn new_board_has_no_mines() {
        let board = Board::new(GameConfig::BEGINNER).unwrap();

        assert_eq!(board.state(), GameState::Ready);
        assert!(!board.is_initialized());
        assert_eq!(count_cells(&board, |cell| cell.is_mine()), 0);
        assert_eq!(board.size(), (9, 9));
        assert_eq!((board.rows(), board.cols()), (9, 9));
        assert_eq!(board.mine_count(), 10);
        assert_eq!(board.safe_cell_total(), 71);
    }

    #[test]
    fn new_board_rejects_invalid_config() {
        let full = GameConfig::new_unchecked((2, 2), 4);
        let flat = GameConfig::new_unchecked((0, 5), 0);

        assert_eq!(Board::new(full), Err(GameError::TooManyMines));
        assert_eq!(Board::new(flat), Err(GameError::InvalidSize));
    }

    #[test]
    fn first_reveal_on_beginner_board_is_safe() {
        let board = Board::with_seed(GameConfig::BEGINNER, 11).unwrap();

        let board = board.reveal((4, 4)).unwrap();

        assert!(board.is_initialized());
        assert!(!board.cell_at((4, 4)).unwrap().is_mine());
        assert!(board.cell_at((4, 4)).unwrap().is_revealed());
        assert_ne!(board.state(), GameState::Lost);
        assert_eq!(count_cells(&board, |cell| cell.is_mine()), 10);
    }

    #[test]
    fn first_reveal_on_flagged_cell_still_places_mines() {
        let board = Board::with_seed(GameConfig::BEGINNER, 5).unwrap();
        let board = board.toggle_flag((0, 0)).unwrap();

        let mut next = board.clone();
        let outcome = next.apply_reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::NoChange);
        assert!(!outcome.has_update());
        assert_eq!(next.state(), GameState::Active);
        assert!(!next.cell_at((0, 0)).unwrap().is_mine());
        assert!(!next.cell_at((0, 0)).unwrap().is_revealed());
        assert_eq!(next.revealed_safe_count(), 0);
    }

    #[test]
    fn reveal_leaves_original_board_untouched() {
        let before = board((3, 3), &[(2, 2)]);

        let after = before.reveal((0, 0)).unwrap();

        assert_eq!(before.revealed_safe_count(), 0);
        assert_eq!(after.revealed_safe_count(), 8);
    }

    #[test]
    fn reveal_hits_mine_and_reveals_all_mines() {
        let mut board = board((3, 3), &[(0, 0), (2, 2)]);

        assert_eq!(board.apply_reveal((1, 0)).unwrap(), RevealOutcome::Revealed);
        let outcome = board.apply_reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::HitMine);
        assert_eq!(board.state(), GameState::Lost);
        assert!(board.is_game_over());
        assert!(!board.is_won());
        assert_eq!(board.triggered_mine(), Some((0, 0)));
        assert!(board.cell_at((2, 2)).unwrap().is_revealed());
        assert!(board.cell_at((1, 0)).unwrap().is_revealed());
        assert!(!board.cell_at((1, 1)).unwrap().is_revealed());
        assert_eq!(board.revealed_safe_count(), 1);
    }

    #[test]
    fn hitting_mine_on_beginner_board_reveals_every_mine() {
        let mines = [
            (0, 0),
            (0, 4),
            (0, 8),
            (2, 2),
            (4, 0),
            (4, 8),
            (6, 6),
            (8, 0),
            (8, 4),
            (8, 8),
        ];
        let board = board((9, 9), &mines);

        let board = board.reveal((1, 1)).unwrap();
        assert_eq!(board.cell_at((1, 1)).unwrap().adjacent_mines(), 2);
        let board = board.reveal((6, 6)).unwrap();

        for mine in mines {
            assert!(board.cell_at(mine).unwrap().is_revealed());
        }
        assert!(board.cell_at((1, 1)).unwrap().is_revealed());
        assert_eq!(board.revealed_safe_count(), 1);
        assert!(board.is_game_over());
        assert!(!board.is_won());
    }

    #[test]
    fn reveal_flood_fill_opens_zero_region() {
        let mut board = board((3, 3), &[(2, 2)]);

        let outcome = board.apply_reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(board.cell_view((0, 0)).unwrap(), CellView::Revealed(0));
        assert_eq!(board.cell_view((1, 1)).unwrap(), CellView::Revealed(1));
        assert_eq!(board.cell_view((2, 2)).unwrap(), CellView::Mine);
    }

    #[test]
    fn numbered_cell_does_not_expand() {
        let mut board = board((3, 3), &[(2, 2)]);

        board.apply_reveal((1, 1)).unwrap();

        assert_eq!(board.revealed_safe_count(), 1);
        assert!(!board.cell_at((0, 0)).unwrap().is_revealed());
    }

    #[test]
    fn flood_fill_stops_at_flags() {
        // mine in the far corner, a flag walls off the left column
        let mut board = board((1, 5), &[(0, 4)]);
        board.apply_toggle_flag((0, 1)).unwrap();

        let outcome = board.apply_reveal((0, 2)).unwrap();

        assert_eq!(outcome, RevealOutcome::Revealed);
        assert!(board.cell_at((0, 2)).unwrap().is_revealed());
        assert!(board.cell_at((0, 3)).unwrap().is_revealed());
        assert!(!board.cell_at((0, 1)).unwrap().is_revealed());
        assert!(!board.cell_at((0, 0)).unwrap().is_revealed());
        assert_eq!(board.revealed_safe_count(), 2);
    }

    #[test]
    fn surrounded_center_wins_without_flooding() {
        let mines: Vec<Coord2> = (0..3)
            .flat_map(|row| (0..3).map(move |col| (row, col)))
            .filter(|&coords| coords != (1, 1))
            .collect();
        let board = board((3, 3), &mines);

        let board = board.reveal((1, 1)).unwrap();

        assert_eq!(board.cell_at((1, 1)).unwrap().adjacent_mines(), 8);
        assert_eq!(board.revealed_safe_count(), 1);
        assert_eq!(board.safe_cell_total(), 1);
        assert!(board.is_won());
        assert!(board.is_game_over());
        assert_eq!(board.triggered_mine(), None);
        assert_eq!(count_cells(&board, |cell| cell.is_revealed()), 9);
    }

    #[test]
    fn winning_board_transitions_to_won_state() {
        let mut board = board((2, 1), &[(0, 0)]);

        assert_eq!(board.apply_reveal((1, 0)).unwrap(), RevealOutcome::Won);
        assert_eq!(board.state(), GameState::Won);
        assert!(board.is_game_over());
    }

    #[test]
    fn finished_board_ignores_further_moves() {
        let lost = board((2, 2), &[(0, 0)]).reveal((0, 0)).unwrap();

        let mut again = lost.clone();
        assert_eq!(again.apply_reveal((1, 1)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(again.apply_reveal((0, 0)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(again.apply_toggle_flag((1, 0)).unwrap(), FlagOutcome::NoChange);
        assert_eq!(again, lost);
    }

    #[test]
    fn toggle_flag_twice_restores_cell() {
        let start = Board::new(GameConfig::BEGINNER).unwrap();

        let flagged = start.toggle_flag((3, 3)).unwrap();
        assert_eq!(flagged.flags_placed(), 1);
        assert_eq!(flagged.mines_left(), 9);
        assert_eq!(flagged.cell_view((3, 3)).unwrap(), CellView::Flagged);

        let unflagged = flagged.toggle_flag((3, 3)).unwrap();
        assert_eq!(unflagged.flags_placed(), 0);
        assert!(!unflagged.cell_at((3, 3)).unwrap().is_flagged());
        assert_eq!(unflagged, start);
    }

    #[test]
    fn toggle_flag_on_revealed_cell_is_noop() {
        let mut board = board((3, 3), &[(2, 2)]);
        board.apply_reveal((1, 1)).unwrap();

        let outcome = board.apply_toggle_flag((1, 1)).unwrap();
        assert_eq!(outcome, FlagOutcome::NoChange);
        assert!(!outcome.has_update());
        assert_eq!(board.flags_placed(), 0);
    }

    #[test]
    fn flagged_cell_blocks_reveal() {
        let mut board = board((2, 2), &[(0, 0)]);
        board.apply_toggle_flag((0, 0)).unwrap();

        assert_eq!(board.apply_reveal((0, 0)).unwrap(), RevealOutcome::NoChange);
        assert!(!board.is_game_over());
    }

    #[test]
    fn out_of_bounds_is_rejected_without_changes() {
        let board = Board::with_seed(GameConfig::BEGINNER, 1).unwrap();

        assert_eq!(board.reveal((9, 0)), Err(GameError::InvalidCoords));
        assert_eq!(board.toggle_flag((0, 9)), Err(GameError::InvalidCoords));
        assert_eq!(board.cell_at((9, 9)), Err(GameError::InvalidCoords));

        let mut board = board;
        assert_eq!(board.apply_reveal((200, 200)), Err(GameError::InvalidCoords));
        assert!(!board.is_initialized());
    }

    #[test]
    fn over_flagging_goes_negative() {
        let mut board = board((2, 2), &[(0, 0)]);
        board.apply_toggle_flag((0, 1)).unwrap();
        board.apply_toggle_flag((1, 0)).unwrap();

        assert_eq!(board.mines_left(), -1);
    }

    #[test]
    fn new_game_starts_over_with_same_config() {
        let lost = board((2, 2), &[(0, 0)]).reveal((0, 0)).unwrap();

        let fresh = lost.new_game();

        assert_eq!(fresh.config(), lost.config());
        assert_eq!(fresh.state(), GameState::Ready);
        assert_eq!(fresh.triggered_mine(), None);
        assert_eq!(count_cells(&fresh, |cell| cell.is_mine()), 0);
    }

    #[test]
    fn same_seed_and_first_click_give_same_board() {
        let a = Board::with_seed(GameConfig::BEGINNER, 99).unwrap();
        let b = a.clone();

        assert_eq!(a.reveal((0, 0)).unwrap(), b.reveal((0, 0)).unwrap());
    }

    #[test]
    fn from_layout_rejects_board_without_safe_cells() {
        let layout = MineLayout::from_mine_coords((1, 2), &[(0, 0), (0, 1)]).unwrap();

        assert_eq!(Board::from_layout(&layout), Err(GameError::TooManyMines));
    }
}
