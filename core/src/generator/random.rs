use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::index;

use super::*;
use crate::types::{flat_index, from_flat_index};

/// Uniformly random placement that keeps the starting cell safe.
///
/// Every layout of `config.mines` mines that leaves `start` empty is equally
/// likely for a given random seed.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMinefieldGenerator {
    seed: u64,
    start: Coord2,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64, start: Coord2) -> Self {
        Self { seed, start }
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(self, config: GameConfig) -> Result<MineLayout> {
        config.validate()?;

        let (rows, cols) = config.size;
        if self.start.0 >= rows || self.start.1 >= cols {
            log::warn!(
                "Start cell {:?} is outside of a {}x{} board",
                self.start,
                rows,
                cols
            );
            return Err(GameError::InvalidCoords);
        }

        let mut mine_mask: Array2<bool> = Array2::default(config.size.to_nd_index());
        let start_index = flat_index(self.start, cols);
        // every cell but the start is a candidate
        let candidates = usize::from(config.total_cells()) - 1;

        let mut rng = SmallRng::seed_from_u64(self.seed);
        for candidate in index::sample(&mut rng, candidates, usize::from(config.mines)) {
            // skip over the start cell to map candidates onto board cells
            let cell_index = if candidate >= start_index {
                candidate + 1
            } else {
                candidate
            };
            mine_mask[from_flat_index(cell_index, cols).to_nd_index()] = true;
        }

        let layout = MineLayout::from_mine_mask(mine_mask);
        log::debug!(
            "Placed {} mines on a {}x{} board avoiding {:?}",
            layout.mine_count(),
            rows,
            cols,
            self.start
        );
        Ok(layout)
    }
}
