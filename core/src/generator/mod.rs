use crate::*;
pub use random::*;

mod random;

/// Decides where the mines go once the player has picked a starting cell.
pub trait MinefieldGenerator {
    fn generate(self, config: GameConfig) -> Result<MineLayout>;
}
