use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Board dimensions must be positive")]
    InvalidSize,
    #[error("Too many mines, at least one cell must stay safe")]
    TooManyMines,
}

pub type Result<T> = core::result::Result<T, GameError>;
