use std::io;

use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("undefined operation: {0}")]
    UndefinedOperation(&'static str),
    #[error("maze parse error at row {row}: {reason}")]
    MazeParse { row: usize, reason: String },
    #[error("layout references tile ({col}, {row}) which has no node")]
    MissingNode { col: f32, row: f32 },
    #[error("invalid rules config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("failed to read rules config: {0}")]
    Io(#[from] io::Error),
}
