use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Input and output errors of the command line tool.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Cannot write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

pub type AppResult<T> = std::result::Result<T, AppError>;
