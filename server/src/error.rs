use std::io;

use thiserror::Error;

use crate::core::model::BookId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("No book with id {0}")]
    NotFound(BookId),

    #[error("Storage unavailable {0}")]
    Storage(#[from] fjall::Error),

    #[error("Failed to marshall json data {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error {0}")]
    IoError(#[from] io::Error),

    #[error("Corrupt record {0}")]
    Corrupt(String),
}

impl Error {
    pub fn validation<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self::Validation(message.into())
    }

    pub fn is_storage_failure(&self) -> bool {
        !matches!(self, Error::Validation(..) | Error::NotFound(..))
    }
}

pub type Result<A> = std::result::Result<A, Error>;
