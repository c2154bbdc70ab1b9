use core::fmt;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, Result};

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(pub u64);

impl BookId {
    pub fn to_key(self) -> [u8; 8] {
        let Self(id) = self;
        id.to_be_bytes()
    }

    pub fn from_key(key: &[u8]) -> Result<Self> {
        let bytes: [u8; 8] = key
            .try_into()
            .map_err(|_| Error::Corrupt(format!("book key of length {}", key.len())))?;
        Ok(Self(u64::from_be_bytes(bytes)))
    }

    pub fn next(self) -> Self {
        let Self(id) = self;
        Self(id + 1)
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(id) = self;
        write!(f, "{id}")
    }
}

#[derive(Copy, Clone, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "To Be Read")]
    ToBeRead,

    #[serde(rename = "Reading")]
    Reading,

    #[serde(rename = "Finished")]
    Finished,
}

impl Status {
    const TO_BE_READ: &'static str = "To Be Read";
    const READING: &'static str = "Reading";
    const FINISHED: &'static str = "Finished";

    pub const ALL: [Status; 3] = [Status::ToBeRead, Status::Reading, Status::Finished];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::ToBeRead => Self::TO_BE_READ,
            Status::Reading => Self::READING,
            Status::Finished => Self::FINISHED,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(status: &str) -> Result<Self> {
        match status.trim() {
            Self::TO_BE_READ => Ok(Status::ToBeRead),
            Self::READING => Ok(Status::Reading),
            Self::FINISHED => Ok(Status::Finished),
            otherwise => Err(Error::validation(format!(
                "`{otherwise}` is not a valid status, expected one of: {}",
                Status::ALL.map(|s| s.as_str()).join(", ")
            ))),
        }
    }
}

/// The part of a book that is fixed at creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInfo {
    pub title: String,
    pub author: String,
}

impl BookInfo {
    /// Trims both fields and rejects either one being empty.
    pub fn try_new(title: &str, author: &str) -> Result<Self> {
        let title = title.trim();
        let author = author.trim();

        if title.is_empty() {
            Err(Error::validation("title must not be empty"))
        } else if author.is_empty() {
            Err(Error::validation("author must not be empty"))
        } else {
            Ok(Self {
                title: title.to_owned(),
                author: author.to_owned(),
            })
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub info: BookInfo,
    pub status: Status,
}

impl Book {
    pub fn new(id: BookId, info: BookInfo) -> Self {
        Self {
            id,
            info,
            status: Status::default(),
        }
    }

    pub fn with_status(self, status: Status) -> Self {
        Self { status, ..self }
    }
}
