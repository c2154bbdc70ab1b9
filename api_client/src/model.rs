use feruca::Collator;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt, str::FromStr};

use crate::error::Error;

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct BookId(pub u64);

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(id) = self;
        write!(f, "{id}")
    }
}

impl FromStr for BookId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        s.trim()
            .parse()
            .map(Self)
            .map_err(|_| Error::Validation(format!("`{s}` is not a book id")))
    }
}

#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
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
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::ToBeRead => "To Be Read",
            Status::Reading => "Reading",
            Status::Finished => "Finished",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the wire spelling as well as the short forms typed on a
/// command line, ignoring case.
impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_lowercase().as_str() {
            "to be read" | "to-be-read" | "tbr" => Ok(Status::ToBeRead),
            "reading" => Ok(Status::Reading),
            "finished" => Ok(Status::Finished),
            _ => Err(Error::Validation(format!("`{s}` is not a valid status"))),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub status: Status,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: Status,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Deleted {
    pub success: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SortKey {
    Title,
    Author,
}

impl SortKey {
    fn field<'a>(&self, book: &'a Book) -> &'a str {
        match self {
            SortKey::Title => &book.title,
            SortKey::Author => &book.author,
        }
    }

    /// Total order on books: collated field, then id.
    pub fn compare(&self, collator: &mut Collator, a: &Book, b: &Book) -> Ordering {
        collate(collator, self.field(a), self.field(b)).then_with(|| a.id.cmp(&b.id))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Unsorted,
    By(SortKey, Direction),
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim() {
            "none" => Ok(SortOrder::Unsorted),
            "title-asc" => Ok(SortOrder::By(SortKey::Title, Direction::Ascending)),
            "title-desc" => Ok(SortOrder::By(SortKey::Title, Direction::Descending)),
            "author-asc" => Ok(SortOrder::By(SortKey::Author, Direction::Ascending)),
            "author-desc" => Ok(SortOrder::By(SortKey::Author, Direction::Descending)),
            otherwise => Err(Error::Validation(format!(
                "`{otherwise}` is not a sort order, expected one of: \
                 none, title-asc, title-desc, author-asc, author-desc"
            ))),
        }
    }
}

/// Unicode Collation Algorithm order (CLDR root), so accents and case only
/// matter once the base letters are equal. The raw text breaks remaining
/// ties.
pub fn collate(collator: &mut Collator, a: &str, b: &str) -> Ordering {
    collator.collate(a, b).then_with(|| a.cmp(b))
}
