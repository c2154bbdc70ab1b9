use serde::{Deserialize, Serialize};

use crate::core::model as domain;

/// A book row as it goes over the wire.
#[derive(Debug, Serialize, Deserialize)]
pub struct Book {
    pub id: domain::BookId,
    pub title: String,
    pub author: String,
    pub status: domain::Status,
}

impl From<domain::Book> for Book {
    fn from(
        domain::Book {
            id,
            info: domain::BookInfo { title, author },
            status,
        }: domain::Book,
    ) -> Self {
        Self {
            id,
            title,
            author,
            status,
        }
    }
}

// Missing fields deserialize as empty and are rejected by validation,
// so the caller gets the same error either way.
#[derive(Debug, Deserialize)]
pub struct NewBook {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub author: String,
}

// The status stays a string here; it is parsed into the closed enum by
// the application so a bad value is a validation error.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
