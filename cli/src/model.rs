use clap::{Parser, Subcommand};
use tabled::Tabled;

use super::domain;

#[derive(Subcommand)]
pub enum Command {
    /// Show the reading list
    List {
        #[arg(
            long,
            default_value = "none",
            help = "none, title-asc, title-desc, author-asc or author-desc"
        )]
        sort: domain::SortOrder,
    },

    /// Put a book on the list
    Add(NewBook),

    /// Change the status of a book
    Status {
        id: domain::BookId,

        #[arg(help = "\"To Be Read\" (or tbr), reading or finished")]
        status: domain::Status,
    },

    /// Take a book off the list
    Remove { id: domain::BookId },

    /// Shuffle the list and pick a book to read next
    Pick,
}

#[derive(Parser)]
pub struct NewBook {
    #[arg(long, help = "Title of the book")]
    pub title: String,

    #[arg(long, help = "Author of the book")]
    pub author: String,
}

#[derive(Tabled)]
pub struct BookRow {
    #[tabled(rename = "ID")]
    id: domain::BookId,

    #[tabled(rename = "Title")]
    title: String,

    #[tabled(rename = "Author")]
    author: String,

    #[tabled(rename = "Status")]
    status: domain::Status,
}

impl From<domain::Book> for BookRow {
    fn from(
        domain::Book {
            id,
            title,
            author,
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
