use std::{collections::BTreeMap, future::Future, sync::Arc};

use tokio::sync::RwLock;

use crate::{
    core::model::{Book, BookId, BookInfo, Status},
    error::Result,
};

pub mod persistence;

/// A table of books keyed by an id the store assigns.
///
/// Every method is a single read or write. The futures have to be `Send`
/// because they are awaited from axum handlers.
pub trait RecordStore: Send + Sync {
    fn all(&self) -> impl Future<Output = Result<Vec<Book>>> + Send;

    fn find(&self, id: BookId) -> impl Future<Output = Result<Option<Book>>> + Send;

    /// Assigns a fresh id and persists the book with the default status.
    fn insert(&self, info: BookInfo) -> impl Future<Output = Result<Book>> + Send;

    /// Returns `None` when there is no book with this id.
    fn set_status(
        &self,
        id: BookId,
        status: Status,
    ) -> impl Future<Output = Result<Option<Book>>> + Send;

    /// Removing an id that does not exist is not an error.
    fn remove(&self, id: BookId) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Default)]
struct MemoryTable {
    last_id: u64,
    books: BTreeMap<BookId, Book>,
}

/// Non-durable store, forgotten when the process exits.
#[derive(Clone, Default)]
pub struct MemoryStore(Arc<RwLock<MemoryTable>>);

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    async fn all(&self) -> Result<Vec<Book>> {
        let Self(table) = self;
        Ok(table.read().await.books.values().cloned().collect())
    }

    async fn find(&self, id: BookId) -> Result<Option<Book>> {
        let Self(table) = self;
        Ok(table.read().await.books.get(&id).cloned())
    }

    async fn insert(&self, info: BookInfo) -> Result<Book> {
        let Self(table) = self;
        let mut table = table.write().await;

        table.last_id += 1;
        let book = Book::new(BookId(table.last_id), info);
        table.books.insert(book.id, book.clone());

        Ok(book)
    }

    async fn set_status(&self, id: BookId, status: Status) -> Result<Option<Book>> {
        let Self(table) = self;
        Ok(table.write().await.books.get_mut(&id).map(|book| {
            book.status = status;
            book.clone()
        }))
    }

    async fn remove(&self, id: BookId) -> Result<()> {
        let Self(table) = self;
        table.write().await.books.remove(&id);
        Ok(())
    }
}
