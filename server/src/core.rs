use crate::{
    error::{Error, Result},
    infrastructure::RecordStore,
};
use model::{Book, BookId, BookInfo, Status};

pub mod model;

/// The book table as seen by the API: input is validated here before a
/// single statement is sent to the store.
pub struct Application<RS> {
    store: RS,
}

impl<RS> Application<RS>
where
    RS: RecordStore,
{
    pub fn new(store: RS) -> Self {
        Self { store }
    }

    pub async fn list_books(&self) -> Result<Vec<Book>> {
        self.store.all().await
    }

    pub async fn book(&self, id: BookId) -> Result<Option<Book>> {
        self.store.find(id).await
    }

    pub async fn add_book(&self, title: &str, author: &str) -> Result<Book> {
        let info = BookInfo::try_new(title, author)?;
        let book = self.store.insert(info).await?;
        tracing::info!(id = %book.id, title = %book.info.title, "book added");
        Ok(book)
    }

    /// The status is parsed before the store is touched, so an invalid
    /// value leaves the record as it was.
    pub async fn update_status(&self, id: BookId, status: &str) -> Result<Book> {
        let status: Status = status.parse()?;
        let book = self
            .store
            .set_status(id, status)
            .await?
            .ok_or(Error::NotFound(id))?;
        tracing::info!(%id, %status, "book status updated");
        Ok(book)
    }

    pub async fn remove_book(&self, id: BookId) -> Result<()> {
        self.store.remove(id).await?;
        tracing::info!(%id, "book removed");
        Ok(())
    }
}
