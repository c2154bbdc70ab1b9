use std::{path::Path, sync::Arc};

use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{
    core::model::{Book, BookId, BookInfo, Status},
    error,
};

use super::RecordStore;

const SEQUENCE_KEY: &[u8] = b"book-sequence";

#[derive(Serialize, Deserialize)]
struct ArchivedBook {
    title: String,
    author: String,
    status: Status,
}

impl ArchivedBook {
    fn as_json(&self) -> error::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    fn from_slice(bytes: &[u8]) -> error::Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    fn into_book(self, id: BookId) -> Book {
        let Self {
            title,
            author,
            status,
        } = self;
        Book {
            id,
            info: BookInfo { title, author },
            status,
        }
    }
}

impl From<&Book> for ArchivedBook {
    fn from(
        Book {
            info: BookInfo { title, author },
            status,
            ..
        }: &Book,
    ) -> Self {
        Self {
            title: title.to_owned(),
            author: author.to_owned(),
            status: *status,
        }
    }
}

/// Durable book table on a fjall keyspace.
///
/// Books are keyed by their big-endian id so a scan yields them in
/// insertion order. The last assigned id lives in the `meta` partition
/// and is written in the same batch as the book it was assigned to.
#[derive(Clone)]
pub struct BookArchive(Arc<BookArchiveInner>);

impl BookArchive {
    pub fn try_new<P>(store_path: P) -> error::Result<Self>
    where
        P: AsRef<Path>,
    {
        Ok(Self(Arc::new(BookArchiveInner::try_open(
            Keyspace::open(Config::new(store_path))?,
        )?)))
    }

    fn inner(&self) -> &BookArchiveInner {
        let Self(x) = self;
        x
    }
}

pub struct BookArchiveInner {
    keyspace: Keyspace,
    books: PartitionHandle,
    meta: PartitionHandle,

    // Held for every write so id assignment and read-modify-write
    // updates do not interleave.
    write_lock: Mutex<()>,
}

impl BookArchiveInner {
    pub fn try_open(keyspace: Keyspace) -> error::Result<Self> {
        let books = keyspace.open_partition("books", PartitionCreateOptions::default())?;
        let meta = keyspace.open_partition("meta", PartitionCreateOptions::default())?;

        Ok(Self {
            keyspace,
            books,
            meta,
            write_lock: Mutex::new(()),
        })
    }

    fn last_id(&self) -> error::Result<BookId> {
        if let Some(bytes) = self.meta.get(SEQUENCE_KEY)? {
            BookId::from_key(&bytes)
        } else {
            Ok(BookId(0))
        }
    }

    fn insert(&self, info: BookInfo) -> error::Result<Book> {
        let book = Book::new(self.last_id()?.next(), info);
        let primary_key = book.id.to_key();

        let mut batch = self.keyspace.batch();
        batch.insert(
            &self.books,
            &primary_key[..],
            ArchivedBook::from(&book).as_json()?,
        );
        batch.insert(&self.meta, SEQUENCE_KEY, &primary_key[..]);
        batch.commit()?;

        self.keyspace.persist(PersistMode::SyncAll)?;

        Ok(book)
    }

    fn find(&self, id: BookId) -> error::Result<Option<Book>> {
        if let Some(bytes) = self.books.get(&id.to_key()[..])? {
            Ok(Some(ArchivedBook::from_slice(&bytes)?.into_book(id)))
        } else {
            Ok(None)
        }
    }

    fn put(&self, book: &Book) -> error::Result<()> {
        self.books
            .insert(&book.id.to_key()[..], ArchivedBook::from(book).as_json()?)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    fn remove(&self, id: BookId) -> error::Result<()> {
        self.books.remove(&id.to_key()[..])?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    fn find_all(&self) -> error::Result<Vec<Book>> {
        let mut books = vec![];

        for pair in self.books.iter() {
            let (key, bytes) = pair?;
            let id = BookId::from_key(&key)?;
            books.push(ArchivedBook::from_slice(&bytes)?.into_book(id));
        }

        Ok(books)
    }
}

impl RecordStore for BookArchive {
    async fn all(&self) -> error::Result<Vec<Book>> {
        self.inner().find_all()
    }

    async fn find(&self, id: BookId) -> error::Result<Option<Book>> {
        self.inner().find(id)
    }

    async fn insert(&self, info: BookInfo) -> error::Result<Book> {
        let _guard = self.inner().write_lock.lock().await;
        self.inner().insert(info)
    }

    async fn set_status(&self, id: BookId, status: Status) -> error::Result<Option<Book>> {
        let inner = self.inner();
        let _guard = inner.write_lock.lock().await;

        match inner.find(id)? {
            Some(book) => {
                let book = book.with_status(status);
                inner.put(&book)?;
                Ok(Some(book))
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, id: BookId) -> error::Result<()> {
        let _guard = self.inner().write_lock.lock().await;
        self.inner().remove(id)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn info(title: &str, author: &str) -> BookInfo {
        BookInfo::try_new(title, author).unwrap()
    }

    #[tokio::test]
    async fn insert_then_list_in_id_order() {
        let temp_dir = TempDir::new().unwrap();
        let archive = BookArchive::try_new(temp_dir.path()).unwrap();

        let dune = archive.insert(info("Dune", "Herbert")).await.unwrap();
        let emma = archive.insert(info("Emma", "Austen")).await.unwrap();

        assert_eq!(dune.id, BookId(1));
        assert_eq!(emma.id, BookId(2));
        assert_eq!(dune.status, Status::ToBeRead);
        assert_eq!(archive.all().await.unwrap(), vec![dune, emma]);
    }

    #[tokio::test]
    async fn set_status_persists_and_reports_missing() {
        let temp_dir = TempDir::new().unwrap();
        let archive = BookArchive::try_new(temp_dir.path()).unwrap();
        let book = archive.insert(info("Dune", "Herbert")).await.unwrap();

        let updated = archive
            .set_status(book.id, Status::Finished)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, Status::Finished);
        assert_eq!(archive.find(book.id).await.unwrap(), Some(updated));

        assert_eq!(
            archive.set_status(BookId(99), Status::Reading).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let archive = BookArchive::try_new(temp_dir.path()).unwrap();
        let book = archive.insert(info("Dune", "Herbert")).await.unwrap();

        archive.remove(book.id).await.unwrap();
        archive.remove(book.id).await.unwrap();

        assert!(archive.all().await.unwrap().is_empty());
        assert_eq!(archive.find(book.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn sequence_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();

        let first = {
            let archive = BookArchive::try_new(temp_dir.path()).unwrap();
            let book = archive.insert(info("Dune", "Herbert")).await.unwrap();
            archive.remove(book.id).await.unwrap();
            book
        };

        let archive = BookArchive::try_new(temp_dir.path()).unwrap();
        let second = archive.insert(info("Emma", "Austen")).await.unwrap();

        assert!(second.id > first.id);
        assert_eq!(archive.all().await.unwrap(), vec![second]);
    }
}
