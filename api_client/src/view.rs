use feruca::Collator;
use rand::{seq::SliceRandom, Rng};
use std::future::Future;

use crate::{
    error::Result,
    model::{Book, BookId, Direction, NewBook, SortOrder, Status},
};

/// The remote operations a [`ClientView`] delegates to.
pub trait BookService {
    fn list(&self) -> impl Future<Output = Result<Vec<Book>>> + Send;

    fn create(&self, info: NewBook) -> impl Future<Output = Result<Book>> + Send;

    fn update_status(
        &self,
        id: BookId,
        status: Status,
    ) -> impl Future<Output = Result<Book>> + Send;

    fn delete(&self, id: BookId) -> impl Future<Output = Result<()>> + Send;
}

/// Local copy of the book list.
///
/// Mutations go to the service first and are applied locally only once it
/// has answered, except for [`ClientView::remove`] which drops the local
/// entry whatever the service says. Sorting and shuffling never reach the
/// service.
pub struct ClientView<S> {
    service: S,
    books: Vec<Book>,
}

impl<S> ClientView<S>
where
    S: BookService,
{
    pub fn new(service: S) -> Self {
        Self {
            service,
            books: vec![],
        }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub async fn refresh(&mut self) -> Result<&[Book]> {
        self.books = logged("refresh", self.service.list().await)?;
        Ok(&self.books)
    }

    /// Empty titles or authors are ignored and `None` is returned.
    pub async fn add(&mut self, title: &str, author: &str) -> Result<Option<Book>> {
        let (title, author) = (title.trim(), author.trim());
        if title.is_empty() || author.is_empty() {
            tracing::debug!("ignoring a book without title or author");
            return Ok(None);
        }

        let info = NewBook {
            title: title.to_owned(),
            author: author.to_owned(),
        };
        let book = logged("add", self.service.create(info).await)?;
        self.books.push(book.clone());

        Ok(Some(book))
    }

    pub async fn remove(&mut self, id: BookId) -> Result<()> {
        let outcome = logged("remove", self.service.delete(id).await);
        self.books.retain(|book| book.id != id);
        outcome
    }

    pub async fn set_status(&mut self, id: BookId, status: Status) -> Result<Book> {
        let updated = logged("set_status", self.service.update_status(id, status).await)?;
        if let Some(book) = self.books.iter_mut().find(|book| book.id == updated.id) {
            *book = updated.clone();
        }
        Ok(updated)
    }

    pub fn sort_by(&self, order: SortOrder) -> Vec<Book> {
        let mut sorted = self.books.clone();
        if let SortOrder::By(key, direction) = order {
            let mut collator = Collator::default();
            match direction {
                Direction::Ascending => sorted.sort_by(|a, b| key.compare(&mut collator, a, b)),
                Direction::Descending => sorted.sort_by(|a, b| key.compare(&mut collator, b, a)),
            }
        }
        sorted
    }

    /// Shuffles the local copy in place and picks one book from it.
    pub fn shuffle_and_pick<R>(&mut self, rng: &mut R) -> (Vec<Book>, Option<Book>)
    where
        R: Rng + ?Sized,
    {
        self.books.shuffle(rng);
        let picked = self.books.choose(rng).cloned();
        (self.books.clone(), picked)
    }
}

fn logged<A>(operation: &str, result: Result<A>) -> Result<A> {
    if let Err(error) = &result {
        tracing::warn!(operation, %error, "book service call failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};
    use reqwest::StatusCode;
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    };

    use super::*;
    use crate::{error::Error, model::SortKey};

    #[derive(Default)]
    struct FakeService {
        books: Mutex<Vec<Book>>,
        last_id: Mutex<u64>,
        failing: AtomicBool,
    }

    impl FakeService {
        fn with_titles(entries: &[(&str, &str)]) -> Self {
            let service = Self::default();
            for (title, author) in entries {
                let mut last_id = service.last_id.lock().unwrap();
                *last_id += 1;
                service.books.lock().unwrap().push(Book {
                    id: BookId(*last_id),
                    title: title.to_string(),
                    author: author.to_string(),
                    status: Status::ToBeRead,
                });
            }
            service
        }

        fn check(&self) -> Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                Err(Error::Server {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "store offline".to_owned(),
                })
            } else {
                Ok(())
            }
        }
    }

    impl BookService for FakeService {
        async fn list(&self) -> Result<Vec<Book>> {
            self.check()?;
            Ok(self.books.lock().unwrap().clone())
        }

        async fn create(&self, NewBook { title, author }: NewBook) -> Result<Book> {
            self.check()?;
            let mut last_id = self.last_id.lock().unwrap();
            *last_id += 1;
            let book = Book {
                id: BookId(*last_id),
                title,
                author,
                status: Status::ToBeRead,
            };
            self.books.lock().unwrap().push(book.clone());
            Ok(book)
        }

        async fn update_status(&self, id: BookId, status: Status) -> Result<Book> {
            self.check()?;
            let mut books = self.books.lock().unwrap();
            let book = books
                .iter_mut()
                .find(|book| book.id == id)
                .ok_or(Error::Server {
                    status: StatusCode::NOT_FOUND,
                    message: format!("No book with id {id}"),
                })?;
            book.status = status;
            Ok(book.clone())
        }

        async fn delete(&self, id: BookId) -> Result<()> {
            self.check()?;
            self.books.lock().unwrap().retain(|book| book.id != id);
            Ok(())
        }
    }

    async fn loaded_view(entries: &[(&str, &str)]) -> ClientView<FakeService> {
        let mut view = ClientView::new(FakeService::with_titles(entries));
        view.refresh().await.unwrap();
        view
    }

    fn titles(books: &[Book]) -> Vec<&str> {
        books.iter().map(|book| book.title.as_str()).collect()
    }

    #[tokio::test]
    async fn refresh_replaces_local_copy() {
        let mut view = ClientView::new(FakeService::with_titles(&[("Dune", "Herbert")]));
        assert!(view.books().is_empty());

        let books = view.refresh().await.unwrap();
        assert_eq!(titles(books), vec!["Dune"]);
    }

    #[tokio::test]
    async fn add_appends_created_book() {
        let mut view = loaded_view(&[("Dune", "Herbert")]).await;

        let added = view.add("Emma", "Austen").await.unwrap().unwrap();

        assert_eq!(added.status, Status::ToBeRead);
        assert_eq!(titles(view.books()), vec!["Dune", "Emma"]);
    }

    #[tokio::test]
    async fn add_ignores_empty_fields() {
        let mut view = loaded_view(&[]).await;

        assert_eq!(view.add("", "Austen").await.unwrap(), None);
        assert_eq!(view.add("Emma", "  ").await.unwrap(), None);
        assert!(view.books().is_empty());
        assert!(view.service.books.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_add_leaves_local_copy() {
        let mut view = loaded_view(&[("Dune", "Herbert")]).await;
        view.service.failing.store(true, Ordering::SeqCst);

        assert!(view.add("Emma", "Austen").await.is_err());
        assert_eq!(titles(view.books()), vec!["Dune"]);
    }

    #[tokio::test]
    async fn set_status_replaces_local_entry() {
        let mut view = loaded_view(&[("Dune", "Herbert"), ("Emma", "Austen")]).await;

        let updated = view.set_status(BookId(2), Status::Finished).await.unwrap();

        assert_eq!(updated.status, Status::Finished);
        assert_eq!(view.books()[1], updated);
        assert_eq!(view.books()[0].status, Status::ToBeRead);
    }

    #[tokio::test]
    async fn failed_set_status_leaves_local_copy() {
        let mut view = loaded_view(&[("Dune", "Herbert")]).await;

        assert!(view.set_status(BookId(9), Status::Reading).await.is_err());
        assert_eq!(view.books()[0].status, Status::ToBeRead);
    }

    #[tokio::test]
    async fn remove_drops_local_entry_even_on_failure() {
        let mut view = loaded_view(&[("Dune", "Herbert"), ("Emma", "Austen")]).await;
        view.remove(BookId(1)).await.unwrap();
        assert_eq!(titles(view.books()), vec!["Emma"]);

        view.service.failing.store(true, Ordering::SeqCst);
        assert!(view.remove(BookId(2)).await.is_err());
        assert!(view.books().is_empty());
    }

    #[tokio::test]
    async fn sort_by_title_and_author() {
        let view = loaded_view(&[
            ("dune", "Herbert"),
            ("Emma", "austen"),
            ("Anathem", "Stephenson"),
        ])
        .await;

        let ascending = view.sort_by(SortOrder::By(SortKey::Title, Direction::Ascending));
        assert_eq!(titles(&ascending), vec!["Anathem", "dune", "Emma"]);

        let mut descending = view.sort_by(SortOrder::By(SortKey::Title, Direction::Descending));
        descending.reverse();
        assert_eq!(descending, ascending);

        let by_author = view.sort_by(SortOrder::By(SortKey::Author, Direction::Ascending));
        assert_eq!(titles(&by_author), vec!["Emma", "dune", "Anathem"]);

        let unsorted = view.sort_by(SortOrder::Unsorted);
        assert_eq!(titles(&unsorted), vec!["dune", "Emma", "Anathem"]);
        assert_eq!(view.books(), unsorted.as_slice());
    }

    #[tokio::test]
    async fn sort_by_title_keeps_accented_titles_with_their_letter() {
        let view = loaded_view(&[("Zola", "Bernard"), ("eve", "Arendt"), ("Émile", "Rousseau")])
            .await;

        let ascending = view.sort_by(SortOrder::By(SortKey::Title, Direction::Ascending));
        assert_eq!(titles(&ascending), vec!["Émile", "eve", "Zola"]);

        let descending = view.sort_by(SortOrder::By(SortKey::Title, Direction::Descending));
        assert_eq!(titles(&descending), vec!["Zola", "eve", "Émile"]);
    }

    #[tokio::test]
    async fn descending_is_exact_reverse_with_equal_titles() {
        let view = loaded_view(&[("Dune", "Herbert"), ("Dune", "Anderson"), ("Dune", "Herbert")])
            .await;

        let ascending = view.sort_by(SortOrder::By(SortKey::Title, Direction::Ascending));
        let mut descending = view.sort_by(SortOrder::By(SortKey::Title, Direction::Descending));
        descending.reverse();

        assert_eq!(descending, ascending);
    }

    #[tokio::test]
    async fn shuffle_is_a_permutation_and_pick_is_a_member() {
        let mut view = loaded_view(&[
            ("Dune", "Herbert"),
            ("Emma", "Austen"),
            ("Anathem", "Stephenson"),
            ("Ubik", "Dick"),
        ])
        .await;
        let mut rng = StdRng::seed_from_u64(7);

        let (shuffled, picked) = view.shuffle_and_pick(&mut rng);

        let mut ids: Vec<_> = shuffled.iter().map(|book| book.id).collect();
        ids.sort();
        assert_eq!(ids, vec![BookId(1), BookId(2), BookId(3), BookId(4)]);
        assert!(shuffled.contains(&picked.unwrap()));
        assert_eq!(view.books(), shuffled.as_slice());
    }

    #[tokio::test]
    async fn shuffle_of_empty_list_picks_nothing() {
        let mut view = loaded_view(&[]).await;
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(view.shuffle_and_pick(&mut rng), (vec![], None));
    }

    #[tokio::test]
    async fn shuffle_reaches_every_position() {
        let mut view = loaded_view(&[("Dune", "Herbert"), ("Emma", "Austen"), ("Ubik", "Dick")])
            .await;
        let mut rng = StdRng::seed_from_u64(42);
        let mut first_seen = std::collections::HashSet::new();

        for _ in 0..200 {
            let (shuffled, _) = view.shuffle_and_pick(&mut rng);
            first_seen.insert(shuffled[0].id);
        }

        assert_eq!(first_seen.len(), 3);
    }
}
