//! Book repository with a last-query cache.

use std::sync::Arc;

use parking_lot::RwLock;
use tarkib::{Component, Constructor};
use tracing::trace;

use crate::data_provider::{DataProvider, Entity};
use crate::error::LibraryError;

const BOOK: &str = "Book";

pub trait BookRepository: Send + Sync {
    /// Books from the provider, or from the cache when `from_cache` is set
    /// and a previous query filled it.
    fn books(&self, from_cache: bool) -> Result<Vec<Entity>, LibraryError>;

    /// Result of the last provider query, if any.
    fn cached_books(&self) -> Option<Vec<Entity>>;
}

pub struct CachingBookRepository {
    provider: Arc<dyn DataProvider>,
    cache: RwLock<Option<Vec<Entity>>>,
}

tarkib::implements!(CachingBookRepository => dyn BookRepository);

impl CachingBookRepository {
    pub fn new(provider: Arc<dyn DataProvider>) -> Self {
        Self {
            provider,
            cache: RwLock::new(None),
        }
    }

    fn refresh(&self) -> Result<Vec<Entity>, LibraryError> {
        let books = self.provider.entities(BOOK)?;
        *self.cache.write() = Some(books.clone());
        Ok(books)
    }
}

impl Component for CachingBookRepository {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![
            Constructor::new("new")
                .service::<dyn DataProvider>()
                .build(|args| Ok(CachingBookRepository::new(args.service::<dyn DataProvider>()?))),
        ]
    }
}

impl BookRepository for CachingBookRepository {
    fn books(&self, from_cache: bool) -> Result<Vec<Entity>, LibraryError> {
        if from_cache {
            if let Some(cached) = self.cache.read().as_ref() {
                trace!(count = cached.len(), "Serving books from cache");
                return Ok(cached.clone());
            }
        }
        self.refresh()
    }

    fn cached_books(&self) -> Option<Vec<Entity>> {
        self.cache.read().clone()
    }
}
