//! Composition root of the library demo.

use std::sync::Arc;

use tarkib::{Container, Module, Transient};

use crate::data_provider::{DataProvider, DbProvider};
use crate::librarian::{CarelessLibrarian, DiligentLibrarian, Librarian};
use crate::logging::{ConsoleLogger, Logger};
use crate::repository::{BookRepository, CachingBookRepository};
use crate::service::{Library, LibraryService};

/// Registers the whole library graph.
///
/// The service is transient; everything it depends on is a singleton.
#[derive(Debug, Clone)]
pub struct LibraryModule {
    pub connection: String,
}

impl LibraryModule {
    pub fn new(connection: impl Into<String>) -> Self {
        Self {
            connection: connection.into(),
        }
    }
}

impl Module for LibraryModule {
    fn register(&self, container: &mut Container) -> tarkib::Result<()> {
        let connection = self.connection.clone();
        container
            .register_factory::<dyn DataProvider>(move || {
                Arc::new(DbProvider::new(connection.as_str())) as Arc<dyn DataProvider>
            })?
            .register::<dyn BookRepository, CachingBookRepository>()?
            .register::<dyn Logger, ConsoleLogger>()?
            .register::<dyn Librarian, DiligentLibrarian>()?
            .register::<dyn Librarian, CarelessLibrarian>()?
            .register_with::<dyn LibraryService, Library>(&Transient)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "library"
    }
}
