//! The library service, root of the demo object graph.

use std::sync::Arc;

use tarkib::{Component, Constructor, Property};

use crate::data_provider::Entity;
use crate::error::LibraryError;
use crate::librarian::Librarian;
use crate::logging::{ForgetfulLogger, Logger};
use crate::repository::BookRepository;
use crate::selection::DEPENDENCY;

pub trait LibraryService: Send + Sync {
    /// Issues every book, recording each one in every librarian's journal.
    fn books(&self) -> Result<Vec<Entity>, LibraryError>;

    fn logger(&self) -> &dyn Logger;

    fn librarians(&self) -> &[Arc<dyn Librarian>];
}

/// Library service with an optional staff of librarians.
///
/// The logger is not a constructor parameter. It defaults to a
/// [`ForgetfulLogger`] and is replaced only when the container's property
/// selection picks the `logger` property (marked [`DEPENDENCY`]).
pub struct Library {
    repository: Arc<dyn BookRepository>,
    librarians: Vec<Arc<dyn Librarian>>,
    logger: Arc<dyn Logger>,
}

tarkib::implements!(Library => dyn LibraryService);

impl Library {
    pub fn new(repository: Arc<dyn BookRepository>) -> Self {
        Self::with_librarians(repository, Vec::new())
    }

    pub fn with_librarians(repository: Arc<dyn BookRepository>, librarians: Vec<Arc<dyn Librarian>>) -> Self {
        Self {
            repository,
            librarians,
            logger: Arc::new(ForgetfulLogger::new()),
        }
    }
}

impl Component for Library {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![
            Constructor::new("new")
                .service::<dyn BookRepository>()
                .build(|args| Ok(Library::new(args.service::<dyn BookRepository>()?))),
            Constructor::new("with_librarians")
                .service::<dyn BookRepository>()
                .collection::<dyn Librarian>()
                .build(|args| {
                    let repository = args.service::<dyn BookRepository>()?;
                    let librarians = args.services::<dyn Librarian>()?;
                    Ok(Library::with_librarians(repository, librarians))
                }),
        ]
    }

    fn properties() -> Vec<Property<Self>> {
        vec![
            Property::new::<dyn Logger>("logger", |library: &mut Library, logger| {
                library.logger = logger;
            })
            .marked(DEPENDENCY),
        ]
    }
}

impl LibraryService for Library {
    fn books(&self) -> Result<Vec<Entity>, LibraryError> {
        self.logger.info("Issuing books from the library");

        let books = self.repository.books(false).inspect_err(|e| self.logger.error(e))?;
        for librarian in &self.librarians {
            books.iter().for_each(|book| librarian.record(book));
        }
        Ok(books)
    }

    fn logger(&self) -> &dyn Logger {
        self.logger.as_ref()
    }

    fn librarians(&self) -> &[Arc<dyn Librarian>] {
        &self.librarians
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_provider::DbProvider;
    use crate::librarian::{CarelessLibrarian, DiligentLibrarian};
    use crate::repository::CachingBookRepository;

    fn repository(connection: &str) -> Arc<dyn BookRepository> {
        Arc::new(CachingBookRepository::new(Arc::new(DbProvider::new(connection))))
    }

    #[test]
    fn default_logger_is_forgetful() {
        let library = Library::new(repository("db=memory"));
        assert_eq!(library.logger().name(), "forgetful");
        assert!(library.librarians().is_empty());
    }

    #[test]
    fn books_are_recorded_by_every_librarian() {
        let diligent = Arc::new(DiligentLibrarian::default());
        let careless = Arc::new(CarelessLibrarian::default());
        let library = Library::with_librarians(
            repository("db=memory"),
            vec![careless.clone() as Arc<dyn Librarian>, diligent.clone() as Arc<dyn Librarian>],
        );

        assert_eq!(library.books().unwrap().len(), 3);
        assert_eq!(diligent.journal().len(), 3);
        assert_eq!(careless.journal().len(), 2);
    }

    #[test]
    fn repository_errors_surface() {
        let library = Library::new(repository(""));
        assert_eq!(library.books(), Err(LibraryError::BlankConnection));
    }

    #[test]
    fn logger_property_is_marked() {
        let properties = Library::properties();
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].info().name(), "logger");
        assert!(properties[0].info().has_marker(DEPENDENCY));
    }
}
