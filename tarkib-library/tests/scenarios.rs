use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

use tarkib::prelude::*;
use tarkib_library::data_provider::{DataProvider, DbProvider};
use tarkib_library::librarian::{CarelessLibrarian, DiligentLibrarian, Librarian};
use tarkib_library::logging::{ConsoleLogger, Logger};
use tarkib_library::repository::{BookRepository, CachingBookRepository};
use tarkib_library::selection::dependency_properties;
use tarkib_library::service::{Library, LibraryService};
use tarkib_library::{LibraryError, LibraryModule};

const CONNECTION: &str = "server=none;db=none;";

fn provider() -> Arc<dyn DataProvider> {
    Arc::new(DbProvider::new(CONNECTION))
}

#[test]
fn singleton_repository_shares_its_cache() {
    let mut container = Container::new();
    container
        .register_with::<dyn BookRepository, CachingBookRepository>(&Singleton)
        .unwrap()
        .register_factory_with::<dyn DataProvider>(provider, &Singleton)
        .unwrap();

    let repository = container.get_instance::<dyn BookRepository>().unwrap();
    let books = repository.books(false).unwrap();

    let again = container.get_instance::<dyn BookRepository>().unwrap();
    assert!(Arc::ptr_eq(&repository, &again));
    assert_eq!(again.cached_books(), Some(books));
}

#[test]
fn transient_repository_starts_empty() {
    let mut container = Container::new();
    container
        .register_with::<dyn BookRepository, CachingBookRepository>(&Transient)
        .unwrap()
        .register_factory_with::<dyn DataProvider>(provider, &Transient)
        .unwrap();

    let repository = container.get_instance::<dyn BookRepository>().unwrap();
    repository.books(false).unwrap();

    let other = container.get_instance::<dyn BookRepository>().unwrap();
    assert!(!Arc::ptr_eq(&repository, &other));
    assert!(other.cached_books().is_none());
}

#[test]
fn librarians_are_injected_newest_first() {
    let mut container = Container::new();
    container
        .register::<dyn LibraryService, Library>()
        .unwrap()
        .register::<dyn BookRepository, CachingBookRepository>()
        .unwrap()
        .register::<dyn Logger, ConsoleLogger>()
        .unwrap()
        .register_factory::<dyn DataProvider>(provider)
        .unwrap()
        .register::<dyn Librarian, DiligentLibrarian>()
        .unwrap()
        .register::<dyn Librarian, CarelessLibrarian>()
        .unwrap();

    let library = container.get_instance::<dyn LibraryService>().unwrap();
    let names: Vec<_> = library.librarians().iter().map(|l| l.name()).collect();
    assert_eq!(names, vec!["careless", "diligent"]);

    library.books().unwrap();
    assert_eq!(library.librarians()[0].journal().len(), 2);
    assert_eq!(library.librarians()[1].journal().len(), 3);
}

#[test]
fn missing_data_provider_is_unresolvable() {
    let mut container = Container::new();
    container
        .register::<dyn BookRepository, CachingBookRepository>()
        .unwrap();

    match container.get_instance::<dyn BookRepository>() {
        Err(TarkibError::UnresolvableConstructor(err)) => {
            assert_eq!(err.concrete, TypeKey::of::<CachingBookRepository>());
            assert_eq!(err.rejected.len(), 1);
            assert_eq!(err.rejected[0].missing, TypeKey::of::<dyn DataProvider>());
        }
        Err(other) => panic!("Expected UnresolvableConstructor, got: {other:?}"),
        Ok(_) => panic!("Expected UnresolvableConstructor, got a repository"),
    }
}

#[test]
fn never_registered_service_is_not_registered() {
    let container = Container::new();
    assert!(matches!(
        container.get_instance::<dyn LibraryService>(),
        Err(TarkibError::NotRegistered(_))
    ));
}

#[test]
fn singleton_factory_runs_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut container = Container::new();
    container
        .register_factory_with::<dyn DataProvider>(
            {
                let calls = calls.clone();
                move || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    provider()
                }
            },
            &Singleton,
        )
        .unwrap()
        .register_with::<dyn BookRepository, CachingBookRepository>(&Transient)
        .unwrap();

    container.get_instance::<dyn BookRepository>().unwrap();
    container.get_instance::<dyn BookRepository>().unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn marked_logger_property_is_injected() {
    let options = ContainerOptions::default().with_property_selection(dependency_properties());
    let mut container = Container::with_options(options);
    container
        .register::<dyn LibraryService, Library>()
        .unwrap()
        .register::<dyn BookRepository, CachingBookRepository>()
        .unwrap()
        .register::<dyn Logger, ConsoleLogger>()
        .unwrap()
        .register_factory::<dyn DataProvider>(provider)
        .unwrap();

    let library = container.get_instance::<dyn LibraryService>().unwrap();
    assert_eq!(library.logger().name(), "console");
    assert!(library.librarians().is_empty());
}

#[test]
fn logger_keeps_default_without_policy() {
    let mut container = Container::new();
    container.install(&LibraryModule::new(CONNECTION)).unwrap();

    let library = container.get_instance::<dyn LibraryService>().unwrap();
    assert_eq!(library.logger().name(), "forgetful");
}

#[test]
fn module_wires_the_whole_library() {
    let options = ContainerOptions::default().with_property_selection(dependency_properties());
    let mut container = Container::with_options(options);
    container.install(&LibraryModule::new(CONNECTION)).unwrap();
    assert_eq!(container.len(), 6);

    let first = container.get_instance::<dyn LibraryService>().unwrap();
    let second = container.get_instance::<dyn LibraryService>().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first.librarians()[0], &second.librarians()[0]));

    let books = first.books().unwrap();
    assert_eq!(books.len(), 3);
    assert_eq!(first.logger().name(), "console");
}

#[test]
fn provider_errors_reach_the_caller() {
    let mut container = Container::new();
    container.install(&LibraryModule::new("")).unwrap();

    let library = container.get_instance::<dyn LibraryService>().unwrap();
    assert_eq!(library.books(), Err(LibraryError::BlankConnection));
}

#[test]
fn concurrent_resolution_builds_one_repository() {
    static BUILT: AtomicUsize = AtomicUsize::new(0);

    let mut container = Container::new();
    container
        .register_factory::<dyn DataProvider>(|| {
            BUILT.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(10));
            provider()
        })
        .unwrap()
        .register::<dyn BookRepository, CachingBookRepository>()
        .unwrap();

    const THREADS: usize = 8;
    let barrier = Barrier::new(THREADS);
    let repositories: Vec<Arc<dyn BookRepository>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    container.get_instance::<dyn BookRepository>().unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(BUILT.load(Ordering::SeqCst), 1);
    assert!(repositories.iter().all(|r| Arc::ptr_eq(r, &repositories[0])));
}

/// Catalog with a titled overload the container cannot fill on its own.
struct Catalog {
    repository: Arc<dyn BookRepository>,
    title: String,
}

impl Component for Catalog {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![
            Constructor::new("new").service::<dyn BookRepository>().build(|args| {
                Ok(Catalog {
                    repository: args.service::<dyn BookRepository>()?,
                    title: "Untitled".into(),
                })
            }),
            Constructor::new("titled")
                .service::<dyn BookRepository>()
                .service::<String>()
                .build(|args| {
                    let repository = args.service::<dyn BookRepository>()?;
                    let title = args.service::<String>()?;
                    Ok(Catalog {
                        repository,
                        title: title.to_string(),
                    })
                }),
        ]
    }
}

fn catalog_container(settings: ResolutionSettings) -> Container {
    let mut container = Container::with_options(ContainerOptions::default().with_settings(settings));
    container
        .install(&LibraryModule::new(CONNECTION))
        .unwrap()
        .register::<Catalog, Catalog>()
        .unwrap();
    container
}

#[test]
fn eager_settings_reject_titled_catalog() {
    let container = catalog_container(ResolutionSettings::default());

    match container.get_instance::<Catalog>() {
        Err(TarkibError::InvalidParameterType(err)) => {
            assert_eq!(err.concrete, TypeKey::of::<Catalog>());
            assert_eq!(err.constructor, "titled");
            assert_eq!(err.parameter, TypeKey::of::<String>());
        }
        Err(other) => panic!("Expected InvalidParameterType, got: {other:?}"),
        Ok(_) => panic!("Expected InvalidParameterType, got a catalog"),
    }
}

#[test]
fn lenient_settings_from_json() {
    let settings: ResolutionSettings =
        serde_json::from_str(r#"{ "parameter_validation": "lenient" }"#).unwrap();
    let container = catalog_container(settings);

    assert_eq!(
        container.options().settings.parameter_validation,
        ParameterValidation::Lenient
    );
    let catalog = container.get_instance::<Catalog>().unwrap();
    assert_eq!(catalog.title, "Untitled");
    assert!(catalog.repository.books(false).is_ok());
}
