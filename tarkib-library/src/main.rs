//! Console harness: wires the library and issues its books.
//!
//! Environment:
//! - `RUST_LOG` overrides the log filter
//! - `TARKIB_SETTINGS` holds resolution settings as JSON, e.g.
//!   `{"parameter_validation":"lenient"}`
//! - `LIBRARY_CONNECTION` replaces the demo connection string

use std::error::Error;
use std::sync::Arc;

use tarkib::{Container, ContainerOptions, ResolutionSettings};
use tarkib_library::LibraryModule;
use tarkib_library::selection::dependency_properties;
use tarkib_library::service::LibraryService;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "tarkib=debug,tarkib_container=debug,tarkib_library=info";
const DEFAULT_CONNECTION: &str = "server=none;db=none;";

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}

fn settings() -> Result<ResolutionSettings, serde_json::Error> {
    match std::env::var("TARKIB_SETTINGS") {
        Ok(raw) => serde_json::from_str(&raw),
        Err(_) => Ok(ResolutionSettings::default()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();

    let options = ContainerOptions::default()
        .with_property_selection(dependency_properties())
        .with_settings(settings()?);
    let connection = std::env::var("LIBRARY_CONNECTION").unwrap_or_else(|_| DEFAULT_CONNECTION.to_string());

    let mut container = Container::with_options(options);
    container.install(&LibraryModule::new(connection))?;
    info!(?container, "Container ready");

    let library: Arc<dyn LibraryService> = container.get_instance()?;
    info!(logger = library.logger().name(), librarians = library.librarians().len(), "Library resolved");

    for book in library.books()? {
        println!("{book}");
    }
    for librarian in library.librarians() {
        println!("{} journal: {} entries", librarian.name(), librarian.journal().len());
    }
    Ok(())
}
