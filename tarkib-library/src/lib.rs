//! Library demo for Tarkib.
//!
//! A small library domain wired by the container: a data provider behind a
//! caching repository, a service with two constructors, librarians resolved
//! as a collection and a logger injected as a property.

pub mod data_provider;
pub mod error;
pub mod librarian;
pub mod logging;
pub mod module;
pub mod repository;
pub mod selection;
pub mod service;

pub use error::LibraryError;
pub use module::LibraryModule;
