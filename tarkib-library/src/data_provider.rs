//! Data providers: where the library's records come from.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::debug;

use crate::error::LibraryError;

/// A stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub name: String,
    pub kind: String,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

/// Access to the backing store.
pub trait DataProvider: Send + Sync {
    /// Every entity of the given kind.
    fn entities(&self, kind: &str) -> Result<Vec<Entity>, LibraryError>;
}

/// Simulated database provider.
///
/// Needs a connection string, so it cannot be built from a constructor
/// table; register it through a factory.
#[derive(Debug)]
pub struct DbProvider {
    connection: String,
    queries: AtomicUsize,
}

impl DbProvider {
    pub fn new(connection: impl Into<String>) -> Self {
        Self {
            connection: connection.into(),
            queries: AtomicUsize::new(0),
        }
    }

    pub fn connection(&self) -> &str {
        &self.connection
    }

    /// Number of queries served so far.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn check_connection(&self) -> Result<(), LibraryError> {
        let connection = self.connection.trim();
        if connection.is_empty() {
            return Err(LibraryError::BlankConnection);
        }
        if !connection.contains('=') {
            return Err(LibraryError::MalformedConnection(self.connection.clone()));
        }
        Ok(())
    }
}

impl DataProvider for DbProvider {
    fn entities(&self, kind: &str) -> Result<Vec<Entity>, LibraryError> {
        self.check_connection()?;
        if kind.trim().is_empty() {
            return Err(LibraryError::BlankKind);
        }

        self.queries.fetch_add(1, Ordering::SeqCst);
        debug!(kind, connection = %self.connection, "Querying entities");

        Ok((1..=3)
            .map(|n| Entity {
                name: format!("{kind} {n}"),
                kind: kind.to_string(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_three_entities_of_kind() {
        let provider = DbProvider::new("server=none;db=none;");
        let books = provider.entities("Book").unwrap();

        assert_eq!(books.len(), 3);
        assert_eq!(books[0].to_string(), "Book 1 (Book)");
        assert!(books.iter().all(|b| b.kind == "Book"));
        assert_eq!(provider.queries(), 1);
    }

    #[test]
    fn rejects_blank_inputs() {
        assert_eq!(DbProvider::new("  ").entities("Book"), Err(LibraryError::BlankConnection));
        assert_eq!(DbProvider::new("db=x").entities(""), Err(LibraryError::BlankKind));
        assert_eq!(
            DbProvider::new("nonsense").entities("Book"),
            Err(LibraryError::MalformedConnection("nonsense".into()))
        );
    }
}
