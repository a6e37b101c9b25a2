//! Librarians keep a journal of issued books.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tarkib::{Component, Constructor};
use tracing::info;

use crate::data_provider::Entity;

pub trait Librarian: Send + Sync {
    fn name(&self) -> &'static str;

    /// Notes that `book` was issued.
    fn record(&self, book: &Entity);

    /// Journal entries in the order they were written.
    fn journal(&self) -> Vec<String>;
}

fn entry(book: &Entity) -> String {
    format!("Book \"{book}\" was issued")
}

/// Records every book.
#[derive(Debug, Default)]
pub struct DiligentLibrarian {
    journal: Mutex<Vec<String>>,
}

tarkib::implements!(DiligentLibrarian => dyn Librarian);

impl Component for DiligentLibrarian {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new("new").build(|_| Ok(DiligentLibrarian::default()))]
    }
}

impl Librarian for DiligentLibrarian {
    fn name(&self) -> &'static str {
        "diligent"
    }

    fn record(&self, book: &Entity) {
        let line = entry(book);
        info!(librarian = self.name(), "{line}");
        self.journal.lock().push(line);
    }

    fn journal(&self) -> Vec<String> {
        self.journal.lock().clone()
    }
}

/// Is away from the desk for every other book.
#[derive(Debug, Default)]
pub struct CarelessLibrarian {
    seen: AtomicUsize,
    journal: Mutex<Vec<String>>,
}

tarkib::implements!(CarelessLibrarian => dyn Librarian);

impl Component for CarelessLibrarian {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new("new").build(|_| Ok(CarelessLibrarian::default()))]
    }
}

impl Librarian for CarelessLibrarian {
    fn name(&self) -> &'static str {
        "careless"
    }

    fn record(&self, book: &Entity) {
        if self.seen.fetch_add(1, Ordering::Relaxed) % 2 == 1 {
            return;
        }
        let line = entry(book);
        info!(librarian = self.name(), "{line}");
        self.journal.lock().push(line);
    }

    fn journal(&self) -> Vec<String> {
        self.journal.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(n: u8) -> Entity {
        Entity {
            name: format!("Book {n}"),
            kind: "Book".into(),
        }
    }

    #[test]
    fn diligent_records_everything() {
        let librarian = DiligentLibrarian::default();
        (1..=3).for_each(|n| librarian.record(&book(n)));

        assert_eq!(librarian.journal().len(), 3);
        assert_eq!(librarian.journal()[0], "Book \"Book 1 (Book)\" was issued");
    }

    #[test]
    fn careless_skips_every_other_book() {
        let librarian = CarelessLibrarian::default();
        (1..=3).for_each(|n| librarian.record(&book(n)));

        let journal = librarian.journal();
        assert_eq!(journal.len(), 2);
        assert!(journal[1].contains("Book 3"));
    }
}
