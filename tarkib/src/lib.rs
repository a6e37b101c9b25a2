//! # Tarkib — Dependency Injection Container for Rust
//!
//! Register abstractions against concrete components once, then ask the
//! container for fully wired object graphs.
//!
//! ```rust
//! use std::sync::Arc;
//! use tarkib::prelude::*;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//! impl Greeter for English {
//!     fn greet(&self) -> String { "hello".into() }
//! }
//! tarkib::implements!(English => dyn Greeter);
//!
//! impl Component for English {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![Constructor::new("new").build(|_| Ok(English))]
//!     }
//! }
//!
//! let mut container = Container::new();
//! container.register::<dyn Greeter, English>().unwrap();
//!
//! let greeter: Arc<dyn Greeter> = container.get_instance().unwrap();
//! assert_eq!(greeter.greet(), "hello");
//! ```

pub use tarkib_container::*;
pub use tarkib_support::*;
