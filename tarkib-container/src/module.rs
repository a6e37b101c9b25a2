//! Module trait — a reusable group of registrations.
//!
//! Modules keep a composition root readable by splitting registrations by
//! concern:
//!
//! ```rust,ignore
//! container
//!     .install(&StorageModule)?
//!     .install(&LoggingModule)?
//!     .install(&LibraryModule)?;
//! ```

use crate::container::Container;
use crate::error::Result;

/// Registers a related set of bindings into a container.
pub trait Module {
    /// Called once by [`Container::install`].
    fn register(&self, container: &mut Container) -> Result<()>;

    /// Human-readable name for logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
