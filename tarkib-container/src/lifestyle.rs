//! Lifestyles — how many instances a registration may produce.
//!
//! A lifestyle is a stateless factory picking the [`Registration`]
//! variant for a binding:
//! - [`Singleton`] — one instance for the lifetime of the container
//! - [`Transient`] — a new instance on every resolution
//!
//! Implement [`Lifestyle`] to add your own.

use std::fmt;

use crate::error::Result;
use crate::registration::{Activator, Registration, SingletonRegistration, TransientRegistration};

/// Chooses the registration variant for a binding.
pub trait Lifestyle: Send + Sync {
    /// Name shown in logs.
    fn name(&self) -> &'static str;

    /// Wraps a construction strategy in a registration.
    ///
    /// # Errors
    /// A lifestyle may refuse an activator with
    /// [`TarkibError::InvalidArgument`](crate::error::TarkibError::InvalidArgument).
    fn create_registration(&self, activator: Box<dyn Activator>) -> Result<Box<dyn Registration>>;
}

/// One shared instance, created on first resolution and kept until the
/// container is dropped.
///
/// # When to use
/// - Data providers and connection pools
/// - Repositories holding caches
/// - Loggers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Singleton;

impl Lifestyle for Singleton {
    fn name(&self) -> &'static str {
        "Singleton"
    }

    fn create_registration(&self, activator: Box<dyn Activator>) -> Result<Box<dyn Registration>> {
        Ok(Box::new(SingletonRegistration::new(activator)))
    }
}

/// A fresh instance, with a freshly resolved dependency graph, on every
/// resolution.
///
/// # When to use
/// - Stateful helpers that must not be shared
/// - Per-request services
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transient;

impl Lifestyle for Transient {
    fn name(&self) -> &'static str {
        "Transient"
    }

    fn create_registration(&self, activator: Box<dyn Activator>) -> Result<Box<dyn Registration>> {
        Ok(Box::new(TransientRegistration::new(activator)))
    }
}

/// Lifestyle used when a registration does not name one.
pub fn default_lifestyle() -> &'static dyn Lifestyle {
    &Singleton
}

impl fmt::Debug for dyn Lifestyle + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lifestyle({})", self.name())
    }
}
