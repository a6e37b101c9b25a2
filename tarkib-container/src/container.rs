//! # The Container — heart of Tarkib
//!
//! Holds every registration and builds object graphs on request.
//!
//! # Lifecycle
//! ```text
//! Container::new()
//!     │  register / register_factory / install      (&mut self, composition root)
//!     ▼
//! get_instance::<A>()                                (&self, any number of threads)
//!     │  latest producer for A
//!     ▼
//! Registration ── Singleton: cached after first build
//!     │        └─ Transient: built every time
//!     ▼
//! Activator ── constructor selection → recursive resolution → property injection
//! ```
//!
//! Registration needs `&mut Container` and resolution only `&Container`, so
//! the borrow checker keeps the two phases apart.
//!
//! # Examples
//! ```rust
//! use std::sync::Arc;
//! use tarkib_container::prelude::*;
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, msg: &str);
//! }
//!
//! struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!     fn log(&self, msg: &str) { println!("{msg}"); }
//! }
//! tarkib_container::implements!(ConsoleLogger => dyn Logger);
//!
//! impl Component for ConsoleLogger {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![Constructor::new("new").build(|_| Ok(ConsoleLogger))]
//!     }
//! }
//!
//! struct UserService {
//!     logger: Arc<dyn Logger>,
//! }
//!
//! impl Component for UserService {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![Constructor::new("new")
//!             .service::<dyn Logger>()
//!             .build(|args| Ok(UserService { logger: args.service::<dyn Logger>()? }))]
//!     }
//! }
//!
//! let mut container = Container::new();
//! container
//!     .register::<dyn Logger, ConsoleLogger>()
//!     .unwrap()
//!     .register_with::<UserService, UserService>(&Transient)
//!     .unwrap();
//!
//! let service = container.get_instance::<UserService>().unwrap();
//! service.logger.log("resolved");
//! ```

use std::fmt;
use std::sync::Arc;

use tarkib_support::rendering::closest_matches;
use tracing::{info, instrument, trace};

use crate::chain;
use crate::component::{Component, Upcast};
use crate::error::{NotRegisteredError, Result, TarkibError};
use crate::key::TypeKey;
use crate::lifestyle::{Lifestyle, Singleton, default_lifestyle};
use crate::module::Module;
use crate::options::ContainerOptions;
use crate::registration::{
    Activator, ComponentActivator, ComponentFactoryActivator, FactoryActivator, Instance, downcast,
};
use crate::registry::{InstanceProducer, Registry};

const MAX_SUGGESTIONS: usize = 3;

/// Registry of bindings plus the resolver that walks them.
///
/// Dropping the container drops every registration and every cached
/// singleton with it.
pub struct Container {
    registry: Registry,
    options: ContainerOptions,
}

impl Container {
    /// Creates an empty container with default options.
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default())
    }

    pub fn with_options(options: ContainerOptions) -> Self {
        Self {
            registry: Registry::new(),
            options,
        }
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.options
    }

    /// Options are read at resolution time; change them before the first
    /// resolution.
    pub fn options_mut(&mut self) -> &mut ContainerOptions {
        &mut self.options
    }

    // ── Registration ──

    /// Binds abstraction `A` to component `C` with the default lifestyle
    /// ([`Singleton`]).
    ///
    /// # Errors
    /// [`TarkibError::InvalidArgument`] if `C` declares no constructors.
    pub fn register<A, C>(&mut self) -> Result<&mut Self>
    where
        A: ?Sized + Send + Sync + 'static,
        C: Component + Upcast<A>,
    {
        self.register_with::<A, C>(default_lifestyle())
    }

    /// Binds abstraction `A` to component `C` with an explicit lifestyle.
    ///
    /// Registering `A` again is allowed: scalar resolution uses the newest
    /// binding, collection resolution sees all of them.
    pub fn register_with<A, C>(&mut self, lifestyle: &dyn Lifestyle) -> Result<&mut Self>
    where
        A: ?Sized + Send + Sync + 'static,
        C: Component + Upcast<A>,
    {
        let activator = ComponentActivator::<A, C>::new()?;
        self.add_producer::<A>(Box::new(activator), lifestyle)
    }

    /// Binds `A` to a factory closure with the default lifestyle.
    ///
    /// Use factories for types whose constructors need plain data such as
    /// connection strings.
    pub fn register_factory<A>(&mut self, factory: impl Fn() -> Arc<A> + Send + Sync + 'static) -> Result<&mut Self>
    where
        A: ?Sized + Send + Sync + 'static,
    {
        self.register_factory_with::<A>(factory, default_lifestyle())
    }

    /// Binds `A` to a factory closure with an explicit lifestyle.
    ///
    /// Factory results never receive property injection; see
    /// [`register_component_factory_with`](Self::register_component_factory_with).
    pub fn register_factory_with<A>(
        &mut self,
        factory: impl Fn() -> Arc<A> + Send + Sync + 'static,
        lifestyle: &dyn Lifestyle,
    ) -> Result<&mut Self>
    where
        A: ?Sized + Send + Sync + 'static,
    {
        self.add_producer::<A>(Box::new(FactoryActivator::new(factory)), lifestyle)
    }

    /// Binds `A` to a factory building the concrete component `C`, and
    /// applies the property-selection policy to every value it builds.
    pub fn register_component_factory_with<A, C>(
        &mut self,
        factory: impl Fn() -> C + Send + Sync + 'static,
        lifestyle: &dyn Lifestyle,
    ) -> Result<&mut Self>
    where
        A: ?Sized + Send + Sync + 'static,
        C: Component + Upcast<A>,
    {
        let activator = ComponentFactoryActivator::<A, C>::new(factory);
        self.add_producer::<A>(Box::new(activator), lifestyle)
    }

    /// Binds `A` to an already built value. Every resolution returns the
    /// same `Arc`.
    pub fn register_instance<A>(&mut self, instance: Arc<A>) -> Result<&mut Self>
    where
        A: ?Sized + Send + Sync + 'static,
    {
        self.register_factory_with::<A>(move || Arc::clone(&instance), &Singleton)
    }

    /// Lets a [`Module`] add its registrations.
    #[instrument(skip_all, fields(module = module.name()))]
    pub fn install(&mut self, module: &dyn Module) -> Result<&mut Self> {
        let before = self.registry.len();
        module.register(self)?;
        info!(added = self.registry.len() - before, "Module installed");
        Ok(self)
    }

    fn add_producer<A: ?Sized + 'static>(
        &mut self,
        activator: Box<dyn Activator>,
        lifestyle: &dyn Lifestyle,
    ) -> Result<&mut Self> {
        let produces = activator.produces();
        let registration = lifestyle.create_registration(activator)?;
        self.registry
            .push(InstanceProducer::new(TypeKey::of::<A>(), produces, registration));
        Ok(self)
    }

    // ── Resolution ──

    /// Resolves abstraction `A` with its whole dependency graph.
    ///
    /// ```rust,ignore
    /// let repository: Arc<dyn BookRepository> = container.get_instance()?;
    /// ```
    ///
    /// # Errors
    /// - [`TarkibError::NotRegistered`] if `A` was never registered
    /// - [`TarkibError::UnresolvableConstructor`] /
    ///   [`TarkibError::InvalidParameterType`] if a component in the graph
    ///   cannot be built
    /// - [`TarkibError::CircularDependency`] if the graph loops
    pub fn get_instance<A>(&self) -> Result<Arc<A>>
    where
        A: ?Sized + Send + Sync + 'static,
    {
        let key = TypeKey::of::<A>();
        let instance = self.get_instance_by_key(&key)?;
        downcast::<A>(key, &instance)
    }

    /// Resolves by key. The returned [`Instance`] wraps an `Arc<A>` for the
    /// abstraction `A` behind `key`.
    pub fn get_instance_by_key(&self, key: &TypeKey) -> Result<Instance> {
        let producer = self
            .registry
            .latest(key)
            .ok_or_else(|| self.not_registered(key))?;
        self.produce(producer)
    }

    /// Resolves every registration of `key`, most recent first.
    pub(crate) fn get_instances(&self, key: &TypeKey) -> Result<Vec<Instance>> {
        let producers: Vec<&InstanceProducer> = self.registry.newest_first(key).collect();
        if producers.is_empty() {
            return Err(self.not_registered(key));
        }
        producers
            .into_iter()
            .map(|producer| self.produce(producer))
            .collect()
    }

    pub(crate) fn is_registered(&self, key: &TypeKey) -> bool {
        self.registry.contains(key)
    }

    fn produce(&self, producer: &InstanceProducer) -> Result<Instance> {
        let abstraction = producer.abstraction();
        // A caching registration re-entered on the same thread would block on
        // its own initialization, so it is always checked.
        let detect = self.options.settings.detect_cycles || !producer.allows_reentry();
        let _guard = chain::enter(producer.id(), abstraction, detect)?;
        trace!(
            abstraction = %abstraction,
            produces = %producer.produces(),
            lifestyle = producer.lifestyle(),
            "Resolving"
        );
        producer.instance(self)
    }

    fn not_registered(&self, key: &TypeKey) -> TarkibError {
        let names = self.registry.abstraction_names();
        TarkibError::NotRegistered(NotRegisteredError {
            requested: *key,
            required_by: chain::current(),
            suggestions: closest_matches(key.type_name(), &names, MAX_SUGGESTIONS),
        })
    }

    // ── Introspection ──

    /// Number of registrations, counting repeated abstractions.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("registrations", &self.registry.len())
            .field("abstractions", &self.registry.abstraction_count())
            .field("options", &self.options)
            .finish()
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::Container;
    pub use crate::component::{Arguments, Component, Constructor, Property, PropertyInfo, Upcast};
    pub use crate::error::{Result, TarkibError};
    pub use crate::key::TypeKey;
    pub use crate::lifestyle::{Lifestyle, Singleton, Transient};
    pub use crate::module::Module;
    pub use crate::options::{
        ContainerOptions, MarkedProperties, ParameterValidation, PropertySelection,
        ResolutionSettings,
    };
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
