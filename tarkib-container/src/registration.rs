//! Registrations — how and how often an abstraction is built.
//!
//! A [`Registration`] owns an [`Activator`] (the construction strategy)
//! and decides how often to run it:
//! - [`SingletonRegistration`] runs it once and caches the result
//! - [`TransientRegistration`] runs it on every resolution
//!
//! The constructor-resolution algorithm lives in the component activator:
//! candidates are tried from the most parameters to the fewest, the first
//! one whose parameters are all registered wins, its arguments are resolved
//! recursively through the container, and selected properties are injected
//! afterwards.

use std::any::Any;
use std::cmp::Reverse;
use std::marker::PhantomData;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, trace, warn};

use crate::component::{
    Argument, Arguments, BuildError, Component, Constructor, ParameterShape, Property, Upcast,
};
use crate::container::Container;
use crate::error::{
    InvalidParameterTypeError, RejectedConstructor, Result, TarkibError,
    UnresolvableConstructorError,
};
use crate::key::TypeKey;
use crate::options::ParameterValidation;

/// Type-erased resolved value.
///
/// For an abstraction `A` the value inside is always an `Arc<A>`; use
/// [`downcast`] to get it back.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Recovers the `Arc<A>` stored in an [`Instance`].
///
/// `key` names the type the instance was produced for and only feeds the
/// error message.
pub fn downcast<A: ?Sized + Send + Sync + 'static>(key: TypeKey, instance: &Instance) -> Result<Arc<A>> {
    (**instance)
        .downcast_ref::<Arc<A>>()
        .cloned()
        .ok_or_else(|| {
            TarkibError::construction(
                key,
                format!("type mismatch: expected {}", std::any::type_name::<Arc<A>>()),
            )
        })
}

fn erase<A: ?Sized + Send + Sync + 'static>(value: Arc<A>) -> Instance {
    Arc::new(value)
}

/// A construction strategy: builds one fresh instance per call.
pub trait Activator: Send + Sync {
    /// The type this activator builds; the concrete type for components,
    /// the abstraction for plain factories.
    fn produces(&self) -> TypeKey;

    fn activate(&self, container: &Container) -> Result<Instance>;
}

/// Lifecycle wrapper around an [`Activator`].
pub trait Registration: Send + Sync {
    /// Name of the lifestyle that created this registration.
    fn lifestyle(&self) -> &'static str;

    fn instance(&self, container: &Container) -> Result<Instance>;

    /// Whether resolution may run this registration again while it is still
    /// building. Registrations that cache their instance return `false`:
    /// re-entering them would block on their own initialization.
    fn allows_reentry(&self) -> bool {
        true
    }
}

// ═══════════════════════════════════════════
// Lifecycles
// ═══════════════════════════════════════════

/// Builds its instance once, then serves the cached value.
///
/// Concurrent first resolutions block until the winner finishes and then
/// all observe the same instance. A failed construction is not cached.
pub struct SingletonRegistration {
    activator: Box<dyn Activator>,
    instance: OnceCell<Instance>,
}

impl SingletonRegistration {
    pub fn new(activator: Box<dyn Activator>) -> Self {
        Self {
            activator,
            instance: OnceCell::new(),
        }
    }

    /// Returns `true` once the instance has been built.
    pub fn is_ready(&self) -> bool {
        self.instance.get().is_some()
    }
}

impl Registration for SingletonRegistration {
    fn lifestyle(&self) -> &'static str {
        "Singleton"
    }

    fn allows_reentry(&self) -> bool {
        false
    }

    fn instance(&self, container: &Container) -> Result<Instance> {
        let instance = self.instance.get_or_try_init(|| {
            let built = self.activator.activate(container)?;
            debug!(produces = %self.activator.produces(), "Singleton constructed");
            Ok::<_, TarkibError>(built)
        })?;
        Ok(Arc::clone(instance))
    }
}

/// Builds a new instance on every resolution.
pub struct TransientRegistration {
    activator: Box<dyn Activator>,
}

impl TransientRegistration {
    pub fn new(activator: Box<dyn Activator>) -> Self {
        Self { activator }
    }
}

impl Registration for TransientRegistration {
    fn lifestyle(&self) -> &'static str {
        "Transient"
    }

    fn instance(&self, container: &Container) -> Result<Instance> {
        self.activator.activate(container)
    }
}

// ═══════════════════════════════════════════
// Activators
// ═══════════════════════════════════════════

/// Builds a [`Component`] through its constructor table.
pub(crate) struct ComponentActivator<A: ?Sized, C> {
    concrete: TypeKey,
    constructors: Vec<Constructor<C>>,
    properties: Vec<Property<C>>,
    _abstraction: PhantomData<fn() -> Arc<A>>,
}

impl<A, C> ComponentActivator<A, C>
where
    A: ?Sized + Send + Sync + 'static,
    C: Component + Upcast<A>,
{
    pub(crate) fn new() -> Result<Self> {
        let concrete = TypeKey::of::<C>();
        let mut constructors = C::constructors();
        if constructors.is_empty() {
            return Err(TarkibError::InvalidArgument {
                argument: "constructors",
                reason: format!("{concrete} declares no constructors"),
            });
        }
        // Stable: equal arities keep declaration order.
        constructors.sort_by_key(|constructor| Reverse(constructor.arity()));

        Ok(Self {
            concrete,
            constructors,
            properties: C::properties(),
            _abstraction: PhantomData,
        })
    }

    fn select(&self, container: &Container) -> Result<&Constructor<C>> {
        let validation = container.options().settings.parameter_validation;
        let mut rejected = Vec::new();
        let mut plain_data: Option<InvalidParameterTypeError> = None;

        'candidates: for constructor in &self.constructors {
            for parameter in constructor.parameters() {
                let key = parameter.key();

                if key.is_plain_data() {
                    let error = InvalidParameterTypeError {
                        concrete: self.concrete,
                        constructor: constructor.name(),
                        parameter: key,
                    };
                    match validation {
                        ParameterValidation::Eager => {
                            return Err(TarkibError::InvalidParameterType(error));
                        }
                        ParameterValidation::Lenient => {
                            trace!(
                                concrete = %self.concrete,
                                constructor = constructor.name(),
                                parameter = %key,
                                "Skipping constructor with plain-data parameter"
                            );
                            if plain_data.is_none() {
                                plain_data = Some(error);
                            }
                            continue 'candidates;
                        }
                    }
                }

                if !container.is_registered(&key) {
                    trace!(
                        concrete = %self.concrete,
                        constructor = constructor.name(),
                        missing = %key,
                        "Constructor candidate rejected"
                    );
                    rejected.push(RejectedConstructor {
                        constructor: constructor.name(),
                        missing: key,
                    });
                    continue 'candidates;
                }
            }

            trace!(
                concrete = %self.concrete,
                constructor = constructor.name(),
                arity = constructor.arity(),
                "Constructor selected"
            );
            return Ok(constructor);
        }

        if let Some(error) = plain_data {
            return Err(TarkibError::InvalidParameterType(error));
        }

        warn!(concrete = %self.concrete, candidates = self.constructors.len(), "No constructor can be satisfied");
        Err(TarkibError::UnresolvableConstructor(UnresolvableConstructorError {
            concrete: self.concrete,
            rejected,
        }))
    }

    fn resolve_arguments(&self, constructor: &Constructor<C>, container: &Container) -> Result<Arguments> {
        let values = constructor
            .parameters()
            .iter()
            .map(|parameter| {
                let argument = match parameter.shape() {
                    ParameterShape::Single => {
                        Argument::Single(container.get_instance_by_key(&parameter.key())?)
                    }
                    ParameterShape::Collection => {
                        Argument::Collection(container.get_instances(&parameter.key())?)
                    }
                };
                Ok((*parameter, argument))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Arguments::new(self.concrete, constructor.name(), values))
    }
}

impl<A, C> Activator for ComponentActivator<A, C>
where
    A: ?Sized + Send + Sync + 'static,
    C: Component + Upcast<A>,
{
    fn produces(&self) -> TypeKey {
        self.concrete
    }

    fn activate(&self, container: &Container) -> Result<Instance> {
        let constructor = self.select(container)?;
        let mut arguments = self.resolve_arguments(constructor, container)?;
        let mut component = constructor
            .invoke(&mut arguments)
            .map_err(|source| build_failure(self.concrete, source))?;

        inject_properties(self.concrete, &self.properties, &mut component, container)?;
        Ok(erase::<A>(Arc::new(component).upcast()))
    }
}

/// Wraps a factory closure that returns the abstraction directly.
pub(crate) struct FactoryActivator<A: ?Sized> {
    factory: Box<dyn Fn() -> Arc<A> + Send + Sync>,
}

impl<A: ?Sized + Send + Sync + 'static> FactoryActivator<A> {
    pub(crate) fn new(factory: impl Fn() -> Arc<A> + Send + Sync + 'static) -> Self {
        Self {
            factory: Box::new(factory),
        }
    }
}

impl<A: ?Sized + Send + Sync + 'static> Activator for FactoryActivator<A> {
    fn produces(&self) -> TypeKey {
        TypeKey::of::<A>()
    }

    fn activate(&self, _container: &Container) -> Result<Instance> {
        Ok(erase::<A>((self.factory)()))
    }
}

/// Wraps a factory closure returning a concrete [`Component`], so the
/// property-selection policy still applies to what it builds.
pub(crate) struct ComponentFactoryActivator<A: ?Sized, C> {
    concrete: TypeKey,
    factory: Box<dyn Fn() -> C + Send + Sync>,
    properties: Vec<Property<C>>,
    _abstraction: PhantomData<fn() -> Arc<A>>,
}

impl<A, C> ComponentFactoryActivator<A, C>
where
    A: ?Sized + Send + Sync + 'static,
    C: Component + Upcast<A>,
{
    pub(crate) fn new(factory: impl Fn() -> C + Send + Sync + 'static) -> Self {
        Self {
            concrete: TypeKey::of::<C>(),
            factory: Box::new(factory),
            properties: C::properties(),
            _abstraction: PhantomData,
        }
    }
}

impl<A, C> Activator for ComponentFactoryActivator<A, C>
where
    A: ?Sized + Send + Sync + 'static,
    C: Component + Upcast<A>,
{
    fn produces(&self) -> TypeKey {
        self.concrete
    }

    fn activate(&self, container: &Container) -> Result<Instance> {
        let mut component = (self.factory)();
        inject_properties(self.concrete, &self.properties, &mut component, container)?;
        Ok(erase::<A>(Arc::new(component).upcast()))
    }
}

fn inject_properties<C>(
    concrete: TypeKey,
    properties: &[Property<C>],
    target: &mut C,
    container: &Container,
) -> Result<()>
where
    C: 'static,
{
    let Some(policy) = container.options().property_selection() else {
        return Ok(());
    };

    for property in properties {
        let info = property.info();
        if !policy.select_property(&concrete, info) {
            continue;
        }
        let value = container.get_instance_by_key(&info.key())?;
        property.inject(target, &value)?;
        debug!(concrete = %concrete, property = info.name(), "Property injected");
    }
    Ok(())
}

/// Resolution errors pass through, anything else names the concrete type.
fn build_failure(concrete: TypeKey, source: BuildError) -> TarkibError {
    match source.downcast::<TarkibError>() {
        Ok(inner) => *inner,
        Err(other) => TarkibError::ConstructionFailed {
            key: concrete,
            source: other,
        },
    }
}
