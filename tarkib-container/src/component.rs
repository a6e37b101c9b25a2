//! Construction tables for concrete types.
//!
//! The container never inspects types at runtime. Instead every concrete
//! type implements [`Component`] and lists its constructors and injectable
//! properties once; the resolution algorithm works from that table.
//!
//! # Examples
//! ```rust
//! use std::sync::Arc;
//! use tarkib_container::component::{Component, Constructor, Property};
//! use tarkib_container::implements;
//!
//! trait Clock: Send + Sync {}
//! trait Audit: Send + Sync {}
//!
//! struct Scheduler {
//!     clock: Arc<dyn Clock>,
//!     audits: Vec<Arc<dyn Audit>>,
//!     fallback: Option<Arc<dyn Clock>>,
//! }
//!
//! impl Component for Scheduler {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![
//!             Constructor::new("new")
//!                 .service::<dyn Clock>()
//!                 .build(|args| Ok(Scheduler {
//!                     clock: args.service::<dyn Clock>()?,
//!                     audits: Vec::new(),
//!                     fallback: None,
//!                 })),
//!             Constructor::new("with_audits")
//!                 .service::<dyn Clock>()
//!                 .collection::<dyn Audit>()
//!                 .build(|args| Ok(Scheduler {
//!                     clock: args.service::<dyn Clock>()?,
//!                     audits: args.services::<dyn Audit>()?,
//!                     fallback: None,
//!                 })),
//!         ]
//!     }
//!
//!     fn properties() -> Vec<Property<Self>> {
//!         vec![Property::new::<dyn Clock>("fallback", |s: &mut Scheduler, clock| {
//!             s.fallback = Some(clock);
//!         })
//!         .marked("inject")]
//!     }
//! }
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{Result, TarkibError};
use crate::key::TypeKey;
use crate::registration::{Instance, downcast};

/// Error type returned by constructor closures.
///
/// Resolution errors raised through [`Arguments`] pass through unchanged;
/// anything else is reported as [`TarkibError::ConstructionFailed`].
pub type BuildError = Box<dyn std::error::Error + Send + Sync>;

/// A concrete type the container knows how to build.
pub trait Component: Sized + Send + Sync + 'static {
    /// Every way of constructing this type.
    ///
    /// Called once, when the type is registered. Order does not matter:
    /// candidates are tried from the most parameters to the fewest.
    fn constructors() -> Vec<Constructor<Self>>;

    /// Properties that a property-selection policy may choose to inject.
    fn properties() -> Vec<Property<Self>> {
        Vec::new()
    }
}

/// Turns a shared concrete value into the abstraction it is registered for.
///
/// Every type upcasts to itself. Use [`implements!`](crate::implements)
/// for trait-object abstractions.
pub trait Upcast<A: ?Sized> {
    fn upcast(self: Arc<Self>) -> Arc<A>;
}

impl<T: Send + Sync + 'static> Upcast<T> for T {
    fn upcast(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// Declares which trait objects a concrete type may be registered for.
///
/// ```rust
/// use tarkib_container::implements;
///
/// trait Logger: Send + Sync {}
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {}
///
/// implements!(ConsoleLogger => dyn Logger);
/// ```
#[macro_export]
macro_rules! implements {
    ($concrete:ty => $($abstraction:ty),+ $(,)?) => {
        $(
            impl $crate::component::Upcast<$abstraction> for $concrete {
                fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$abstraction> {
                    self
                }
            }
        )+
    };
}

/// How a constructor parameter is satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterShape {
    /// One instance of the parameter type.
    Single,
    /// Every registered instance of the element type, newest first.
    Collection,
}

/// A declared constructor parameter.
#[derive(Debug, Clone, Copy)]
pub struct Parameter {
    key: TypeKey,
    shape: ParameterShape,
}

impl Parameter {
    /// The parameter type, or the element type of a collection.
    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn shape(&self) -> ParameterShape {
        self.shape
    }
}

type BuildFn<C> = Box<dyn Fn(&mut Arguments) -> std::result::Result<C, BuildError> + Send + Sync>;

/// One way of constructing `C`: its parameters plus the closure that
/// consumes them.
pub struct Constructor<C> {
    name: &'static str,
    parameters: Vec<Parameter>,
    build: BuildFn<C>,
}

impl<C> Constructor<C> {
    /// Starts describing a constructor. The name only shows up in errors
    /// and logs.
    pub fn new(name: &'static str) -> ConstructorBuilder<C> {
        ConstructorBuilder {
            name,
            parameters: Vec::new(),
            _component: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub(crate) fn invoke(&self, arguments: &mut Arguments) -> std::result::Result<C, BuildError> {
        (self.build)(arguments)
    }
}

impl<C> fmt::Debug for Constructor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Builder returned by [`Constructor::new`].
pub struct ConstructorBuilder<C> {
    name: &'static str,
    parameters: Vec<Parameter>,
    _component: PhantomData<fn() -> C>,
}

impl<C> ConstructorBuilder<C> {
    /// Adds a parameter resolved as a single `Arc<A>`.
    pub fn service<A: ?Sized + 'static>(mut self) -> Self {
        self.parameters.push(Parameter {
            key: TypeKey::of::<A>(),
            shape: ParameterShape::Single,
        });
        self
    }

    /// Adds a parameter resolved as `Vec<Arc<A>>` holding every registration
    /// of `A`.
    pub fn collection<A: ?Sized + 'static>(mut self) -> Self {
        self.parameters.push(Parameter {
            key: TypeKey::of::<A>(),
            shape: ParameterShape::Collection,
        });
        self
    }

    /// Finishes the constructor. `build` must read the arguments in the
    /// order they were declared.
    pub fn build<F>(self, build: F) -> Constructor<C>
    where
        F: Fn(&mut Arguments) -> std::result::Result<C, BuildError> + Send + Sync + 'static,
    {
        Constructor {
            name: self.name,
            parameters: self.parameters,
            build: Box::new(build),
        }
    }
}

pub(crate) enum Argument {
    Single(Instance),
    Collection(Vec<Instance>),
}

/// Resolved constructor arguments, handed out in declaration order.
pub struct Arguments {
    concrete: TypeKey,
    constructor: &'static str,
    values: std::vec::IntoIter<(Parameter, Argument)>,
}

impl Arguments {
    pub(crate) fn new(
        concrete: TypeKey,
        constructor: &'static str,
        values: Vec<(Parameter, Argument)>,
    ) -> Self {
        Self {
            concrete,
            constructor,
            values: values.into_iter(),
        }
    }

    /// Takes the next argument, declared with
    /// [`service`](ConstructorBuilder::service).
    pub fn service<A: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Arc<A>> {
        match self.next_argument()? {
            (parameter, Argument::Single(instance)) => downcast::<A>(parameter.key, &instance),
            (parameter, Argument::Collection(_)) => Err(self.misuse(format!(
                "argument {} is a collection, read it with services()",
                parameter.key
            ))),
        }
    }

    /// Takes the next argument, declared with
    /// [`collection`](ConstructorBuilder::collection).
    pub fn services<A: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Vec<Arc<A>>> {
        match self.next_argument()? {
            (parameter, Argument::Collection(instances)) => instances
                .iter()
                .map(|instance| downcast::<A>(parameter.key, instance))
                .collect(),
            (parameter, Argument::Single(_)) => Err(self.misuse(format!(
                "argument {} is a single service, read it with service()",
                parameter.key
            ))),
        }
    }

    /// Arguments not consumed yet.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    fn next_argument(&mut self) -> Result<(Parameter, Argument)> {
        match self.values.next() {
            Some(value) => Ok(value),
            None => Err(self.misuse("read more arguments than were declared".to_string())),
        }
    }

    fn misuse(&self, reason: String) -> TarkibError {
        TarkibError::construction(
            self.concrete,
            format!("constructor `{}`: {reason}", self.constructor),
        )
    }
}

/// Describes an injectable property to the property-selection policy.
#[derive(Debug, Clone)]
pub struct PropertyInfo {
    name: &'static str,
    key: TypeKey,
    markers: Vec<&'static str>,
}

impl PropertyInfo {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared type of the property; this is what gets resolved.
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Application-defined markers attached with [`Property::marked`].
    pub fn markers(&self) -> &[&'static str] {
        &self.markers
    }

    pub fn has_marker(&self, marker: &str) -> bool {
        self.markers.iter().any(|m| *m == marker)
    }
}

type AssignFn<C> = Box<dyn Fn(&mut C, &Instance) -> Result<()> + Send + Sync>;

/// A settable property of `C` the container may overwrite after
/// construction.
pub struct Property<C> {
    info: PropertyInfo,
    assign: AssignFn<C>,
}

impl<C: 'static> Property<C> {
    /// Declares a property of type `Arc<D>` and how to store it.
    pub fn new<D>(name: &'static str, assign: impl Fn(&mut C, Arc<D>) + Send + Sync + 'static) -> Self
    where
        D: ?Sized + Send + Sync + 'static,
    {
        let key = TypeKey::of::<D>();
        Self {
            info: PropertyInfo {
                name,
                key,
                markers: Vec::new(),
            },
            assign: Box::new(move |target, instance| {
                assign(target, downcast::<D>(key, instance)?);
                Ok(())
            }),
        }
    }

    /// Attaches a marker the selection policy can look for.
    pub fn marked(mut self, marker: &'static str) -> Self {
        self.info.markers.push(marker);
        self
    }

    pub fn info(&self) -> &PropertyInfo {
        &self.info
    }

    pub(crate) fn inject(&self, target: &mut C, value: &Instance) -> Result<()> {
        (self.assign)(target, value)
    }
}

impl<C> fmt::Debug for Property<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property").field("info", &self.info).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Journal: Send + Sync {
        fn pages(&self) -> usize;
    }

    struct PaperJournal(usize);

    impl Journal for PaperJournal {
        fn pages(&self) -> usize {
            self.0
        }
    }

    crate::implements!(PaperJournal => dyn Journal);

    struct Desk {
        journals: Vec<Arc<dyn Journal>>,
        spare: Option<Arc<dyn Journal>>,
    }

    fn erased(journal: PaperJournal) -> Instance {
        let shared: Arc<dyn Journal> = Arc::new(journal).upcast();
        Arc::new(shared)
    }

    fn single(instance: Instance) -> (Parameter, Argument) {
        let parameter = Parameter {
            key: TypeKey::of::<dyn Journal>(),
            shape: ParameterShape::Single,
        };
        (parameter, Argument::Single(instance))
    }

    #[test]
    fn builder_records_parameters_in_order() {
        let ctor: Constructor<Desk> = Constructor::new("new")
            .service::<dyn Journal>()
            .collection::<dyn Journal>()
            .build(|_| Ok(Desk { journals: vec![], spare: None }));

        assert_eq!(ctor.name(), "new");
        assert_eq!(ctor.arity(), 2);
        assert_eq!(ctor.parameters()[0].shape(), ParameterShape::Single);
        assert_eq!(ctor.parameters()[1].shape(), ParameterShape::Collection);
        assert_eq!(ctor.parameters()[1].key(), TypeKey::of::<dyn Journal>());
    }

    #[test]
    fn upcast_to_self_and_trait() {
        let journal = Arc::new(PaperJournal(3));
        let same: Arc<PaperJournal> = journal.clone().upcast();
        assert!(Arc::ptr_eq(&journal, &same));

        let as_trait: Arc<dyn Journal> = journal.upcast();
        assert_eq!(as_trait.pages(), 3);
    }

    #[test]
    fn arguments_hand_out_values_in_order() {
        let parameter = Parameter {
            key: TypeKey::of::<dyn Journal>(),
            shape: ParameterShape::Collection,
        };
        let mut args = Arguments::new(
            TypeKey::of::<Desk>(),
            "new",
            vec![
                single(erased(PaperJournal(1))),
                (
                    parameter,
                    Argument::Collection(vec![erased(PaperJournal(2)), erased(PaperJournal(3))]),
                ),
            ],
        );

        assert_eq!(args.remaining(), 2);
        let first = args.service::<dyn Journal>().unwrap();
        let rest = args.services::<dyn Journal>().unwrap();
        assert_eq!(first.pages(), 1);
        assert_eq!(rest.iter().map(|j| j.pages()).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(args.remaining(), 0);
    }

    #[test]
    fn arguments_reject_overread_and_shape_mismatch() {
        let mut args = Arguments::new(
            TypeKey::of::<Desk>(),
            "new",
            vec![single(erased(PaperJournal(1)))],
        );

        assert!(matches!(
            args.services::<dyn Journal>(),
            Err(TarkibError::ConstructionFailed { .. })
        ));

        match args.service::<dyn Journal>() {
            Err(TarkibError::ConstructionFailed { key, source }) => {
                assert_eq!(key, TypeKey::of::<Desk>());
                assert!(source.to_string().contains("more arguments"));
            }
            Err(other) => panic!("Expected ConstructionFailed, got: {other:?}"),
            Ok(_) => panic!("Expected ConstructionFailed, got a journal"),
        }
    }

    #[test]
    fn arguments_reject_wrong_type() {
        let mut args = Arguments::new(
            TypeKey::of::<Desk>(),
            "new",
            vec![single(erased(PaperJournal(1)))],
        );

        assert!(args.service::<PaperJournal>().is_err());
    }

    #[test]
    fn property_assigns_and_carries_markers() {
        let property = Property::new::<dyn Journal>("spare", |desk: &mut Desk, journal| {
            desk.spare = Some(journal);
        })
        .marked("inject")
        .marked("optional");

        assert_eq!(property.info().name(), "spare");
        assert_eq!(property.info().key(), TypeKey::of::<dyn Journal>());
        assert!(property.info().has_marker("inject"));
        assert!(!property.info().has_marker("ignored"));
        assert_eq!(property.info().markers().len(), 2);

        let mut desk = Desk { journals: vec![], spare: None };
        property.inject(&mut desk, &erased(PaperJournal(9))).unwrap();
        assert_eq!(desk.spare.map(|j| j.pages()), Some(9));
        assert!(desk.journals.is_empty());
    }
}
