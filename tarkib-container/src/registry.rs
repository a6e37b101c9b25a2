//! Registry — the ordered store of instance producers.
//!
//! Producers are grouped per abstraction. Within a group the order of
//! registration is kept, and lookups read it newest first:
//! - scalar resolution uses the most recent producer
//! - collection resolution visits every producer, most recent first
//!
//! Registering an abstraction again never replaces anything; it only
//! shadows the older producer for scalar resolution.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::container::Container;
use crate::error::Result;
use crate::key::TypeKey;
use crate::registration::{Instance, Registration};

/// An abstraction bound to the registration that produces it.
pub(crate) struct InstanceProducer {
    id: usize,
    abstraction: TypeKey,
    produces: TypeKey,
    registration: Box<dyn Registration>,
}

impl InstanceProducer {
    pub(crate) fn new(abstraction: TypeKey, produces: TypeKey, registration: Box<dyn Registration>) -> Self {
        Self {
            id: 0,
            abstraction,
            produces,
            registration,
        }
    }

    /// Registration index, unique within one registry.
    pub(crate) fn id(&self) -> usize {
        self.id
    }

    pub(crate) fn abstraction(&self) -> TypeKey {
        self.abstraction
    }

    pub(crate) fn produces(&self) -> TypeKey {
        self.produces
    }

    pub(crate) fn lifestyle(&self) -> &'static str {
        self.registration.lifestyle()
    }

    pub(crate) fn allows_reentry(&self) -> bool {
        self.registration.allows_reentry()
    }

    pub(crate) fn instance(&self, container: &Container) -> Result<Instance> {
        self.registration.instance(container)
    }
}

impl fmt::Debug for InstanceProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceProducer")
            .field("id", &self.id)
            .field("abstraction", &self.abstraction)
            .field("produces", &self.produces)
            .field("lifestyle", &self.lifestyle())
            .finish()
    }
}

/// Multimap from abstraction to its producers.
///
/// Each group is stored oldest first; every read goes through the
/// newest-first accessors.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    producers: HashMap<TypeKey, Vec<InstanceProducer>>,
    len: usize,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a producer and assigns its id; reads are newest first.
    pub fn push(&mut self, mut producer: InstanceProducer) {
        producer.id = self.len;
        debug!(
            abstraction = %producer.abstraction(),
            produces = %producer.produces(),
            lifestyle = producer.lifestyle(),
            "Registered producer"
        );
        self.producers
            .entry(producer.abstraction())
            .or_default()
            .push(producer);
        self.len += 1;
    }

    /// The most recently registered producer for `abstraction`.
    pub fn latest(&self, abstraction: &TypeKey) -> Option<&InstanceProducer> {
        self.producers.get(abstraction).and_then(|group| group.last())
    }

    /// Every producer for `abstraction`, most recent first.
    pub fn newest_first(&self, abstraction: &TypeKey) -> impl Iterator<Item = &InstanceProducer> {
        self.producers
            .get(abstraction)
            .into_iter()
            .flat_map(|group| group.iter().rev())
    }

    pub fn contains(&self, abstraction: &TypeKey) -> bool {
        self.producers.contains_key(abstraction)
    }

    /// Number of producers, counting every registration of an abstraction.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct abstractions.
    pub fn abstraction_count(&self) -> usize {
        self.producers.len()
    }

    /// Type names of every registered abstraction, sorted, for suggestions.
    pub fn abstraction_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.producers.keys().map(TypeKey::type_name).collect();
        names.sort_unstable();
        names
    }
}
