//! Type identification keys.
//!
//! [`TypeKey`] names an abstraction or a concrete type inside the
//! container. It is the lookup key of the registry and the unit reported
//! in every error message.

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifies a type in the container.
///
/// Two keys are equal when their [`TypeId`]s are equal; the type name is
/// kept only for diagnostics.
///
/// # Examples
/// ```
/// use tarkib_container::key::TypeKey;
///
/// trait Logger {}
///
/// let key = TypeKey::of::<dyn Logger>();
/// assert!(key.type_name().contains("Logger"));
/// assert_eq!(key, TypeKey::of::<dyn Logger>());
/// assert_ne!(key, TypeKey::of::<String>());
/// ```
#[derive(Clone, Copy)]
pub struct TypeKey {
    type_id: TypeId,
    type_name: &'static str,
}

impl TypeKey {
    /// Creates the key of type `T`. Trait objects are allowed.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    /// Returns the [`TypeId`] behind this key.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the fully qualified type name.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the type name without module paths.
    pub fn short_name(&self) -> String {
        tarkib_support::rendering::short_type_name(self.type_name)
    }

    /// Returns `true` for types the container refuses to resolve on its own:
    /// primitives, `String`/`str`, arrays, slices and tuples, also behind a
    /// reference.
    ///
    /// A constructor parameter of such a type has to be supplied by a
    /// factory registration instead.
    ///
    /// ```
    /// use tarkib_container::key::TypeKey;
    ///
    /// assert!(TypeKey::of::<String>().is_plain_data());
    /// assert!(TypeKey::of::<[u8; 16]>().is_plain_data());
    /// assert!(!TypeKey::of::<Vec<u8>>().is_plain_data());
    /// ```
    pub fn is_plain_data(&self) -> bool {
        if PLAIN_DATA.iter().any(|of| of() == self.type_id) {
            return true;
        }
        let referent = self
            .type_name
            .strip_prefix("&mut ")
            .or_else(|| self.type_name.strip_prefix('&'))
            .unwrap_or(self.type_name);
        referent.starts_with('[') || referent.starts_with('(')
    }
}

const PLAIN_DATA: &[fn() -> TypeId] = &[
    TypeId::of::<bool>,
    TypeId::of::<char>,
    TypeId::of::<i8>,
    TypeId::of::<i16>,
    TypeId::of::<i32>,
    TypeId::of::<i64>,
    TypeId::of::<i128>,
    TypeId::of::<isize>,
    TypeId::of::<u8>,
    TypeId::of::<u16>,
    TypeId::of::<u32>,
    TypeId::of::<u64>,
    TypeId::of::<u128>,
    TypeId::of::<usize>,
    TypeId::of::<f32>,
    TypeId::of::<f64>,
    TypeId::of::<String>,
    TypeId::of::<str>,
    TypeId::of::<&'static str>,
];

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.type_name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}
