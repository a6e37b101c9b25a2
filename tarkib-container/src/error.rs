//! Error types for Tarkib container operations.
//!
//! Every failure names the types involved and ends with a hint on how to
//! fix the composition root.

use std::fmt;

use tarkib_support::rendering::render_chain;

use crate::key::TypeKey;

/// Main error type for all Tarkib operations.
#[derive(Debug, thiserror::Error)]
pub enum TarkibError {
    /// A registration argument is unusable.
    #[error("Invalid argument `{argument}`: {reason}")]
    InvalidArgument {
        argument: &'static str,
        reason: String,
    },

    /// Requested abstraction has no registration.
    #[error("{}", .0)]
    NotRegistered(NotRegisteredError),

    /// No constructor of a concrete type can be satisfied.
    #[error("{}", .0)]
    UnresolvableConstructor(UnresolvableConstructorError),

    /// A constructor asks for plain data the container cannot produce.
    #[error("{}", .0)]
    InvalidParameterType(InvalidParameterTypeError),

    /// Resolution re-entered an abstraction that is still being built.
    #[error("{}", .0)]
    CircularDependency(CircularDependencyError),

    /// A constructor, factory or property assignment failed.
    #[error("Failed to construct {key}: {source}")]
    ConstructionFailed {
        key: TypeKey,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl TarkibError {
    /// Wraps any error raised while building `key`.
    pub fn construction<E>(key: TypeKey, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        TarkibError::ConstructionFailed {
            key,
            source: source.into(),
        }
    }
}

/// Error when an abstraction was never registered.
#[derive(Debug)]
pub struct NotRegisteredError {
    /// The abstraction that was requested.
    pub requested: TypeKey,
    /// The abstraction being built when the request was made, if any.
    pub required_by: Option<TypeKey>,
    /// Registered abstractions with similar names.
    pub suggestions: Vec<String>,
}

impl fmt::Display for NotRegisteredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Abstraction not registered: {}", self.requested)?;

        if let Some(parent) = &self.required_by {
            write!(f, "\n  Required by: {parent}")?;
        }

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        write!(
            f,
            "\n  Hint: register an implementation with .register::<{}, _>() or .register_factory()",
            self.requested.short_name()
        )
    }
}

/// Why one constructor candidate was rejected.
#[derive(Debug, Clone)]
pub struct RejectedConstructor {
    /// Name the component gave the constructor.
    pub constructor: &'static str,
    /// First parameter type that had no registration.
    pub missing: TypeKey,
}

/// Error when no constructor of a concrete type can be satisfied.
#[derive(Debug)]
pub struct UnresolvableConstructorError {
    pub concrete: TypeKey,
    /// Rejected candidates, in the order they were tried.
    pub rejected: Vec<RejectedConstructor>,
}

impl fmt::Display for UnresolvableConstructorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cannot construct {}: no constructor has all of its parameter types registered",
            self.concrete
        )?;
        for candidate in &self.rejected {
            write!(
                f,
                "\n  - {}(..) is missing {}",
                candidate.constructor, candidate.missing
            )?;
        }
        write!(f, "\n  Hint: register the missing abstractions before resolving")
    }
}

/// Error when a constructor parameter is a primitive, string, array or tuple.
#[derive(Debug)]
pub struct InvalidParameterTypeError {
    pub concrete: TypeKey,
    pub constructor: &'static str,
    pub parameter: TypeKey,
}

impl fmt::Display for InvalidParameterTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Constructor {}::{} takes a parameter of type {}, which cannot be resolved automatically",
            self.concrete.short_name(),
            self.constructor,
            self.parameter
        )?;
        write!(
            f,
            "\n  Hint: register {} through a factory closure that supplies the value",
            self.concrete.short_name()
        )
    }
}

/// Error when resolution runs into a cycle.
#[derive(Debug)]
pub struct CircularDependencyError {
    /// Abstractions on the cycle; the last entry repeats an earlier one.
    pub chain: Vec<TypeKey>,
}

impl fmt::Display for CircularDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.chain.iter().map(TypeKey::short_name).collect();
        write!(f, "Circular dependency detected:\n  {}", render_chain(&names))?;
        write!(
            f,
            "\n  Hint: break the cycle with property injection or a factory registration"
        )
    }
}

/// Convenient Result type for Tarkib operations.
pub type Result<T> = std::result::Result<T, TarkibError>;
