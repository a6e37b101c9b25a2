//! Core container implementation for Tarkib DI.

mod chain;
pub mod component;
pub mod container;
pub mod error;
pub mod key;
pub mod lifestyle;
pub mod module;
pub mod options;
pub mod registration;
mod registry;

pub use component::{Arguments, Component, Constructor, Property, PropertyInfo, Upcast};
pub use container::{Container, prelude};
pub use error::{Result, TarkibError};
pub use key::TypeKey;
pub use lifestyle::{Lifestyle, Singleton, Transient};
pub use module::Module;
pub use options::{ContainerOptions, MarkedProperties, ParameterValidation, ResolutionSettings};
pub use registration::{Instance, downcast};
