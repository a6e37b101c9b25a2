//! Container configuration.
//!
//! [`ContainerOptions`] holds the property-selection policy and the
//! [`ResolutionSettings`]. Set them up before the first resolution.
//!
//! The settings are plain data and deserialize with serde, so an
//! application can keep them in its own configuration file:
//!
//! ```
//! use tarkib_container::options::{ParameterValidation, ResolutionSettings};
//!
//! let settings: ResolutionSettings =
//!     serde_json::from_str(r#"{ "parameter_validation": "lenient" }"#).unwrap();
//! assert_eq!(settings.parameter_validation, ParameterValidation::Lenient);
//! assert!(settings.detect_cycles);
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::component::PropertyInfo;
use crate::key::TypeKey;

/// Decides which properties of a concrete type receive an injected value.
///
/// Any `Fn(&TypeKey, &PropertyInfo) -> bool` closure works as a policy.
pub trait PropertySelection: Send + Sync {
    fn select_property(&self, concrete: &TypeKey, property: &PropertyInfo) -> bool;
}

impl<F> PropertySelection for F
where
    F: Fn(&TypeKey, &PropertyInfo) -> bool + Send + Sync,
{
    fn select_property(&self, concrete: &TypeKey, property: &PropertyInfo) -> bool {
        self(concrete, property)
    }
}

/// Selects every property carrying the given marker.
///
/// The marker is whatever string the application attaches with
/// [`Property::marked`](crate::component::Property::marked).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkedProperties(pub &'static str);

impl PropertySelection for MarkedProperties {
    fn select_property(&self, _concrete: &TypeKey, property: &PropertyInfo) -> bool {
        property.has_marker(self.0)
    }
}

/// What to do with constructor parameters the container cannot resolve
/// by itself (primitives, strings, arrays, tuples).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterValidation {
    /// Fail as soon as any constructor candidate examined declares one,
    /// even if a later candidate could have been used.
    #[default]
    Eager,
    /// Skip candidates that declare one; fail only when no candidate
    /// remains and one of them was skipped for that reason.
    Lenient,
}

/// Tunables of the resolution algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionSettings {
    pub parameter_validation: ParameterValidation,
    /// Report cycles as [`TarkibError::CircularDependency`](crate::error::TarkibError::CircularDependency)
    /// instead of recursing until the stack overflows.
    ///
    /// A cycle re-entering a singleton is reported even when this is off,
    /// since waiting on its own initialization would never return.
    pub detect_cycles: bool,
}

impl Default for ResolutionSettings {
    fn default() -> Self {
        Self {
            parameter_validation: ParameterValidation::Eager,
            detect_cycles: true,
        }
    }
}

/// Configuration of a [`Container`](crate::container::Container).
///
/// The default injects no properties.
#[derive(Clone, Default)]
pub struct ContainerOptions {
    pub property_selection: Option<Arc<dyn PropertySelection>>,
    pub settings: ResolutionSettings,
}

impl ContainerOptions {
    pub fn with_property_selection(mut self, policy: impl PropertySelection + 'static) -> Self {
        self.property_selection = Some(Arc::new(policy));
        self
    }

    pub fn with_settings(mut self, settings: ResolutionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn property_selection(&self) -> Option<&dyn PropertySelection> {
        self.property_selection.as_deref()
    }
}

impl fmt::Debug for ContainerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerOptions")
            .field("property_selection", &self.property_selection.is_some())
            .field("settings", &self.settings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Property;

    trait Logger: Send + Sync {}
    struct Service;

    fn logger_property() -> Property<Service> {
        Property::new::<dyn Logger>("logger", |_: &mut Service, _| {}).marked("dependency")
    }

    #[test]
    fn defaults() {
        let options = ContainerOptions::default();
        assert!(options.property_selection().is_none());
        assert_eq!(options.settings.parameter_validation, ParameterValidation::Eager);
        assert!(options.settings.detect_cycles);
    }

    #[test]
    fn marked_properties_policy() {
        let property = logger_property();
        let concrete = TypeKey::of::<Service>();

        assert!(MarkedProperties("dependency").select_property(&concrete, property.info()));
        assert!(!MarkedProperties("other").select_property(&concrete, property.info()));
    }

    #[test]
    fn closure_policy() {
        let options = ContainerOptions::default()
            .with_property_selection(|_: &TypeKey, info: &PropertyInfo| info.name() == "logger");
        let property = logger_property();

        let policy = options.property_selection().unwrap();
        assert!(policy.select_property(&TypeKey::of::<Service>(), property.info()));
    }

    #[test]
    fn settings_from_json() {
        let settings: ResolutionSettings =
            serde_json::from_str(r#"{ "parameter_validation": "lenient", "detect_cycles": false }"#)
                .unwrap();
        assert_eq!(settings.parameter_validation, ParameterValidation::Lenient);
        assert!(!settings.detect_cycles);

        let empty: ResolutionSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, ResolutionSettings::default());
    }

    #[test]
    fn settings_round_trip_names() {
        let json = serde_json::to_string(&ResolutionSettings::default()).unwrap();
        assert!(json.contains(r#""parameter_validation":"eager""#));
        assert!(json.contains(r#""detect_cycles":true"#));
    }

    #[test]
    fn debug_hides_policy() {
        let options = ContainerOptions::default().with_property_selection(MarkedProperties("x"));
        let debug = format!("{options:?}");
        assert!(debug.contains("property_selection: true"));
    }
}
