//! Property selection for the library.

use tarkib::MarkedProperties;

/// Marker for properties the container should fill.
pub const DEPENDENCY: &str = "dependency";

/// Injects every property marked [`DEPENDENCY`].
pub fn dependency_properties() -> MarkedProperties {
    MarkedProperties(DEPENDENCY)
}
