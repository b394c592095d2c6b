//! Typed views over OCX model elements

mod core;
mod grid;
mod material;

// Re-export all public types from core module
pub use self::core::{Guid, Header, PartKind, PhysicalProperties, StructurePart, element_guid};

// Re-export all public types from grid module
pub use grid::{Axis, ReferenceGridEntry};

// Re-export all public types from material module
pub use material::{DEFAULT_THICKNESS, Material, PlateMaterial, thickness};
