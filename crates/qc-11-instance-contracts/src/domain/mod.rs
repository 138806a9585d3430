//! # Domain Layer (Inner Hexagon)
//!
//! Pure business types for instance contract execution.
//! NO I/O, NO async, NO collaborator access.
//!
//! - This is the **inner layer** of the hexagonal architecture.
//! - Dependencies point INWARD only (adapters depend on this, not vice versa).

pub mod encoding;
pub mod entities;
pub mod fingerprint;
pub mod invariants;
pub mod value_objects;

pub use encoding::*;
pub use entities::*;
pub use fingerprint::*;
pub use invariants::*;
pub use value_objects::*;
