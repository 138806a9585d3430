//! # Adapters Layer (Outer Hexagon)
//!
//! Concrete implementations of the driven ports.
//!
//! - Adapters implement domain ports
//! - The production page and policy store live in the storage engine; these
//!   adapters cover staging and tests

pub mod access_control;
pub mod memory_page;

pub use access_control::*;
pub use memory_page::*;
