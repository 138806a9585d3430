//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions for instance contract execution.
//! These are the interfaces between the domain and the outside world.
//!
//! - **Driving Ports (Inbound)**: `InstanceContractApi`
//! - **Driven Ports (Outbound)**: `Page`, `AccessControl`, `AccessControlFactory`,
//!   `AccessControlResolver`, `Contract`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
