//! Station implementations for the generation workflow.

pub mod simulated;

pub use simulated::{default_registry, SimulatedStation};
