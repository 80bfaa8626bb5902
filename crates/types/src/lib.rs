//! knobs types - shared definitions
//!
//! This crate contains the plain type definitions shared by the variable
//! registry and the notify category tree. It has no dependencies and
//! compiles quickly, allowing parallel compilation of dependent crates.
//!
//! # Modules
//!
//! - [`severity`] - Notify severity levels
//! - [`variable`] - Variable type enumeration and raw flag bits

pub mod severity;
pub mod variable;

pub use severity::{Severity, UnknownSeverity};
pub use variable::{flags, VariableType};
