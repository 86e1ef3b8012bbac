//! Environment markers
//!
//! Marker expressions are parsed and evaluated by `pep508_rs`. This module
//! describes the interpreter and platform they are evaluated against.

mod environment;

pub use environment::TargetEnvironment;
pub use pep508_rs::{ExtraName, MarkerEnvironment, MarkerTree};
