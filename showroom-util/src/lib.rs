//! Utility crate that contains geometry and container helpers shared by the
//! showroom crates.
#![warn(missing_docs)]

pub mod collision;
pub mod container;
pub mod math;
