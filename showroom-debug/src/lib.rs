//! Terminal logging used by the showroom crates when the `debug` feature is
//! enabled.

#[macro_use]
pub mod logging;
