//! Sphaera engine crate.
//!
//! Window + GPU runtime and the particle/skybox renderers built on it.

pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
