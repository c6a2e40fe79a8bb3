//! Coordinate types shared by the renderers.
//!
//! Viewport sizes are in logical pixels. 3D renderers only depend on the
//! aspect ratio and on pixel-sized quantities (point size, sprite size),
//! both of which are expressed in the same logical units.

mod viewport;

pub use viewport::Viewport;
