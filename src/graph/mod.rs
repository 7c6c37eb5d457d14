//! Topic graph drawing.
//!
//! [`layout`] computes node centres once; [`render`] draws from those
//! placements and [`pick`] hit-tests against them, so what is clicked is
//! always what is drawn. [`GraphCanvas`] owns a raster buffer and redraws it
//! on every resize or data change.

mod canvas;
mod layout;
mod raster;
mod render;
mod surface;

pub use canvas::{GraphCanvas, GraphSnapshot};
pub use layout::{layout, pick, NodePlacement, ANCHOR_Y, HIT_SLOP};
pub use raster::{RasterSurface, MAX_SURFACE_SIDE};
pub use render::{render, Palette, ACTIVE_RING_GAP, GRID_DOT_RADIUS, GRID_PITCH, LABEL_MIN_RADIUS};
pub use surface::{DrawCommand, RecordingSurface, Rgba, Surface};
