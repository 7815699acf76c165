//! Lithocolor derives lithophane height maps from color photos.
//!
//! [`heightmap`] and [`histogram`] hold the pixel math; the remaining modules
//! decode uploads, render charts and serve the web form.

pub mod chart;
pub mod codec;
pub mod errors;
pub mod heightmap;
pub mod histogram;
pub mod logging;
pub mod pipeline;
pub mod server;
pub mod settings;

#[cfg(test)]
mod tests;

pub use errors::{LithoError, Result};
pub use heightmap::{derive, HeightmapStats};
pub use histogram::{summarize, Histogram};
pub use settings::Settings;
