//! Hi-C contact heatmaps (log2 observed/expected) from bin and contact tables.
//!
//! The pipeline is load, build, optionally merge two conditions along the
//! diagonal, then plot to PNG.

pub mod colormap;
pub mod error;
pub mod logger;
pub mod matrix;
pub mod merge;
pub mod pipeline;
pub mod plot;
pub mod table;

pub use error::HicError;

/// Crate version, recorded in run logs
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
