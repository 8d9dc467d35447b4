//! Errors reported by this crate.

use thiserror::Error;

/// Catch-all error for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Binning parameters which cannot describe a grid, or unknown names.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two grids (or a grid and its binning) of different shape.
    #[error("grid shapes {left:?} and {right:?} do not match")]
    ShapeMismatch { left: (usize, usize), right: (usize, usize) },

    /// An input (event collection, file) could not be obtained.
    #[error("input source unavailable: {0}")]
    SourceUnavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("could not decode records: {0}")]
    Decode(#[from] bincode::Error),

    #[error("could not parse configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("could not parse quantity `{text}`: {reason}")]
    Quantity { text: String, reason: String },

    #[cfg(feature = "hdf5")]
    #[error(transparent)]
    Hdf5(#[from] hdf5::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
