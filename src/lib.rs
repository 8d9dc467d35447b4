//! Angular images of jets: event flattening, region selection, and binning of
//! `(eta, phi, weight)` triples into square grids.

pub mod error;
pub mod binning;
pub mod event;
pub mod selection;
pub mod analyzer;
pub mod image;
pub mod config;
pub mod io;
pub mod utils;

pub use error::{Error, Result};
pub use binning::{merge, AngularBinAccumulator, BinningConfig, EtaMode, Triple};
pub use image::Region;
