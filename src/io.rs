//! Reading and writing events and images

pub mod events;
pub mod raw;
pub mod table;

#[cfg(feature = "hdf5")]
pub mod hdf5;
