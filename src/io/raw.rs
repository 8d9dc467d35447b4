/// Read / write images as raw little-endian `f32` binary

use std::fs::File;
use std::io::{Write, Read, BufWriter, BufReader};
use std::path::Path;

use ndarray::{Array2, ArrayView2};

use crate::error::{Error, Result};

pub fn write(data: impl Iterator<Item = f32>, path: &Path) -> std::io::Result<()> {
    let mut buf = BufWriter::new(File::create(path)?);
    for datum in data {
        buf.write_all(&datum.to_le_bytes())?;
    }
    buf.flush()
}

/// Write `grid` in row-major (`eta_bin * nbins + phi_bin`) order
pub fn write_grid(grid: ArrayView2<f32>, path: &Path) -> std::io::Result<()> {
    write(grid.iter().copied(), path)
}

type IORes<T> = std::io::Result<T>;
pub fn read<'a>(path: &Path) -> IORes<impl Iterator<Item = IORes<f32>> + 'a> {
    let mut buf = BufReader::new(File::open(path)?);
    let mut buffer = [0; 4];

    Ok(std::iter::from_fn(move || {
        use std::io::ErrorKind::UnexpectedEof;
        match buf.read_exact(&mut buffer) {
            Ok(()) => Some(Ok(f32::from_le_bytes(buffer))),
            Err(e) if e.kind() == UnexpectedEof => None,
            Err(e) => Some(Err(e)),
        }
    }))
}

/// Read back an `nbins` x `nbins` image written by `write_grid`
pub fn read_grid(path: &Path, nbins: usize) -> Result<Array2<f32>> {
    let data = read(path)?.collect::<IORes<Vec<_>>>()?;
    let n = data.len();
    Array2::from_shape_vec((nbins, nbins), data)
        .map_err(|_| Error::ShapeMismatch { left: (nbins, nbins), right: (1, n) })
}
