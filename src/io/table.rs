/// Images as plain-text tables, one bin per line

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ndarray::ArrayView2;
use ndhistogram::Histogram;

use crate::analyzer::{Hist1, Hist2};
use crate::binning::BinningConfig;
use crate::error::{Error, Result};

/// Write `eta_lo eta_hi phi_lo phi_hi value` for every bin of `grid`
pub fn write_grid(path: &Path, config: &BinningConfig, grid: ArrayView2<f32>) -> Result<()> {
    let n = config.nbins;
    if grid.dim() != (n, n) {
        return Err(Error::ShapeMismatch { left: (n, n), right: grid.dim() })
    }
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "# eta_lo eta_hi phi_lo phi_hi value")?;
    for ((i, j), value) in grid.indexed_iter() {
        let (eta_lo, eta_hi) = config.eta_edges(i);
        let (phi_lo, phi_hi) = config.phi_edges(j);
        writeln!(out, "{eta_lo} {eta_hi} {phi_lo} {phi_hi} {value}")?;
    }
    out.flush()?;
    Ok(())
}

/// Write `lo hi entries` for every bin of `h`, including under- and overflow
pub fn write_hist1(path: &Path, h: &Hist1) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "# lo hi entries")?;
    for item in h.iter() {
        writeln!(out, "{} {} {}", edge(item.bin.start()), edge(item.bin.end()), item.value)?;
    }
    out.flush()?;
    Ok(())
}

/// Write `x_lo x_hi y_lo y_hi entries` for every bin of `h`
pub fn write_hist2(path: &Path, h: &Hist2) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "# x_lo x_hi y_lo y_hi entries")?;
    for item in h.iter() {
        let (x, y) = item.bin;
        writeln!(out, "{} {} {} {} {}",
                 edge(x.start()), edge(x.end()), edge(y.start()), edge(y.end()), item.value)?;
    }
    out.flush()?;
    Ok(())
}

// Under- and overflow bins are open on one side
fn edge(e: Option<f32>) -> String {
    e.map_or_else(|| "nan".into(), |x| x.to_string())
}
