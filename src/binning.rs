//! Accumulation of weighted `(eta, phi)` points into a dense angular grid.

use ndarray::{Array2, ArrayView2};
use serde::Deserialize;

use units::plain::{Etaf32, Phif32, Weightf32};
use crate::error::{Error, Result};

/// One physics object contributing to an angular map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triple {
    pub eta   : Etaf32,
    pub phi   : Phif32,
    pub weight: Weightf32,
}

impl Triple {
    pub fn new(eta: Etaf32, phi: Phif32, weight: Weightf32) -> Self { Self { eta, phi, weight } }
}

impl From<(f32, f32, f32)> for Triple {
    fn from((eta, phi, weight): (f32, f32, f32)) -> Self { Self { eta, phi, weight } }
}

/// How the eta coordinate is mapped onto the eta axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EtaMode {
    /// Bin `eta` as it is.
    Signed,
    /// Bin `|eta|`: both halves of the detector are folded onto one axis.
    Absolute,
}

/// Extent and granularity of a square angular grid.
///
/// Both axes are half-open: `[eta_min, eta_max)` and `[phi_min, phi_max)`,
/// each divided into `nbins` equal bins.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BinningConfig {
    pub eta_min: Etaf32,
    pub eta_max: Etaf32,
    pub phi_min: Phif32,
    pub phi_max: Phif32,
    pub nbins  : usize,
}

impl BinningConfig {

    pub fn new(nbins: usize, (eta_min, eta_max): (Etaf32, Etaf32), (phi_min, phi_max): (Phif32, Phif32)) -> Self {
        Self { eta_min, eta_max, phi_min, phi_max, nbins }
    }

    pub fn validate(&self) -> Result<()> {
        let &Self { eta_min, eta_max, phi_min, phi_max, nbins } = self;
        if nbins == 0 {
            return Err(Error::InvalidConfig("need more than zero bins".into()));
        }
        let max_cells = isize::MAX as usize / std::mem::size_of::<f32>();
        if nbins.checked_mul(nbins).map_or(true, |cells| cells > max_cells) {
            return Err(Error::InvalidConfig(format!("{nbins} x {nbins} grid is too large")));
        }
        for (name, lo, hi) in [("eta", eta_min, eta_max), ("phi", phi_min, phi_max)] {
            if !(lo.is_finite() && hi.is_finite()) {
                return Err(Error::InvalidConfig(format!("{name} range [{lo}, {hi}) is not finite")));
            }
            if hi <= lo {
                return Err(Error::InvalidConfig(format!("{name} range [{lo}, {hi}) is empty or inverted")));
            }
        }
        Ok(())
    }

    pub fn eta_bin_width(&self) -> f32 { (self.eta_max - self.eta_min) / self.nbins as f32 }
    pub fn phi_bin_width(&self) -> f32 { (self.phi_max - self.phi_min) / self.nbins as f32 }

    /// Lower and upper edge of eta bin `i`
    pub fn eta_edges(&self, i: usize) -> (f32, f32) {
        let w = self.eta_bin_width();
        (self.eta_min + i as f32 * w, self.eta_min + (i + 1) as f32 * w)
    }

    /// Lower and upper edge of phi bin `j`
    pub fn phi_edges(&self, j: usize) -> (f32, f32) {
        let w = self.phi_bin_width();
        (self.phi_min + j as f32 * w, self.phi_min + (j + 1) as f32 * w)
    }
}

/// Find the bin containing `x` on a uniform axis over `[lo, hi)`.
///
/// `None` if `x` lies outside the axis (or is NaN). The range test is made on
/// the coordinate itself, so rounding in `width` can neither push an in-range
/// value off the grid nor pull an out-of-range one onto it.
#[inline]
fn axis_index(x: f32, lo: f32, hi: f32, width: f32, nbins: usize) -> Option<usize> {
    if !(x >= lo && x < hi) { return None }
    let i = ((x - lo) / width).floor() as usize;
    Some(i.min(nbins - 1))
}

/// Dense `nbins x nbins` grid of summed weights, indexed `[eta_bin, phi_bin]`.
#[derive(Clone, Debug, PartialEq)]
pub struct AngularBinAccumulator {
    config : BinningConfig,
    mode   : EtaMode,
    grid   : Array2<f32>,
    entries: u64,
    dropped: u64,
}

impl AngularBinAccumulator {

    pub fn new(config: BinningConfig, mode: EtaMode) -> Result<Self> {
        config.validate()?;
        let n = config.nbins;
        Ok(Self { config, mode, grid: Array2::zeros((n, n)), entries: 0, dropped: 0 })
    }

    pub fn config(&self) -> &BinningConfig { &self.config }
    pub fn mode  (&self) -> EtaMode        {  self.mode   }

    /// The `(eta_bin, phi_bin)` that a point would be accumulated into.
    pub fn bin_of(&self, eta: Etaf32, phi: Phif32) -> Option<(usize, usize)> {
        let c = &self.config;
        let eta = match self.mode {
            EtaMode::Signed   => eta,
            EtaMode::Absolute => eta.abs(),
        };
        let i = axis_index(eta, c.eta_min, c.eta_max, c.eta_bin_width(), c.nbins)?;
        let j = axis_index(phi, c.phi_min, c.phi_max, c.phi_bin_width(), c.nbins)?;
        Some((i, j))
    }

    /// Add `weight` to the bin containing `(eta, phi)`; points outside the
    /// grid are silently discarded.
    pub fn accumulate(&mut self, eta: Etaf32, phi: Phif32, weight: Weightf32) {
        match self.bin_of(eta, phi) {
            Some(ij) => { self.grid[ij] += weight; self.entries += 1; }
            None     => { self.dropped += 1; }
        }
    }

    pub fn accumulate_triple(&mut self, Triple { eta, phi, weight }: Triple) {
        self.accumulate(eta, phi, weight)
    }

    pub fn snapshot(&self) -> ArrayView2<'_, f32> { self.grid.view() }

    /// Hand over the grid, giving up the accumulator
    pub fn into_grid(self) -> Array2<f32> { self.grid }

    pub fn reset(&mut self) {
        self.grid.fill(0.0);
        self.entries = 0;
        self.dropped = 0;
    }

    /// Number of points which landed in the grid
    pub fn entries(&self) -> u64 { self.entries }

    /// Number of points discarded for lying outside the grid
    pub fn dropped(&self) -> u64 { self.dropped }

    pub fn total(&self) -> f32 { self.grid.sum() }

    /// Add the contents of `other` into `self`.
    ///
    /// Fails unless both accumulators bin in exactly the same way.
    pub fn merge_from(&mut self, other: &Self) -> Result<()> {
        if self.config != other.config || self.mode != other.mode {
            return Err(Error::InvalidConfig(format!(
                "cannot merge {:?} {:?} into {:?} {:?}", other.mode, other.config, self.mode, self.config)));
        }
        self.grid    += &other.grid;
        self.entries += other.entries;
        self.dropped += other.dropped;
        Ok(())
    }
}

/// # Panics
///
/// Panics if the two accumulators were constructed with different binnings.
/// Use [`AngularBinAccumulator::merge_from`] when that cannot be guaranteed.
impl std::ops::AddAssign<&AngularBinAccumulator> for AngularBinAccumulator {
    fn add_assign(&mut self, rhs: &Self) {
        assert_eq!((self.config, self.mode), (rhs.config, rhs.mode), "Merging differently binned accumulators");
        self.grid    += &rhs.grid;
        self.entries += rhs.entries;
        self.dropped += rhs.dropped;
    }
}

/// Elementwise sum of two grids.
pub fn merge(a: ArrayView2<f32>, b: ArrayView2<f32>) -> Result<Array2<f32>> {
    if a.dim() != b.dim() {
        return Err(Error::ShapeMismatch { left: a.dim(), right: b.dim() });
    }
    Ok(&a + &b)
}


#[cfg(test)]
mod test_accumulate {
    use super::*;
    use rstest::rstest;
    #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};
    use ndarray::array;

    fn two_by_two(mode: EtaMode) -> AngularBinAccumulator {
        AngularBinAccumulator::new(BinningConfig::new(2, (0.0, 2.0), (-1.0, 1.0)), mode).unwrap()
    }

    #[test]
    fn signed_example() {
        let mut acc = two_by_two(EtaMode::Signed);
        acc.accumulate(0.5, -0.5, 10.0);
        acc.accumulate(1.5,  0.5,  5.0);
        assert_eq!(acc.snapshot(), array![[10.0_f32, 0.0], [0.0, 5.0]]);
        assert_eq!(acc.entries(), 2);
        assert_eq!(acc.dropped(), 0);
    }

    #[test]
    fn absolute_example() -> Result<()> {
        let mut acc = AngularBinAccumulator::new(BinningConfig::new(1, (0.0, 2.4), (-3.14, 3.14)), EtaMode::Absolute)?;
        acc.accumulate(-2.0, 0.0, 3.0);
        acc.accumulate( 2.0, 0.0, 4.0);
        assert_eq!(acc.snapshot(), array![[7.0_f32]]);
        Ok(())
    }

    // Half-open axes: lower edge included, upper edge excluded
    #[rstest(/**/ eta ,  phi , expected,
             case(0.0 , -1.0 , Some((0, 0))),
             case(1.0 ,  0.0 , Some((1, 1))),
             case(1.99,  0.99, Some((1, 1))),
             case(2.0 ,  0.0 , None),
             case(0.5 ,  1.0 , None),
             case(-0.1,  0.0 , None), // floor, not truncation: would be bin 0 otherwise
             case(0.5 , -1.01, None),
             case(f32::NAN, 0.0, None),
             case(0.5, f32::INFINITY, None),
    )]
    fn boundaries_signed(eta: f32, phi: f32, expected: Option<(usize, usize)>) {
        assert_eq!(two_by_two(EtaMode::Signed).bin_of(eta, phi), expected);
    }

    #[rstest(/**/ eta ,  expected,
             case(-0.5, Some((0, 1))),
             case(-1.5, Some((1, 1))),
             case(-2.0, None),
             case( 2.0, None),
    )]
    fn boundaries_absolute(eta: f32, expected: Option<(usize, usize)>) {
        assert_eq!(two_by_two(EtaMode::Absolute).bin_of(eta, 0.5), expected);
    }

    // Forward region: the absolute value is offset by the start of the axis
    #[test]
    fn absolute_offset_axis() -> Result<()> {
        let acc = AngularBinAccumulator::new(BinningConfig::new(3, (2.4, 4.5), (-3.14, 3.14)), EtaMode::Absolute)?;
        assert_eq!(acc.bin_of(-2.5, 0.0).map(|(i, _)| i), Some(0));
        assert_eq!(acc.bin_of( 4.4, 0.0).map(|(i, _)| i), Some(2));
        assert_eq!(acc.bin_of( 1.0, 0.0), None);
        Ok(())
    }

    #[test]
    fn out_of_range_is_counted_not_binned() {
        let mut acc = two_by_two(EtaMode::Signed);
        acc.accumulate(5.0, 0.0, 1.0);
        acc.accumulate(0.5, 0.0, 2.0);
        assert_eq!(acc.total(), 2.0);
        assert_eq!((acc.entries(), acc.dropped()), (1, 1));
    }

    #[test]
    fn snapshot_does_not_reset() {
        let mut acc = two_by_two(EtaMode::Signed);
        acc.accumulate(0.5, 0.5, 1.0);
        let before = acc.snapshot().to_owned();
        acc.accumulate(0.5, 0.5, 1.0);
        assert_eq!(before[(0, 1)], 1.0);
        assert_eq!(acc.snapshot()[(0, 1)], 2.0);
    }

    #[test]
    fn reset_clears_everything() {
        let mut acc = two_by_two(EtaMode::Signed);
        acc.accumulate(0.5, 0.5, 1.0);
        acc.accumulate(9.5, 0.5, 1.0);
        acc.reset();
        assert_eq!(acc, two_by_two(EtaMode::Signed));
    }

    #[test]
    fn merge_rejects_different_shapes() {
        let a = Array2::<f32>::zeros((2, 2));
        let b = Array2::<f32>::zeros((3, 3));
        assert!(matches!(merge(a.view(), b.view()), Err(Error::ShapeMismatch { .. })));

        let mut signed = two_by_two(EtaMode::Signed);
        assert!(signed.merge_from(&two_by_two(EtaMode::Absolute)).is_err());
    }
}
