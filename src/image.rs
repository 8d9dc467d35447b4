//! Angular images of jets and jet constituents, one per detector region
use std::ops::AddAssign;
use std::str::FromStr;

use ndhistogram::{ndhistogram, axis::Uniform, Histogram};
use rayon::prelude::*;

use crate::analyzer::Hist1;
use crate::binning::{AngularBinAccumulator, BinningConfig, EtaMode, Triple};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::event::{FlatEvent, SkimmedEvent};

/// Detector regions for which images are made
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Region {
    /// Barrel fat jets, `|eta| < 2.4`
    Central,
    /// Forward fat jets, `2.4 <= |eta| < 4.5`
    Forward,
    /// Particle-flow constituents of fat jets in the barrel
    Constituents,
    /// Occupancy over the whole detector, without folding `eta`
    Occupancy,
}

const PHI_EDGE: f32 = 3.14;

impl Region {

    pub fn binning(self, nbins: usize) -> BinningConfig {
        let phi = (-PHI_EDGE, PHI_EDGE);
        match self {
            Region::Central      => BinningConfig::new(nbins, ( 0.0, 2.4), phi),
            Region::Forward      => BinningConfig::new(nbins, ( 2.4, 4.5), phi),
            Region::Constituents => BinningConfig::new(nbins, ( 0.0, 2.4), phi),
            Region::Occupancy    => BinningConfig::new(nbins, (-5.0, 5.0), (-3.1416, 3.1416)),
        }
    }

    pub fn eta_mode(self) -> EtaMode {
        match self {
            Region::Occupancy => EtaMode::Signed,
            _                 => EtaMode::Absolute,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Region::Central      => "central",
            Region::Forward      => "frw",
            Region::Constituents => "constituents",
            Region::Occupancy    => "occupancy",
        }
    }

    /// An empty accumulator for this region, binned according to `config`
    pub fn accumulator(self, config: &Config, nbins: Option<usize>) -> Result<AngularBinAccumulator> {
        let (binning, mode) = config.binning(self, nbins);
        AngularBinAccumulator::new(binning, mode)
    }
}

impl FromStr for Region {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "central"                => Region::Central,
            "forward" | "frw"        => Region::Forward,
            "constituents" | "pf"    => Region::Constituents,
            "occupancy"              => Region::Occupancy,
            _ => return Err(Error::InvalidConfig(format!("unknown region `{s}`"))),
        })
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.name()) }
}

// --------------------------------------------------------------------------------
pub fn fill(accumulator: &mut AngularBinAccumulator, triples: impl IntoIterator<Item = Triple>) {
    for t in triples { accumulator.accumulate_triple(t) }
}

/// Fold `records` into copies of `empty`, `job_size` records per rayon job,
/// and sum the partial results.
pub fn fold_parallel<R, A, F>(empty: &A, records: &[R], job_size: usize, fill_one: F) -> A
where
    R: Sync,
    A: Clone + Send + Sync + for<'a> AddAssign<&'a A>,
    F: Fn(&mut A, &R) + Sync,
{
    let empty_accumulator = || empty.clone();
    let add_accumulators = |mut a: A, b: A| { a += &b; a };
    let record_into_accumulator = |mut a: A, record: &R| { fill_one(&mut a, record); a };

    records.par_iter()
        .fold_chunks(job_size.max(1), empty_accumulator, record_into_accumulator)
        .reduce(empty_accumulator, add_accumulators)
}

/// Accumulate the triples that `extract` finds in each of `records`, in parallel
pub fn fill_parallel<R, F, I>(empty: &AngularBinAccumulator, records: &[R], job_size: usize, extract: F) -> AngularBinAccumulator
where
    R: Sync,
    F: Fn(&R) -> I + Sync,
    I: IntoIterator<Item = Triple>,
{
    fold_parallel(empty, records, job_size, |acc, record| fill(acc, extract(record)))
}

// --------------------------------------------------------------------------------
/// Transverse momentum sums of central and forward fat jets
#[derive(Clone, Debug, PartialEq)]
pub struct FatJetMaps {
    pub central: AngularBinAccumulator,
    pub forward: AngularBinAccumulator,
}

impl FatJetMaps {

    pub fn new(config: &Config, nbins: Option<usize>) -> Result<Self> {
        Ok(Self {
            central: Region::Central.accumulator(config, nbins)?,
            forward: Region::Forward.accumulator(config, nbins)?,
        })
    }

    pub fn fill(&mut self, event: &SkimmedEvent) {
        fill(&mut self.central, event.central.triples());
        fill(&mut self.forward, event.forward.triples());
    }

    pub fn fill_parallel(&self, events: &[SkimmedEvent], job_size: usize) -> Self {
        fold_parallel(self, events, job_size, Self::fill)
    }
}

impl AddAssign<&FatJetMaps> for FatJetMaps {
    fn add_assign(&mut self, rhs: &Self) {
        self.central += &rhs.central;
        self.forward += &rhs.forward;
    }
}

// --------------------------------------------------------------------------------
/// Constituent images: transverse momentum sum and particle count per bin,
/// plus the distribution of the number of constituents per event.
///
/// `+=` panics unless both sides were made with the same binnings and both
/// have, or both lack, an occupancy map.
#[derive(Clone)]
pub struct ConstituentMaps {
    pub pt_sum        : AngularBinAccumulator,
    pub multiplicity  : AngularBinAccumulator,
    pub occupancy     : Option<AngularBinAccumulator>,
    pub n_constituents: Hist1,
}

impl ConstituentMaps {

    pub fn new(config: &Config, nbins: Option<usize>, with_occupancy: bool) -> Result<Self> {
        let pt_sum = Region::Constituents.accumulator(config, nbins)?;
        let multiplicity = pt_sum.clone();
        let occupancy = if with_occupancy { Some(Region::Occupancy.accumulator(config, nbins)?) } else { None };
        Ok(Self {
            pt_sum, multiplicity, occupancy,
            n_constituents: ndhistogram!(Uniform::new(100, 0.0, 100.0); usize),
        })
    }

    pub fn fill(&mut self, event: &FlatEvent) {
        let n = event.n_constituents();
        if n != 0 { self.n_constituents.fill(&(n as f32)) }
        for t in event.constituent_triples() {
            self.pt_sum      .accumulate_triple(t);
            self.multiplicity.accumulate(t.eta, t.phi, 1.0);
            if let Some(o) = self.occupancy.as_mut() { o.accumulate_triple(t) }
        }
    }

    pub fn fill_parallel(&self, events: &[FlatEvent], job_size: usize) -> Self {
        fold_parallel(self, events, job_size, Self::fill)
    }
}

impl AddAssign<&ConstituentMaps> for ConstituentMaps {
    fn add_assign(&mut self, rhs: &Self) {
        self.pt_sum       += &rhs.pt_sum;
        self.multiplicity += &rhs.multiplicity;
        match (self.occupancy.as_mut(), rhs.occupancy.as_ref()) {
            (Some(a), Some(b)) => *a += b,
            (None   , None   ) => {},
            _ => panic!("Merging constituent maps with and without occupancy"),
        }
        self.n_constituents += &rhs.n_constituents;
    }
}
