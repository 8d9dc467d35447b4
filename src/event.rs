//! Event records flowing through the analysis chain
//!
//! + `RawEvent`: what the detector-event record provides: fat jets with
//!   references to their particle-flow constituents.
//!
//! + `FlatEvent`: one row of the flat per-event tree written by the analyzer.
//!
//! + `SkimmedEvent`: jets split into central and forward regions.

use serde::{Deserialize, Serialize};

use units::plain::{Etaf32, Massf32, Phif32, Ptf32};
use crate::binning::Triple;

/// A particle-flow candidate
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pt : Ptf32,
    pub eta: Etaf32,
    pub phi: Phif32,
}

/// A reconstructed fat jet. `None` constituents are null references.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FatJet {
    pub pt  : Ptf32,
    pub eta : Etaf32,
    pub phi : Phif32,
    pub mass: Massf32,
    pub constituents: Vec<Option<Particle>>,
}

impl FatJet {
    /// The constituents that can actually be dereferenced
    pub fn valid_constituents(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.constituents.iter().flatten()
    }
}

/// One detector event. `fatjets` is `None` when the jet collection could not
/// be retrieved from the event record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub fatjets: Option<Vec<FatJet>>,
}

impl RawEvent {
    pub fn new(fatjets: Vec<FatJet>) -> Self { Self { fatjets: Some(fatjets) } }
    pub fn unavailable() -> Self { Self { fatjets: None } }
}

/// One row of the flat per-event tree.
///
/// Jets are stored column-wise; so are the constituents of all jets, with
/// `pf_fatjet_idx[i]` naming the `fatjet_idx` of the jet owning constituent `i`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatEvent {
    pub fatjet_pt  : Vec<Ptf32>,
    pub fatjet_eta : Vec<Etaf32>,
    pub fatjet_phi : Vec<Phif32>,
    pub fatjet_mass: Vec<Massf32>,
    pub fatjet_idx : Vec<i32>,

    pub pf_pt        : Vec<Ptf32>,
    pub pf_eta       : Vec<Etaf32>,
    pub pf_phi       : Vec<Phif32>,
    pub pf_fatjet_idx: Vec<i32>,
}

impl FlatEvent {

    pub fn push_fatjet(&mut self, jet: &FatJet, idx: i32) {
        self.fatjet_pt  .push(jet.pt);
        self.fatjet_eta .push(jet.eta);
        self.fatjet_phi .push(jet.phi);
        self.fatjet_mass.push(jet.mass);
        self.fatjet_idx .push(idx);
        for &Particle { pt, eta, phi } in jet.valid_constituents() {
            self.pf_pt        .push(pt);
            self.pf_eta       .push(eta);
            self.pf_phi       .push(phi);
            self.pf_fatjet_idx.push(idx);
        }
    }

    pub fn n_fatjets     (&self) -> usize { self.fatjet_pt.len() }
    pub fn n_constituents(&self) -> usize { self.pf_pt    .len() }
    pub fn is_empty      (&self) -> bool  { self.fatjet_pt.is_empty() }

    /// `(eta, phi, pt)` of every jet
    pub fn fatjet_triples(&self) -> impl Iterator<Item = Triple> + '_ {
        triples(&self.fatjet_eta, &self.fatjet_phi, &self.fatjet_pt)
    }

    /// `(eta, phi, pt)` of every constituent of every jet
    pub fn constituent_triples(&self) -> impl Iterator<Item = Triple> + '_ {
        triples(&self.pf_eta, &self.pf_phi, &self.pf_pt)
    }

    /// Iterate over `(pt, eta, phi, mass)` of the jets
    pub fn fatjets(&self) -> impl Iterator<Item = (Ptf32, Etaf32, Phif32, Massf32)> + '_ {
        itertools::izip!(&self.fatjet_pt, &self.fatjet_eta, &self.fatjet_phi, &self.fatjet_mass)
            .map(|(&pt, &eta, &phi, &mass)| (pt, eta, phi, mass))
    }
}

fn triples<'a>(eta: &'a [f32], phi: &'a [f32], pt: &'a [f32]) -> impl Iterator<Item = Triple> + 'a {
    itertools::izip!(eta, phi, pt).map(|(&eta, &phi, &pt)| Triple::new(eta, phi, pt))
}

/// `pt`, `eta`, `phi` columns of the jets selected for one region
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JetColumns {
    pub pt : Vec<Ptf32>,
    pub eta: Vec<Etaf32>,
    pub phi: Vec<Phif32>,
}

impl JetColumns {
    pub fn push(&mut self, pt: Ptf32, eta: Etaf32, phi: Phif32) {
        self.pt .push(pt);
        self.eta.push(eta);
        self.phi.push(phi);
    }

    pub fn len     (&self) -> usize { self.pt.len() }
    pub fn is_empty(&self) -> bool  { self.pt.is_empty() }

    pub fn triples(&self) -> impl Iterator<Item = Triple> + '_ {
        triples(&self.eta, &self.phi, &self.pt)
    }
}

/// Jets of one event, split by detector region
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SkimmedEvent {
    pub central: JetColumns,
    pub forward: JetColumns,
}


#[cfg(test)]
mod test {
    use super::*;
    use super::test_data::*;
    #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};

    #[test]
    fn push_fatjet_skips_null_constituents() {
        let mut row = FlatEvent::default();
        let j = jet(200.0, 1.0, 0.5, 80.0, vec![
            Some(particle(10.0, 1.1, 0.4)),
            None,
            Some(particle(20.0, 0.9, 0.6)),
        ]);
        row.push_fatjet(&j, 3);
        assert_eq!(row.n_fatjets(), 1);
        assert_eq!(row.n_constituents(), 2);
        assert_eq!(row.pf_fatjet_idx, vec![3, 3]);
        assert_eq!(row.fatjet_idx, vec![3]);
    }

    #[test]
    fn triples_are_eta_phi_pt() {
        let mut row = FlatEvent::default();
        row.push_fatjet(&jet(200.0, -1.5, 2.0, 90.0, vec![Some(particle(7.0, -1.4, 2.1))]), 0);
        assert_eq!(row.fatjet_triples().collect::<Vec<_>>(), vec![Triple::new(-1.5, 2.0, 200.0)]);
        assert_eq!(row.constituent_triples().collect::<Vec<_>>(), vec![Triple::new(-1.4, 2.1, 7.0)]);
    }

    #[test]
    fn columns() {
        let mut c = JetColumns::default();
        assert!(c.is_empty());
        c.push(50.0, 3.0, -1.0);
        assert_eq!(c.len(), 1);
        assert_eq!(c.triples().next(), Some(Triple::new(3.0, -1.0, 50.0)));
    }
}
