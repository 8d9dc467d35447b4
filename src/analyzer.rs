//! Per-event fat jet analyzer: selects hard jets from detector events, flattens
//! them (and their constituents) into tree rows, and fills control histograms.

use std::path::Path;

use ndhistogram::{ndhistogram, axis::Uniform, Histogram, HistND};
use serde::Deserialize;

use units::{gev, gev_, Energy};
use crate::config::deserialize_uom;
use crate::error::{Error, Result};
use crate::event::{FatJet, FlatEvent, RawEvent};
use crate::io::table::{write_hist1, write_hist2};

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {

    /// Fill the control histograms
    pub save_histograms: bool,

    /// Produce flat tree rows
    pub save_tree: bool,

    /// Softer jets are ignored altogether
    #[serde(deserialize_with = "deserialize_uom")]
    pub min_fatjet_pt: Energy,

    /// Label of the input jet collection, used in diagnostics
    pub fatjets: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            save_histograms: true,
            save_tree      : true,
            min_fatjet_pt  : gev(150.0),
            fatjets        : "ak8PFJetsPuppi".into(),
        }
    }
}

// --------------------------------------------------------------------------------
pub type Hist1 = HistND<(Uniform<f32>,              ), usize>;
pub type Hist2 = HistND<(Uniform<f32>, Uniform<f32>), usize>;

const PHI_EDGE: f32 = 3.1416;

/// Control histograms of accepted jets
#[derive(Clone)]
pub struct Histograms {
    pub pt                   : Hist1,
    pub eta                  : Hist1,
    pub phi                  : Hist1,
    pub mass                 : Hist1,
    pub n_constituents       : Hist1,
    pub eta_vs_phi           : Hist2,
    pub pt_vs_eta            : Hist2,
    pub constituent_pt_vs_eta: Hist2,
}

impl Histograms {

    pub fn new(min_pt: f32) -> Self {
        let pt_axis = || Uniform::new(100, min_pt, 1000.0 + min_pt);
        Self {
            pt            : ndhistogram!(pt_axis()                       ; usize),
            eta           : ndhistogram!(Uniform::new(100,  -5.0, 5.0)   ; usize),
            phi           : ndhistogram!(Uniform::new(100,  -PHI_EDGE, PHI_EDGE)   ; usize),
            mass          : ndhistogram!(Uniform::new(100,   0.0, 500.0) ; usize),
            n_constituents: ndhistogram!(Uniform::new(100,   0.0, 200.0) ; usize),
            eta_vs_phi    : ndhistogram!(Uniform::new(100, -5.0, 5.0), Uniform::new(100, -PHI_EDGE, PHI_EDGE); usize),
            pt_vs_eta     : ndhistogram!(pt_axis()                  , Uniform::new(100, -5.0, 5.0); usize),
            constituent_pt_vs_eta:
                            ndhistogram!(Uniform::new(100, 0.0, 200.0), Uniform::new(100, -5.0, 5.0); usize),
        }
    }

    pub fn fill(&mut self, jet: &FatJet) {
        self.pt            .fill(&jet.pt);
        self.eta           .fill(&jet.eta);
        self.phi           .fill(&jet.phi);
        self.mass          .fill(&jet.mass);
        // Null references count towards the multiplicity
        self.n_constituents.fill(&(jet.constituents.len() as f32));
        self.eta_vs_phi    .fill(&(jet.eta, jet.phi));
        self.pt_vs_eta     .fill(&(jet.pt , jet.eta));
        for c in jet.valid_constituents() {
            self.constituent_pt_vs_eta.fill(&(c.pt, c.eta));
        }
    }

    /// Write each histogram as a whitespace-separated table in `dir`, one bin
    /// (including under- and overflow) per line
    pub fn write_to(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let path = |name: &str| dir.join(format!("{name}.txt"));
        write_hist1(&path("hFatJetPt"           ), &self.pt)?;
        write_hist1(&path("hFatJetEta"          ), &self.eta)?;
        write_hist1(&path("hFatJetPhi"          ), &self.phi)?;
        write_hist1(&path("hFatJetMass"         ), &self.mass)?;
        write_hist1(&path("hFatJetNConstituents"), &self.n_constituents)?;
        write_hist2(&path("hFatJetEtaVsPhi"          ), &self.eta_vs_phi)?;
        write_hist2(&path("hFatJetPtVsEta"           ), &self.pt_vs_eta)?;
        write_hist2(&path("hFatJetConstituentPtVsEta"), &self.constituent_pt_vs_eta)?;
        Ok(())
    }
}

// --------------------------------------------------------------------------------
pub struct FatJetAnalyzer {
    config    : AnalyzerConfig,
    histograms: Option<Histograms>,
    seen      : u64,
    written   : u64,
    failed    : u64,
}

impl FatJetAnalyzer {

    pub fn new(config: AnalyzerConfig) -> Self {
        let histograms = config.save_histograms.then(|| Histograms::new(gev_(config.min_fatjet_pt)));
        Self { config, histograms, seen: 0, written: 0, failed: 0 }
    }

    /// Process one event.
    ///
    /// Returns the event's tree row, if trees are being saved and the event
    /// contains at least one accepted jet. Accepted jets are numbered from 0 in
    /// the order in which they appear in the collection.
    pub fn analyze(&mut self, event: &RawEvent) -> Result<Option<FlatEvent>> {
        self.seen += 1;
        let Some(fatjets) = &event.fatjets else {
            self.failed += 1;
            return Err(Error::SourceUnavailable(format!("FatJet collection `{}`", self.config.fatjets)))
        };
        let min_pt = gev_(self.config.min_fatjet_pt);
        let mut row = FlatEvent::default();
        for (idx, jet) in fatjets.iter().filter(|j| j.pt >= min_pt).enumerate() {
            if self.config.save_tree { row.push_fatjet(jet, idx as i32) }
            if let Some(h) = self.histograms.as_mut() { h.fill(jet) }
        }
        Ok(if self.config.save_tree && !row.is_empty() {
            self.written += 1;
            Some(row)
        } else { None })
    }

    /// Process a stream of events, collecting tree rows. Events whose jet
    /// collection is unavailable are reported and skipped.
    pub fn run<'e>(&mut self, events: impl IntoIterator<Item = &'e RawEvent>) -> Vec<FlatEvent> {
        let mut rows = vec![];
        for event in events {
            match self.analyze(event) {
                Ok(Some(row)) => rows.push(row),
                Ok(None)      => {},
                Err(e)        => log::error!("Event {}: {e}", self.seen - 1),
            }
        }
        rows
    }

    pub fn config        (&self) -> &AnalyzerConfig     { &self.config }
    pub fn histograms    (&self) -> Option<&Histograms> { self.histograms.as_ref() }
    pub fn into_histograms(self) -> Option<Histograms>  { self.histograms }
    pub fn events_seen   (&self) -> u64 { self.seen }
    pub fn events_written(&self) -> u64 { self.written }
    pub fn events_failed (&self) -> u64 { self.failed }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::test_data::{jet, particle};
    #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};

    fn sample_event() -> RawEvent {
        RawEvent::new(vec![
            jet(100.0, 0.5, 0.1, 60.0, vec![Some(particle(50.0, 0.4, 0.2))]),          // too soft
            jet(400.0, 1.0, 2.0, 85.0, vec![Some(particle(30.0, 1.1, 2.1)), None,
                                             Some(particle(70.0, 0.9, 1.9))]),
            jet(250.0, -3.0, -1.0, 20.0, vec![Some(particle(15.0, -3.1, -1.1))]),
        ])
    }

    #[test]
    fn accepted_jets_are_renumbered() -> Result<()> {
        let mut analyzer = FatJetAnalyzer::new(AnalyzerConfig::default());
        let row = analyzer.analyze(&sample_event())?.unwrap();
        assert_eq!(row.fatjet_pt , vec![400.0, 250.0]);
        assert_eq!(row.fatjet_idx, vec![0, 1]);
        assert_eq!(row.pf_pt        , vec![30.0, 70.0, 15.0]);
        assert_eq!(row.pf_fatjet_idx, vec![0, 0, 1]);
        assert_eq!((analyzer.events_seen(), analyzer.events_written()), (1, 1));
        Ok(())
    }

    #[test]
    fn events_without_accepted_jets_give_no_row() -> Result<()> {
        let mut analyzer = FatJetAnalyzer::new(AnalyzerConfig::default());
        let soft = RawEvent::new(vec![jet(20.0, 0.0, 0.0, 5.0, vec![])]);
        assert_eq!(analyzer.analyze(&soft)?, None);
        assert_eq!(analyzer.analyze(&RawEvent::new(vec![]))?, None);
        assert_eq!(analyzer.events_written(), 0);
        Ok(())
    }

    #[test]
    fn unavailable_collection_is_an_error() {
        let mut analyzer = FatJetAnalyzer::new(AnalyzerConfig::default());
        let result = analyzer.analyze(&RawEvent::unavailable());
        assert!(matches!(result, Err(Error::SourceUnavailable(ref label)) if label.contains("ak8PFJetsPuppi")));
        assert_eq!(analyzer.events_failed(), 1);
    }

    #[test]
    fn run_skips_failed_events() {
        let mut analyzer = FatJetAnalyzer::new(AnalyzerConfig::default());
        let events = vec![sample_event(), RawEvent::unavailable(), sample_event()];
        let rows = analyzer.run(&events);
        assert_eq!(rows.len(), 2);
        assert_eq!((analyzer.events_seen(), analyzer.events_failed()), (3, 1));
    }

    #[test]
    fn no_tree_no_rows_but_histograms() -> Result<()> {
        let config = AnalyzerConfig { save_tree: false, ..AnalyzerConfig::default() };
        let mut analyzer = FatJetAnalyzer::new(config);
        assert_eq!(analyzer.analyze(&sample_event())?, None);
        let h = analyzer.histograms().unwrap();
        assert_eq!(h.pt.values().sum::<usize>(), 2);
        assert_eq!(h.constituent_pt_vs_eta.values().sum::<usize>(), 3);
        assert_eq!(*h.n_constituents.value(&3.0).unwrap(), 1); // null reference counted
        Ok(())
    }

    #[test]
    fn no_histograms_when_disabled() {
        let config = AnalyzerConfig { save_histograms: false, ..AnalyzerConfig::default() };
        assert!(FatJetAnalyzer::new(config).histograms().is_none());
    }

    #[test]
    fn histogram_tables_are_written() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut analyzer = FatJetAnalyzer::new(AnalyzerConfig::default());
        analyzer.analyze(&sample_event())?;
        let dir = tempfile::tempdir()?;
        analyzer.histograms().unwrap().write_to(dir.path())?;
        let table = std::fs::read_to_string(dir.path().join("hFatJetMass.txt"))?;
        // header + 100 bins + underflow + overflow
        assert_eq!(table.lines().count(), 103);
        assert!(dir.path().join("hFatJetEtaVsPhi.txt").exists());
        Ok(())
    }
}
