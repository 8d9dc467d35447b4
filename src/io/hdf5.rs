/// Flat event trees as HDF5 tables

use std::collections::BTreeMap;
use std::path::Path;

use ndarray::{s, Array1};

use crate::error::Result;
use crate::event::FlatEvent;

/// Range of table rows to read. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T> Bounds<T> {
    pub fn none() -> Self { Self { min: None, max: None } }
}

pub fn read_table<T: hdf5::H5Type>(filename: &dyn AsRef<Path>, dataset: &str, rows: Bounds<usize>) -> hdf5::Result<Array1<T>> {
    let file = ::hdf5::File::open(filename)?;
    let dataset = file.dataset(dataset)?;
    let Bounds { min, max } = rows;
    let data = match (min, max) {
        (None    , None    ) => dataset.read_slice_1d::<T,_>(s![  ..  ])?,
        (Some(lo), None    ) => dataset.read_slice_1d::<T,_>(s![lo..  ])?,
        (None    , Some(hi)) => dataset.read_slice_1d::<T,_>(s![  ..hi])?,
        (Some(lo), Some(hi)) => dataset.read_slice_1d::<T,_>(s![lo..hi])?,
     };
    Ok(data)
}

#[derive(hdf5::H5Type, Clone, PartialEq, Debug)]
#[repr(C)]
pub struct FatJetRow {
    pub event_id: u64,
    pub idx : i32,
    pub pt  : f32,
    pub eta : f32,
    pub phi : f32,
    pub mass: f32,
}

#[derive(hdf5::H5Type, Clone, PartialEq, Debug)]
#[repr(C)]
pub struct ConstituentRow {
    pub event_id: u64,
    pub fatjet_idx: i32,
    pub pt : f32,
    pub eta: f32,
    pub phi: f32,
}

const FATJETS     : &str = "jets/fatjets";
const CONSTITUENTS: &str = "jets/constituents";

/// Store `events` as the tables `jets/fatjets` and `jets/constituents`,
/// numbering events by their position in `events`
pub fn write_flat_events(events: &[FlatEvent], path: &Path) -> Result<()> {
    let mut fatjets = vec![];
    let mut constituents = vec![];
    for (event_id, e) in events.iter().enumerate() {
        let event_id = event_id as u64;
        for (k, (pt, eta, phi, mass)) in e.fatjets().enumerate() {
            fatjets.push(FatJetRow { event_id, idx: e.fatjet_idx[k], pt, eta, phi, mass });
        }
        for (k, t) in e.constituent_triples().enumerate() {
            constituents.push(ConstituentRow {
                event_id, fatjet_idx: e.pf_fatjet_idx[k], pt: t.weight, eta: t.eta, phi: t.phi
            });
        }
    }
    let group = hdf5::File::create(path)?.create_group("jets")?;
    group.new_dataset_builder().with_data(&fatjets     ).create("fatjets"     )?;
    group.new_dataset_builder().with_data(&constituents).create("constituents")?;
    Ok(())
}

/// Rebuild flat events from the tables written by `write_flat_events`.
/// `rows` selects rows of the jet table; constituents of the selected jets
/// are picked up wherever they are in their table. A bound falling inside an
/// event keeps only that event's jets within the bound, with their constituents.
pub fn read_flat_events(path: &Path, rows: Bounds<usize>) -> Result<Vec<FlatEvent>> {
    let mut events: BTreeMap<u64, FlatEvent> = BTreeMap::new();
    for &FatJetRow { event_id, idx, pt, eta, phi, mass } in read_table::<FatJetRow>(&path, FATJETS, rows)?.iter() {
        let e = events.entry(event_id).or_default();
        e.fatjet_pt.push(pt); e.fatjet_eta.push(eta); e.fatjet_phi.push(phi); e.fatjet_mass.push(mass);
        e.fatjet_idx.push(idx);
    }
    for &ConstituentRow { event_id, fatjet_idx, pt, eta, phi } in read_table::<ConstituentRow>(&path, CONSTITUENTS, Bounds::none())?.iter() {
        let Some(e) = events.get_mut(&event_id) else { continue };
        if e.fatjet_idx.contains(&fatjet_idx) {
            e.pf_pt.push(pt); e.pf_eta.push(eta); e.pf_phi.push(phi);
            e.pf_fatjet_idx.push(fatjet_idx);
        }
    }
    Ok(events.into_values().collect())
}
