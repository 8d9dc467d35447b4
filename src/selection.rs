//! Split the jets of flat tree rows into central and forward regions

use serde::Deserialize;

use units::{gev, gev_, Energy, Mass};
use crate::config::{deserialize_uom, deserialize_uom_pair};
use crate::event::{FlatEvent, JetColumns, SkimmedEvent};

/// Jets in the barrel: hard enough, and with a mass in the vector boson window
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CentralCuts {
    #[serde(deserialize_with = "deserialize_uom")]
    pub pt_min: Energy,
    pub eta_max: f32,
    /// Open interval
    #[serde(deserialize_with = "deserialize_uom_pair")]
    pub mass_range: (Mass, Mass),
}

impl Default for CentralCuts {
    fn default() -> Self {
        Self { pt_min: gev(30.0), eta_max: 2.4, mass_range: (gev(70.0), gev(100.0)) }
    }
}

impl CentralCuts {
    pub fn accepts(&self, pt: f32, eta: f32, mass: f32) -> bool {
        let (lo, hi) = (gev_(self.mass_range.0), gev_(self.mass_range.1));
        pt >= gev_(self.pt_min) && eta.abs() <= self.eta_max && lo < mass && mass < hi
    }
}

/// Jets in the endcaps and forward calorimeters
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ForwardCuts {
    #[serde(deserialize_with = "deserialize_uom")]
    pub pt_max: Energy,
    pub eta_min: f32,
    pub eta_max: f32,
}

impl Default for ForwardCuts {
    fn default() -> Self { Self { pt_max: gev(1000.0), eta_min: 2.4, eta_max: 4.5 } }
}

impl ForwardCuts {
    pub fn accepts(&self, pt: f32, eta: f32) -> bool {
        let eta = eta.abs();
        pt <= gev_(self.pt_max) && self.eta_min <= eta && eta <= self.eta_max
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Selection {
    pub central: CentralCuts,
    pub forward: ForwardCuts,
}

impl Selection {

    /// Jets passing each region's cuts, in their original order. Jets on the
    /// shared boundary may appear in both regions.
    pub fn skim(&self, event: &FlatEvent) -> SkimmedEvent {
        let mut central = JetColumns::default();
        let mut forward = JetColumns::default();
        for (pt, eta, phi, mass) in event.fatjets() {
            if self.central.accepts(pt, eta, mass) { central.push(pt, eta, phi) }
            if self.forward.accepts(pt, eta)       { forward.push(pt, eta, phi) }
        }
        SkimmedEvent { central, forward }
    }
}
