//! Configuration file parser

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, de};

use crate::analyzer::AnalyzerConfig;
use crate::binning::{BinningConfig, EtaMode};
use crate::error::{Error, Result};
use crate::image::Region;
use crate::selection::Selection;

pub(crate) fn deserialize_uom<'d, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'d>,
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    String::deserialize(deserializer)?
        .parse::<T>()
        .map_err(de::Error::custom)
}

pub(crate) fn deserialize_uom_pair<'d, D, T>(deserializer: D) -> std::result::Result<(T, T), D::Error>
where
    D: Deserializer<'d>,
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let (a, b) = <(String, String)>::deserialize(deserializer)?;
    Ok((a.parse().map_err(de::Error::custom)?,
        b.parse().map_err(de::Error::custom)?))
}

/// Parse a quantity with units outside of a configuration file, e.g. on the
/// command line
pub fn parse_quantity<T>(text: &str) -> Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    text.parse().map_err(|e: T::Err| Error::Quantity { text: text.into(), reason: e.to_string() })
}

pub const DEFAULT_NBINS: usize = 30;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {

    /// Number of bins along each axis of every image, unless overridden per region
    pub nbins: usize,

    pub analyzer: AnalyzerConfig,

    pub cuts: Selection,

    pub regions: Regions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nbins   : DEFAULT_NBINS,
            analyzer: AnalyzerConfig::default(),
            cuts    : Selection::default(),
            regions : Regions::default(),
        }
    }
}

/// Per-region overrides of the default image binning
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Regions {
    pub central     : Option<RegionBinning>,
    pub forward     : Option<RegionBinning>,
    pub constituents: Option<RegionBinning>,
    pub occupancy   : Option<RegionBinning>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RegionBinning {
    pub nbins: Option<usize>,
    pub eta  : Option<(f32, f32)>,
    pub phi  : Option<(f32, f32)>,
    pub mode : Option<EtaMode>,
}

impl Config {

    /// Binning of `region`: the region's defaults, overridden first by the
    /// configuration file and then by `nbins` (typically from the command line).
    pub fn binning(&self, region: Region, nbins: Option<usize>) -> (BinningConfig, EtaMode) {
        let mut config = region.binning(self.nbins);
        let mut mode   = region.eta_mode();
        let overrides = match region {
            Region::Central      => &self.regions.central,
            Region::Forward      => &self.regions.forward,
            Region::Constituents => &self.regions.constituents,
            Region::Occupancy    => &self.regions.occupancy,
        };
        if let Some(RegionBinning { nbins, eta, phi, mode: m }) = overrides {
            if let Some(n)      = nbins { config.nbins = *n; }
            if let Some((a, b)) = eta   { config.eta_min = *a; config.eta_max = *b; }
            if let Some((a, b)) = phi   { config.phi_min = *a; config.phi_max = *b; }
            if let Some(m)      = m     { mode = *m; }
        }
        if let Some(n) = nbins { config.nbins = n; }
        (config, mode)
    }
}

pub fn read_config_file(path: &Path) -> Result<Config> {
    let config = fs::read_to_string(path)
        .map_err(|e| Error::SourceUnavailable(format!("config file `{}`: {e}", path.display())))?;
    Ok(toml::from_str(&config)?)
}
