//! Raw events through analyzer, selection and imaging, with files in between

use float_eq::assert_float_eq;
#[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};

use jetimage::{
    analyzer::{AnalyzerConfig, FatJetAnalyzer},
    config::{read_config_file, Config},
    event::{FatJet, FlatEvent, Particle, RawEvent, SkimmedEvent},
    image::{ConstituentMaps, FatJetMaps},
    io, merge, AngularBinAccumulator, BinningConfig, EtaMode, Region,
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn p(pt: f32, eta: f32, phi: f32) -> Option<Particle> { Some(Particle { pt, eta, phi }) }

fn jet(pt: f32, eta: f32, phi: f32, mass: f32, constituents: Vec<Option<Particle>>) -> FatJet {
    FatJet { pt, eta, phi, mass, constituents }
}

fn raw_events() -> Vec<RawEvent> {
    vec![
        RawEvent::new(vec![
            jet(400.0,  1.0,  0.5, 85.0, vec![p(30.0, 1.1, 0.4), None, p(70.0, 0.9, 0.6)]),
            jet(300.0,  3.0, -1.0, 20.0, vec![p(15.0, 3.1, -1.1)]),
            jet(100.0,  0.2,  0.2, 80.0, vec![]),
        ]),
        RawEvent::unavailable(),
        RawEvent::new(vec![
            jet(200.0, -1.3, -2.0, 90.0, vec![p(50.0, -1.3, -2.1)]),
        ]),
    ]
}

#[test]
fn events_to_images() -> TestResult {
    let dir = tempfile::tempdir()?;
    let config = Config::default();

    // Raw events on disk
    let raw_path = dir.path().join("raw.bin");
    io::events::write(&raw_events(), &raw_path)?;

    // Flatten
    let mut analyzer = FatJetAnalyzer::new(AnalyzerConfig::default());
    let raw: Vec<RawEvent> = io::events::read(&raw_path)?;
    let rows = analyzer.run(&raw);
    assert_eq!(rows.len(), 2);
    assert_eq!(analyzer.events_failed(), 1);
    assert_eq!(rows[0].fatjet_pt, vec![400.0, 300.0]);

    let tree_path = dir.path().join("tree.bin");
    io::events::write(&rows, &tree_path)?;
    let rows: Vec<FlatEvent> = io::events::read(&tree_path)?;

    // Select
    let skimmed: Vec<SkimmedEvent> = rows.iter().map(|r| config.cuts.skim(r)).collect();
    assert_eq!(skimmed[0].central.pt, vec![400.0]);
    assert_eq!(skimmed[0].forward.pt, vec![300.0]);
    assert_eq!(skimmed[1].central.pt, vec![200.0]);

    // Fat jet images
    let maps = FatJetMaps::new(&config, Some(10))?.fill_parallel(&skimmed, 1);
    assert_float_eq!(maps.central.total(), 600.0, ulps <= 1);
    assert_float_eq!(maps.forward.total(), 300.0, ulps <= 1);
    let grid = maps.central.snapshot();
    assert_float_eq!(grid[[4, 5]], 400.0, ulps <= 1);
    assert_float_eq!(grid[[5, 1]], 200.0, ulps <= 1);

    // Constituent images
    let pf = ConstituentMaps::new(&config, Some(10), false)?.fill_parallel(&rows, 1);
    assert_float_eq!(pf.pt_sum.total(), 150.0, ulps <= 1);
    assert_float_eq!(pf.multiplicity.total(), 3.0, ulps <= 1);
    assert_eq!(pf.pt_sum.dropped(), 1);

    // Images on disk
    let raw_image = dir.path().join("central.raw");
    io::raw::write_grid(maps.central.snapshot(), &raw_image)?;
    assert_eq!(io::raw::read_grid(&raw_image, 10)?, maps.central.snapshot().to_owned());

    let table = dir.path().join("central.txt");
    io::table::write_grid(&table, maps.central.config(), maps.central.snapshot())?;
    assert_eq!(std::fs::read_to_string(&table)?.lines().count(), 1 + 100);
    Ok(())
}

#[test]
fn configured_binning() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("jetimage.toml");
    std::fs::write(&path, r#"
        nbins = 4
        [regions.central]
        eta = [0.0, 2.0]
        phi = [-2.0, 2.0]
    "#)?;
    let config = read_config_file(&path)?;
    let mut acc = Region::Central.accumulator(&config, None)?;
    assert_eq!(acc.config(), &BinningConfig::new(4, (0.0, 2.0), (-2.0, 2.0)));
    acc.accumulate(-0.75, -1.5, 2.0);
    acc.accumulate( 0.75,  1.5, 3.0);
    assert_float_eq!(acc.snapshot()[[1, 0]], 2.0, ulps <= 1);
    assert_float_eq!(acc.snapshot()[[1, 3]], 3.0, ulps <= 1);
    Ok(())
}

#[test]
fn signed_two_by_two() -> jetimage::Result<()> {
    let mut acc = AngularBinAccumulator::new(BinningConfig::new(2, (0.0, 2.0), (-1.0, 1.0)), EtaMode::Signed)?;
    acc.accumulate(0.5, -0.5, 10.0);
    acc.accumulate(1.5,  0.5,  5.0);
    assert_eq!(acc.snapshot(), ndarray::array![[10.0_f32, 0.0], [0.0, 5.0]]);
    Ok(())
}

#[test]
fn shards_merge_into_whole() -> jetimage::Result<()> {
    let config = BinningConfig::new(1, (0.0, 2.4), (-3.14, 3.14));
    let mut a = AngularBinAccumulator::new(config, EtaMode::Absolute)?;
    let mut b = a.clone();
    a.accumulate(-2.0, 0.0, 3.0);
    b.accumulate( 2.0, 0.0, 4.0);
    let merged = merge(a.snapshot(), b.snapshot())?;
    assert_float_eq!(merged[[0, 0]], 7.0, ulps <= 1);
    a.merge_from(&b)?;
    assert_eq!(a.snapshot(), merged.view());
    Ok(())
}
