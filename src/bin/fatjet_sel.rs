//! Split the jets of a flat tree into central and forward regions.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use jetimage::config::{read_config_file, Config};
use jetimage::event::{FlatEvent, SkimmedEvent};
use jetimage::io;
use jetimage::utils::{files_bar, group_digits as g, timing::Progress};
use units::gev_;

#[derive(clap::Parser, Debug, Clone)]
#[clap(name = "fatjet_sel", about = "Select central and forward fat jets from flat trees")]
struct Cli {
    /// Flat tree files written by `fatjet_analyzer`
    #[clap(required = true)]
    infiles: Vec<PathBuf>,

    /// Output file for the skimmed events
    #[clap(short, long, default_value = "FatJetSkim.bin")]
    out: PathBuf,

    /// TOML configuration file
    #[clap(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().filter_or("JETIMAGE_LOG", "info"));
    let args = Cli::parse();

    let config = match &args.config {
        Some(path) => read_config_file(path).with_context(|| format!("reading {}", path.display()))?,
        None       => Config::default(),
    };
    let cuts = &config.cuts;
    let (c, f) = (&cuts.central, &cuts.forward);
    log::info!("Central: pt >= {} GeV, |eta| <= {}, {} GeV < mass < {} GeV",
               gev_(c.pt_min), c.eta_max, gev_(c.mass_range.0), gev_(c.mass_range.1));
    log::info!("Forward: pt <= {} GeV, {} <= |eta| <= {}", gev_(f.pt_max), f.eta_min, f.eta_max);

    let mut skimmed: Vec<SkimmedEvent> = vec![];
    let bar = files_bar(&args.infiles);
    for file in &args.infiles {
        bar.set_message(file.display().to_string());
        let rows = read_rows(file).with_context(|| format!("reading {}", file.display()))?;
        skimmed.extend(rows.iter().map(|row| cuts.skim(row)));
        bar.inc(1);
    }
    bar.finish_with_message("<finished processing files>");

    let n_central: usize = skimmed.iter().map(|e| e.central.len()).sum();
    let n_forward: usize = skimmed.iter().map(|e| e.forward.len()).sum();
    println!("{} events: {} central and {} forward jets selected",
             g(skimmed.len()), g(n_central), g(n_forward));

    let mut progress = Progress::new();
    progress.start(&format!("Writing {}", args.out.display()));
    io::events::write(&skimmed, &args.out)?;
    progress.done();
    Ok(())
}

#[cfg(feature = "hdf5")]
fn read_rows(file: &std::path::Path) -> jetimage::Result<Vec<FlatEvent>> {
    if file.extension().map_or(false, |e| e == "h5") {
        io::hdf5::read_flat_events(file, io::hdf5::Bounds::none())
    } else {
        io::events::read(file)
    }
}

#[cfg(not(feature = "hdf5"))]
fn read_rows(file: &std::path::Path) -> jetimage::Result<Vec<FlatEvent>> {
    io::events::read(file)
}
