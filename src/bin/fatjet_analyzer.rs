//! Flatten the fat jets of detector events into per-event tree rows and fill
//! control histograms.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use jetimage::analyzer::FatJetAnalyzer;
use jetimage::config::{read_config_file, Config};
use jetimage::event::RawEvent;
use jetimage::io;
use jetimage::utils::{files_bar, group_digits as g, percent};
use units::gev_;

#[derive(clap::Parser, Debug, Clone)]
#[clap(name = "fatjet_analyzer", about = "Flatten fat jets and their constituents into a per-event tree")]
struct Cli {
    /// Files containing raw detector events
    #[clap(required = true)]
    infiles: Vec<PathBuf>,

    /// Output file for the flat tree
    #[clap(short, long, default_value = "FatJetTree.bin")]
    out: PathBuf,

    /// TOML configuration file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Directory in which to write control histogram tables
    #[clap(long)]
    histograms: Option<PathBuf>,

    /// Stop after this many events
    #[clap(short = 'n', long)]
    max_events: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().filter_or("JETIMAGE_LOG", "info"));
    let args = Cli::parse();

    let config = match &args.config {
        Some(path) => read_config_file(path).with_context(|| format!("reading {}", path.display()))?,
        None       => Config::default(),
    };
    if let Some(dir) = args.out.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("Can't write to {}", args.out.display()))?;
    }

    let mut analyzer = FatJetAnalyzer::new(config.analyzer.clone());
    let mut rows = vec![];
    let mut failed_files = vec![];
    let mut remaining = args.max_events.unwrap_or(usize::MAX);
    let bar = files_bar(&args.infiles);
    for file in &args.infiles {
        bar.set_message(file.display().to_string());
        if remaining == 0 { break }
        match io::events::read::<RawEvent>(file) {
            Ok(events) => {
                let n = events.len().min(remaining);
                remaining -= n;
                rows.extend(analyzer.run(&events[..n]));
            }
            Err(e) => {
                log::error!("{}: {e}", file.display());
                failed_files.push(file.clone());
            }
        }
        bar.inc(1);
    }
    bar.finish_with_message("<finished processing files>");

    let (seen, written, failed) = (analyzer.events_seen(), analyzer.events_written(), analyzer.events_failed());
    println!("{} / {} ({}%) events contain jets harder than {} GeV (collection unavailable in {})",
             g(written), g(seen), percent(written, seen), gev_(analyzer.config().min_fatjet_pt), g(failed));

    if analyzer.config().save_tree {
        println!("Writing flat tree to {}", args.out.display());
        write_rows(&rows, &args.out)?;
    }
    if let (Some(dir), Some(histograms)) = (&args.histograms, analyzer.histograms()) {
        println!("Writing control histograms to {}", dir.display());
        histograms.write_to(dir).with_context(|| format!("writing histograms to {}", dir.display()))?;
    }

    if !failed_files.is_empty() {
        let n = failed_files.len();
        let plural = if n == 1 { "" } else { "s" };
        println!("Warning: failed to read the following {n} file{plural}:");
        for file in failed_files.iter() {
            println!("  {}", file.display());
        }
    }
    Ok(())
}

#[cfg(feature = "hdf5")]
fn write_rows(rows: &[jetimage::event::FlatEvent], out: &std::path::Path) -> Result<()> {
    if out.extension().map_or(false, |e| e == "h5") {
        io::hdf5::write_flat_events(rows, out)?;
    } else {
        io::events::write(rows, out)?;
    }
    Ok(())
}

#[cfg(not(feature = "hdf5"))]
fn write_rows(rows: &[jetimage::event::FlatEvent], out: &std::path::Path) -> Result<()> {
    Ok(io::events::write(rows, out)?)
}
