mod cli;
mod progress;

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().filter_or("JETIMAGE_LOG", "info"));
    let args = Cli::parse();

    let config = match &args.config {
        Some(path) => read_config_file(path).with_context(|| format!("reading {}", path.display()))?,
        None       => Config::default(),
    };
    // Make sure that the results can be written before starting to work
    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("Can't write to {}", args.out.display()))?;
    println!("Writing images to {}", args.out.display());

    let pool = rayon::ThreadPoolBuilder::new().num_threads(args.threads).build()?;
    let mut timer = Timer::new();

    match &args.what {
        What::Fatjets { infiles, sample } => {
            let events: Vec<SkimmedEvent> = read_all(infiles, None);
            let empty = FatJetMaps::new(&config, args.nbins)?;
            timer.start("Filling fat jet maps");
            let job_size = job_size(events.len(), args.threads);
            let maps = pool.install(|| empty.fill_parallel(&events, job_size));
            timer.done();
            write_map(&args.out, &format!("{sample}_central_pt"), &maps.central)?;
            write_map(&args.out, &format!("{sample}_frw_pt"    ), &maps.forward)?;
        }
        &What::Constituents { ref infiles, max_events, occupancy } => {
            let events: Vec<FlatEvent> = read_all(infiles, max_events);
            let empty = ConstituentMaps::new(&config, args.nbins, occupancy)?;
            timer.start("Filling constituent maps");
            let job_size = job_size(events.len(), args.threads);
            let maps = pool.install(|| empty.fill_parallel(&events, job_size));
            timer.done();
            write_map(&args.out, "pf_pt"          , &maps.pt_sum)?;
            write_map(&args.out, "pf_multiplicity", &maps.multiplicity)?;
            if let Some(o) = &maps.occupancy {
                write_map(&args.out, "pf_occupancy", o)?;
            }
            let path = args.out.join("pf_n_constituents.txt");
            io::table::write_hist1(&path, &maps.n_constituents)
                .with_context(|| format!("writing {}", path.display()))?;
        }
    }
    Ok(())
}

/// Read records from all `files`, stopping after `max` records. Unreadable
/// files are reported and skipped.
fn read_all<T: DeserializeOwned>(files: &[PathBuf], max: Option<usize>) -> Vec<T> {
    let progress = Progress::new(files);
    let records = files.iter()
        .map(|file| (file, io::events::read::<T>(file)))
        .inspect(|(file, result)| progress.read_file_done(file, result))
        .flat_map(|(_, result)| result.unwrap_or_default())
        .take(max.unwrap_or(usize::MAX))
        .collect();
    progress.final_report();
    records
}

fn job_size(n_records: usize, n_threads: usize) -> usize {
    (n_records / n_threads.max(1)).max(1)
}

/// Write `map` as `<stem>.raw` and `<stem>.txt` in `dir`, and summarize it
fn write_map(dir: &Path, stem: &str, map: &AngularBinAccumulator) -> anyhow::Result<()> {
    let raw = dir.join(format!("{stem}.raw"));
    let txt = dir.join(format!("{stem}.txt"));
    io::raw::write_grid(map.snapshot(), &raw).with_context(|| format!("writing {}", raw.display()))?;
    io::table::write_grid(&txt, map.config(), map.snapshot()).with_context(|| format!("writing {}", txt.display()))?;
    println!("{stem:>18}: {:>10} entries {:>10} outside grid   total {}",
             group_digits(map.entries()), group_digits(map.dropped()), map.total());
    Ok(())
}

// ----- Imports -----------------------------------------------------------------------------------------
use std::path::{Path, PathBuf};
use anyhow::Context;
use clap::Parser;
use serde::de::DeserializeOwned;
use cli::{Cli, What};
use progress::Progress;
use jetimage::{
    AngularBinAccumulator,
    config::{read_config_file, Config},
    event::{FlatEvent, SkimmedEvent},
    image::{ConstituentMaps, FatJetMaps},
    io,
    utils::{group_digits, timing::Progress as Timer},
};
