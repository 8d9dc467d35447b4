use std::path::PathBuf;

/// Command line interface for `jetimage` executable
#[derive(clap::Parser, Debug, Clone)]
#[clap(
    name = "jetimage",
    about = "Make angular (eta, phi) images of fat jets and their constituents",
)]
pub (super) struct Cli {
    /// Directory in which the images are written
    #[clap(short, long, default_value = "images")]
    pub out: PathBuf,

    /// Number of bins along each axis, overriding the configuration file
    #[clap(short, long)]
    pub nbins: Option<usize>,

    /// TOML configuration file
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    /// Maximum number of rayon threads
    #[clap(short = 'j', long, default_value = "4")]
    pub threads: usize,

    #[clap(subcommand)]
    pub (super) what: What,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub (super) enum What {

    /// Transverse momentum sums of central and forward fat jets
    Fatjets {
        /// Skimmed event files written by `fatjet_sel`
        #[clap(required = true)]
        infiles: Vec<PathBuf>,

        /// Sample name, used as prefix of the output files
        #[clap(short, long, default_value = "signal")]
        sample: String,
    },

    /// Transverse momentum sum and multiplicity of fat jet constituents
    Constituents {
        /// Flat tree files written by `fatjet_analyzer`
        #[clap(required = true)]
        infiles: Vec<PathBuf>,

        /// Use at most this many events
        #[clap(short, long)]
        max_events: Option<usize>,

        /// Also make a signed-eta occupancy map over the whole detector
        #[clap(long)]
        occupancy: bool,
    },
}
