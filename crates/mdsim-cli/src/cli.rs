use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "mdsim - Classical molecular dynamics with an AMBER-style force field: topology inference, analytic forces, and leapfrog integration.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for the parallel non-bonded backend.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a molecular-dynamics trajectory.
    Run(RunArgs),
    /// Evaluate energies and gradients of a single structure.
    Energy(EnergyArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Path to the input structure (PQR).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Force-field parameter file layered over the built-in parameters.
    #[arg(short, long, value_name = "PATH")]
    pub forcefield: Option<PathBuf>,

    /// Output path for the energy table.
    #[arg(long, value_name = "PATH")]
    pub energy_out: Option<PathBuf>,

    /// Output path for the XYZ trajectory.
    #[arg(long, value_name = "PATH")]
    pub geometry_out: Option<PathBuf>,

    /// Seed for the initial velocity distribution.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Desired temperature in Kelvin.
    #[arg(short = 't', long, value_name = "KELVIN")]
    pub temperature: Option<f64>,

    /// Total simulated time in picoseconds.
    #[arg(long, value_name = "PS")]
    pub total_time: Option<f64>,

    /// Integration time step in picoseconds.
    #[arg(long, value_name = "PS")]
    pub time_step: Option<f64>,

    /// Use central finite differences instead of analytic gradients.
    #[arg(long)]
    pub numerical_gradient: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S boundary.extent=15
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `energy` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct EnergyArgs {
    /// Path to the input structure (PQR).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Force-field parameter file layered over the built-in parameters.
    #[arg(short, long, value_name = "PATH")]
    pub forcefield: Option<PathBuf>,

    /// Use central finite differences instead of analytic gradients.
    #[arg(long)]
    pub numerical_gradient: bool,

    /// Relative dielectric constant for electrostatics.
    #[arg(long, value_name = "FLOAT")]
    pub dielectric: Option<f64>,
}
