use anyhow::Result;
use clap::{Parser, Subcommand};
use crustal::isostasy::{CRUST_DENSITY, MANTLE_DENSITY, REFERENCE_THICKNESS};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::Settings;

/// Convert paleoelevation grids to crustal thickness using Airy isostasy
#[derive(Parser)]
#[command(name = "crustal")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing paleotopography_spliced_*.nc files
    #[arg(short, long, env = "CRUSTAL_INPUT_DIR", global = true)]
    input_dir: Option<PathBuf>,

    /// Directory for crustal_thickness_*.nc files (created if missing)
    #[arg(short, long, env = "CRUSTAL_OUTPUT_DIR", global = true)]
    output_dir: Option<PathBuf>,

    /// Name of the elevation variable
    #[arg(long, env = "CRUSTAL_VARIABLE", default_value = "z", global = true)]
    variable: String,

    /// Mantle density in kg/m³
    #[arg(long, env = "CRUSTAL_MANTLE_DENSITY", default_value_t = MANTLE_DENSITY, global = true)]
    mantle_density: f64,

    /// Crustal density in kg/m³
    #[arg(long, env = "CRUSTAL_CRUST_DENSITY", default_value_t = CRUST_DENSITY, global = true)]
    crust_density: f64,

    /// Crustal thickness at zero elevation in meters
    #[arg(
        long,
        env = "CRUSTAL_REFERENCE_THICKNESS",
        default_value_t = REFERENCE_THICKNESS,
        global = true
    )]
    reference_thickness: f64,

    /// Deflate level for output files (0-9)
    #[arg(long, env = "CRUSTAL_DEFLATE_LEVEL", default_value = "1", global = true)]
    deflate_level: i32,

    /// Disable the shuffle filter on output files
    #[arg(long, global = true)]
    no_shuffle: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every input file in the input directory
    Convert {
        /// Print the batch report as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Convert a single elevation file
    File {
        /// Path to the elevation .nc file
        input: PathBuf,
    },

    /// List input files with their ages and output names
    List,

    /// Display information about an elevation grid
    Info {
        /// Path to the elevation .nc file
        path: PathBuf,
    },

    /// Compute crustal thickness for a single elevation
    Thickness {
        /// Elevation in meters (negative below sea level)
        #[arg(short, long, allow_negative_numbers = true)]
        elevation: f64,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crustal=warn,crustal_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let settings = Settings {
        input_dir: cli.input_dir,
        output_dir: cli.output_dir,
        variable: cli.variable,
        mantle_density: cli.mantle_density,
        crust_density: cli.crust_density,
        reference_thickness: cli.reference_thickness,
        deflate_level: cli.deflate_level,
        shuffle: !cli.no_shuffle,
    };

    match cli.command {
        Commands::Convert { json } => commands::convert::run(&settings, json),
        Commands::File { input } => commands::file::run(&settings, input),
        Commands::List => commands::list::run(&settings),
        Commands::Info { path } => commands::info::run(&settings, path),
        Commands::Thickness { elevation, json } => {
            commands::thickness::run(&settings, elevation, json)
        }
    }
}
