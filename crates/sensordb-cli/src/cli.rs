//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    /// Parse a format name from the config file.
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }
}

/// Reusable output format arguments
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Output format (defaults to the config file's, then text)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Output compact JSON (no pretty-printing)
    #[arg(long)]
    pub compact: bool,
}

/// Reusable producer arguments
#[derive(Debug, Clone, Args)]
pub struct ProducerArgs {
    /// Keep at most this many samples (0 or negative: unbounded)
    #[arg(short, long, env = "SENSORDB_RETENTION", allow_negative_numbers = true)]
    pub retention: Option<i64>,
}

#[derive(Parser)]
#[command(name = "sensordb")]
#[command(author, version, about = "Store and serve BMP280/HTU21D sensor samples", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "SENSORDB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database file (overrides the config file)
    #[arg(long, global = true, env = "SENSORDB_DB")]
    pub db: Option<PathBuf>,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Append one reading (producer)
    Log {
        /// BMP280 temperature in Celsius
        #[arg(long, allow_negative_numbers = true)]
        bmp280_temp: f64,

        /// BMP280 pressure in hPa
        #[arg(long)]
        bmp280_pressure: f64,

        /// HTU21D temperature in Celsius
        #[arg(long, allow_negative_numbers = true)]
        htu21d_temp: f64,

        /// HTU21D relative humidity in percent
        #[arg(long)]
        htu21d_humidity: f64,

        #[command(flatten)]
        producer: ProducerArgs,
    },

    /// Append readings from CSV lines `t,p,t,h` (producer)
    Ingest {
        /// Input file (defaults to stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[command(flatten)]
        producer: ProducerArgs,
    },

    /// Show the most recent sample (consumer)
    Latest {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show the most recent samples (consumer)
    History {
        /// Number of samples to show
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,

        /// List oldest first
        #[arg(long)]
        oldest_first: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show database location and contents summary (consumer)
    Info,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the config file path
    Path,
    /// Print the effective configuration
    Show,
    /// Write a default config file if none exists
    Init,
}
