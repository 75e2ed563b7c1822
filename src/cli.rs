use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate a single .srt or .txt file
    Translate {
        /// Input subtitle or text file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (default: <input stem>.<target>.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Source language code, or "auto" to detect it
        #[arg(short, long, default_value = "auto")]
        source: String,

        /// Target language code
        #[arg(short, long)]
        target: String,

        /// Output format: srt or txt (default: same as input)
        #[arg(long)]
        format: Option<String>,

        /// Device to run the model on: cpu or gpu
        #[arg(long)]
        device: Option<String>,
    },

    /// Translate every .srt and .txt file in a directory
    Batch {
        /// Input directory
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Output directory (default: next to each input)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Source language code, or "auto" to detect it per file
        #[arg(short, long, default_value = "auto")]
        source: String,

        /// Target language code
        #[arg(short, long)]
        target: String,

        /// Output format: srt or txt (default: same as each input)
        #[arg(long)]
        format: Option<String>,
    },

    /// Detect the language of a file
    Detect {
        /// Input subtitle or text file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List the known language codes
    Languages,

    /// Write a default configuration file
    InitConfig {
        /// Destination path
        #[arg(default_value = "config.toml")]
        path: PathBuf,
    },
}
