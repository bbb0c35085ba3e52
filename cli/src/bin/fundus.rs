use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use fundus_cli::{Job, SegmentOverrides, run_segment};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment every .jpg/.png image in a directory and render a comparison grid
    Segment {
        /// Directory containing fundus images (default: EyeFundus_input)
        #[arg(short, long)]
        input_dir: Option<PathBuf>,
        /// Job file (.toml or .json); flags given here take precedence
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Where to write the grid image
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also save each mask as <stem>_mask.png in this directory
        #[arg(long)]
        masks_dir: Option<PathBuf>,
        /// Write a JSON summary of the run (counts, per-image coverage, failures) to this file
        #[arg(long)]
        summary: Option<PathBuf>,
    },
    /// Print the JSON schema of the job file
    Schema,
    /// Write a job file with default settings
    InitConfig {
        /// Path of the job file (.toml or .json)
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Segment {
            input_dir,
            config,
            output,
            masks_dir,
            summary,
        } => {
            let mut job = match config {
                Some(path) => Job::from_file(&path)?,
                None => Job::default(),
            };
            job.apply_overrides(SegmentOverrides {
                input_dir,
                output,
                masks_dir,
                summary,
            });
            run_segment(&job)?;
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&Job::schema())?);
        }
        Commands::InitConfig { output } => {
            Job::default().to_file(&output)?;
            info!("📄 Default job written to {}", output.display());
        }
    }

    Ok(())
}
