use std::{
    path::PathBuf,
    process,
};

use clap::{
    Parser,
    Subcommand,
};
use vocadeck::{
    core::{
        DeckError,
        ExportConfig,
    },
    export::run_export,
    tools::merge_word_lists,
};

#[derive(Parser, Debug)]
#[command(name = "vocadeck", version, about = "Export a SQLite vocabulary store as an Anki deck package")]
struct Cli {
    #[arg(long, global = true, help = "JSON config file (defaults apply when omitted)")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the deck package from the vocabulary database
    Export {
        #[arg(long, help = "Vocabulary database path")]
        db: Option<PathBuf>,
        #[arg(long, help = "Output package path")]
        output: Option<PathBuf>,
        #[arg(long, help = "Raw image directory")]
        raw_dir: Option<PathBuf>,
        #[arg(long, help = "Media output directory")]
        media_dir: Option<PathBuf>,
    },
    /// Write the rows of SECONDARY not already covered by PRIMARY
    MergeCsv {
        primary: PathBuf,
        secondary: PathBuf,
        #[arg(long, default_value = "DIFF.csv")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("vocadeck: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), DeckError> {
    match cli.command {
        Commands::Export { db, output, raw_dir, media_dir } => {
            let mut config = ExportConfig::load_or_default(cli.config.as_deref())?;
            if let Some(db) = db {
                config.db_path = db;
            }
            if let Some(output) = output {
                config.output_path = output;
            }
            if let Some(raw_dir) = raw_dir {
                config.raw_image_dir = raw_dir;
            }
            if let Some(media_dir) = media_dir {
                config.media_dir = media_dir;
            }
            run_export(&config)?;
            Ok(())
        }
        Commands::MergeCsv { primary, secondary, output } => {
            let summary = merge_word_lists(&primary, &secondary, &output)?;
            println!(
                "Processed {} unique new rows. Output written to {}",
                summary.written,
                summary.output_path.display()
            );
            Ok(())
        }
    }
}
