//! deckmask CLI - PowerPoint anonymization tool
//!
//! A command-line tool for producing structure-preserving anonymized
//! copies of .pptx presentations.

use clap::{Parser, Subcommand};
use colored::*;
use deckmask::pptx::PptxFile;
use deckmask::scrub::anonymize_presentation;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

/// Structure-preserving PowerPoint anonymization
#[derive(Parser)]
#[command(
    name = "deckmask",
    version,
    about = "Anonymize PowerPoint presentations",
    long_about = "deckmask - Structure-preserving PowerPoint anonymization.\n\n\
                  Replaces every letter and digit of a deck's text with placeholder\n\
                  characters of the same length and case, keeping layout, fonts,\n\
                  colors, and tables intact."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Anonymize a presentation
    #[command(visible_alias = "anon")]
    Anonymize {
        /// Input .pptx file path
        input: PathBuf,

        /// Output file path (default: <input>_anonymized.pptx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show presentation information
    Info {
        /// Input .pptx file path
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Anonymize {
            input,
            output,
            json,
        } => {
            let output = output.unwrap_or_else(|| default_output_path(&input));

            let pb = create_spinner("Anonymizing presentation...");
            let result = deckmask::anonymize_file(&input, &output);
            pb.finish_and_clear();

            let summary = result?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{} {}", "✓".green().bold(), summary.message());
            }
        }

        Commands::Info { input } => {
            let pb = create_spinner("Analyzing presentation...");

            let file = PptxFile::open(&input)?;
            let mut presentation = file.parse()?;
            let run_count = presentation.run_count();
            // Dry transform over a throwaway copy for the rewrite count.
            let summary = anonymize_presentation(&mut presentation);

            pb.finish_and_clear();

            println!("{}", "Presentation Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!(
                "{}: {}",
                "File".bold(),
                input.file_name().unwrap_or_default().to_string_lossy()
            );
            println!("{}: {}", "Slides".bold(), summary.slides);
            println!("{}: {}", "Shapes".bold(), summary.shapes_visited);
            println!("{}: {}", "Text runs".bold(), run_count);
            println!("{}: {}", "Anonymizable runs".bold(), summary.runs_rewritten);
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

/// `deck.pptx` → `deck_anonymized.pptx`, next to the input.
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "presentation".to_string());
    input.with_file_name(format!("{stem}_anonymized.pptx"))
}

fn print_version() {
    println!(
        "{} {}",
        "deckmask".green().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("Structure-preserving PowerPoint anonymization");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
